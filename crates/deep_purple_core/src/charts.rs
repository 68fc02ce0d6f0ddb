//! crates/deep_purple_core/src/charts.rs
//!
//! Turns communications into chart series: the stacked primary/secondary
//! distribution for the dashboard and the proportion slices for one result.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{Communication, EmotionDetails};

pub const UNKNOWN_EMOTION: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_SECONDARY_EMOTIONS: &str = "No secondary emotions available";

fn label_of(details: &EmotionDetails) -> &str {
    details
        .emotion
        .as_deref()
        .filter(|label| !label.is_empty())
        .unwrap_or(UNKNOWN_EMOTION)
}

//=========================================================================================
// Distribution (stacked bars)
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionBar {
    pub label: String,
    pub primary: usize,
    pub secondary: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionDistribution {
    pub total: usize,
    pub bars: Vec<EmotionBar>,
}

/// Counts how often each label appears as a primary emotion and as a
/// secondary emotion, merged into one bar per label. Bars keep first-seen
/// order: every primary label, then secondary-only labels.
pub fn tally(communications: &[Communication]) -> EmotionDistribution {
    let mut bars: Vec<EmotionBar> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut slot = |label: &str, bars: &mut Vec<EmotionBar>| -> usize {
        *index.entry(label.to_string()).or_insert_with(|| {
            bars.push(EmotionBar {
                label: label.to_string(),
                primary: 0,
                secondary: 0,
            });
            bars.len() - 1
        })
    };

    for communication in communications {
        let label = communication
            .primary_emotion
            .as_ref()
            .map(label_of)
            .unwrap_or(UNKNOWN_EMOTION);
        let at = slot(label, &mut bars);
        bars[at].primary += 1;
    }

    for communication in communications {
        for details in communication.secondary() {
            let at = slot(label_of(details), &mut bars);
            bars[at].secondary += 1;
        }
    }

    EmotionDistribution {
        total: communications.len(),
        bars,
    }
}

//=========================================================================================
// Proportion chart and result report
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

/// One slice for the primary emotion, one per secondary emotion. Percentages
/// are passed through untouched.
pub fn proportion_slices(communication: &Communication) -> Vec<Slice> {
    communication
        .primary_emotion
        .iter()
        .chain(communication.secondary())
        .map(|details| Slice {
            label: label_of(details).to_string(),
            value: details.percentage,
        })
        .collect()
}

/// Display-ready fields of one analysed communication.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: String,
    pub content: String,
    pub primary_emotion: String,
    pub secondary_emotions: Vec<String>,
    pub model: String,
    pub confidence_rating: String,
    pub summary: String,
    pub timestamp: String,
    pub slices: Vec<Slice>,
}

fn or_na(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

impl AnalysisReport {
    pub fn from_communication(communication: &Communication) -> Self {
        let secondary: Vec<String> = communication
            .secondary()
            .iter()
            .map(|details| label_of(details).to_string())
            .collect();

        Self {
            id: or_na(communication.id.map(|id| id.to_string())),
            content: or_na(communication.content.clone()),
            primary_emotion: or_na(
                communication
                    .primary_emotion
                    .as_ref()
                    .map(|details| label_of(details).to_string()),
            ),
            secondary_emotions: if secondary.is_empty() {
                vec![NO_SECONDARY_EMOTIONS.to_string()]
            } else {
                secondary
            },
            model: or_na(communication.model_name.clone()),
            confidence_rating: or_na(communication.confidence_rating.map(|c| c.to_string())),
            summary: or_na(communication.summary.clone()),
            timestamp: or_na(communication.timestamp.as_deref().map(format_timestamp)),
            slices: proportion_slices(communication),
        }
    }
}
