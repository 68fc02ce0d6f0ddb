//! crates/deep_purple_core/src/domain.rs
//!
//! Defines the records mirrored from the emotion backend.
//! Field names follow the backend's camelCase JSON, and anything the backend
//! may omit is optional so a partial record never fails the whole response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The authorization tag carried by every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Users and Authentication
//=========================================================================================

/// A user account as listed by the admin endpoints.
/// The password is plaintext because that is how the backend transports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
}

/// Payload for creating or updating a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDraft {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Username/password pair sent to the login and register endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// What the backend answers to a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub role: Role,
    /// Opaque session token, when the backend issues one.
    #[serde(default)]
    pub token: Option<String>,
}

//=========================================================================================
// Models, Categories and Word Associations
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub predefined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionCategory {
    pub id: i64,
    pub emotion: String,
    #[serde(default)]
    pub model_id: Option<i64>,
    #[serde(default)]
    pub predefined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAssociation {
    pub id: i64,
    pub word: String,
    #[serde(default)]
    pub emotion_category: Option<EmotionCategory>,
    #[serde(default)]
    pub predefined: bool,
}

//=========================================================================================
// Communications
//=========================================================================================

/// One emotion label with the backend's confidence percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionDetails {
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub percentage: f64,
}

impl EmotionDetails {
    pub fn new(emotion: &str, percentage: f64) -> Self {
        Self {
            emotion: Some(emotion.to_string()),
            percentage,
        }
    }
}

/// The result of one backend analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub primary_emotion: Option<EmotionDetails>,
    #[serde(default)]
    pub secondary_emotions: Option<Vec<EmotionDetails>>,
    #[serde(default)]
    pub confidence_rating: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Communication {
    /// Secondary emotions, treating a missing or null list as empty.
    pub fn secondary(&self) -> &[EmotionDetails] {
        self.secondary_emotions.as_deref().unwrap_or(&[])
    }
}

/// Body of the save and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationDraft {
    pub content: String,
    pub model_name: String,
}

/// A file submitted for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub model_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_only_the_two_wire_values() {
        assert_eq!(serde_json::from_str::<Role>(r#""admin""#).unwrap(), Role::Admin);
        assert_eq!(serde_json::from_str::<Role>(r#""user""#).unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>(r#""root""#).is_err());
    }

    #[test]
    fn communication_tolerates_missing_and_null_fields() {
        let json = r#"{"id": 42, "content": "hello", "secondaryEmotions": null}"#;
        let communication: Communication = serde_json::from_str(json).unwrap();

        assert_eq!(communication.id, Some(42));
        assert!(communication.primary_emotion.is_none());
        assert!(communication.secondary().is_empty());
    }

    #[test]
    fn association_reads_embedded_category() {
        let json = r#"{"id": 3, "word": "sunny", "emotionCategory": {"id": 9, "emotion": "joy"}}"#;
        let association: WordAssociation = serde_json::from_str(json).unwrap();

        let category = association.emotion_category.unwrap();
        assert_eq!(category.emotion, "joy");
        assert_eq!(category.model_id, None);
    }

    #[test]
    fn login_response_rejects_unknown_role() {
        let json = r#"{"role": "superuser"}"#;
        assert!(serde_json::from_str::<LoginResponse>(json).is_err());
    }
}
