//! services/web/src/web/communications.rs
//!
//! The analysis form and the user dashboard's distribution chart.

use axum::{
    extract::{Multipart, State},
    Json,
};
use deep_purple_core::charts::{tally, EmotionDistribution};
use deep_purple_core::domain::Communication;
use deep_purple_core::form::{submit, FormInput, FormMode, FormOutcome, UploadFile};
use deep_purple_core::ports::{ErrorKind, PortResult};
use std::sync::Arc;
use tracing::{error, info};

use crate::web::rest::{failure, port_failure, ApiError};
use crate::web::state::AppState;

/// Validates the form and sends it as exactly one backend call.
pub async fn run_form(state: &AppState, input: FormInput) -> Result<FormOutcome, ApiError> {
    let command = input.into_command().map_err(|e| port_failure(&e))?;
    state
        .guarded(submit(state.communications.as_ref(), command))
        .await
        .map_err(|e| {
            error!("Communication form failed: {}", e);
            port_failure(&e)
        })
}

/// POST /api/communications/form - Save, update, delete or get by id
pub async fn form_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FormInput>,
) -> Result<Json<FormOutcome>, ApiError> {
    run_form(&state, input).await.map(Json)
}

/// POST /api/communications/upload - Accepts `file`, `modelName` and an
/// optional `content` part.
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<FormOutcome>, ApiError> {
    let mut input = FormInput {
        mode: Some(FormMode::Upload),
        ..FormInput::default()
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        failure(
            ErrorKind::Invalid,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.txt").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    failure(
                        ErrorKind::Invalid,
                        format!("Failed to read file bytes: {}", e),
                    )
                })?;
                input.file = Some(UploadFile {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "modelName" | "content" => {
                let text = field.text().await.map_err(|e| {
                    failure(
                        ErrorKind::Invalid,
                        format!("Failed to read field '{}': {}", name, e),
                    )
                })?;
                if name == "modelName" {
                    input.model_name = Some(text);
                } else {
                    input.content = Some(text);
                }
            }
            _ => {}
        }
    }

    let outcome = run_form(&state, input).await?;
    info!("Uploaded file analysed");
    Ok(Json(outcome))
}

async fn fetch_all(state: &AppState) -> PortResult<Vec<Communication>> {
    state.guarded(state.communications.list()).await
}

/// GET /api/communications
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Communication>>, ApiError> {
    fetch_all(&state).await.map(Json).map_err(|e| {
        error!("Failed to list communications: {}", e);
        port_failure(&e)
    })
}

/// Fetches every communication and tallies the dashboard chart.
pub async fn load_distribution(state: &AppState) -> PortResult<EmotionDistribution> {
    let communications = fetch_all(state).await?;
    Ok(tally(&communications))
}

/// GET /api/communications/distribution
pub async fn distribution_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmotionDistribution>, ApiError> {
    load_distribution(&state).await.map(Json).map_err(|e| {
        error!("Failed to fetch communications for the chart: {}", e);
        port_failure(&e)
    })
}
