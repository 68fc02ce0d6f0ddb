//! services/web/src/web/rest.rs
//!
//! Shared plumbing for the JSON handlers: the uniform error body, and the two
//! ways a view talks to the backend (load its collection, reduce a mutation).

use axum::{http::StatusCode, Json};
use deep_purple_core::ports::{ErrorKind, PortError, PortResult};
use deep_purple_core::view::{EntityView, Keyed, Mutation};
use serde::Serialize;
use std::future::Future;
use tracing::{debug, error};

use crate::web::state::{AppState, Views};

//=========================================================================================
// Error Responses
//=========================================================================================

/// Every failed call answers with this body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Transport | ErrorKind::Status | ErrorKind::Malformed => StatusCode::BAD_GATEWAY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::Cancelled => StatusCode::CONFLICT,
    }
}

pub fn port_failure(error: &PortError) -> ApiError {
    failure(error.kind(), error.to_string())
}

pub fn failure(kind: ErrorKind, message: impl Into<String>) -> ApiError {
    (
        status_for(kind),
        Json(ErrorBody {
            kind,
            message: message.into(),
        }),
    )
}

//=========================================================================================
// View Synchronization
//=========================================================================================

/// Picks one entity view out of the session's views.
pub type Select<T> = fn(&mut Views) -> &mut EntityView<T>;

/// Fetches a view's collection and lands it, unless a newer load or a
/// teardown overtook it. Returns the view as it stands afterwards.
pub async fn load_into<T, F>(state: &AppState, select: Select<T>, fetch: F) -> EntityView<T>
where
    T: Keyed + Clone,
    F: Future<Output = PortResult<Vec<T>>>,
{
    let ticket = select(&mut *state.views.lock().await).begin_load();

    let result = state.guarded(fetch).await;
    if let Err(e) = &result {
        error!("Failed to load collection: {}", e);
    }

    let mut views = state.views.lock().await;
    let view = select(&mut views);
    if !view.finish_load(ticket, result) {
        debug!("Dropped a superseded collection load.");
    }
    view.clone()
}

/// Runs one mutation and reduces its return value into the view. A failure
/// leaves the collection as it was and records a notice.
pub async fn mutate<T, F>(
    state: &AppState,
    select: Select<T>,
    action: &str,
    call: F,
) -> Result<EntityView<T>, ApiError>
where
    T: Keyed + Clone,
    F: Future<Output = PortResult<Mutation<T>>>,
{
    let ticket = select(&mut *state.views.lock().await).mount_ticket();

    let result = state.guarded(call).await;

    let mut views = state.views.lock().await;
    let view = select(&mut views);
    match result {
        Ok(mutation) => {
            if !view.apply(ticket, mutation) {
                debug!("Dropped the result of '{}' for an unmounted view.", action);
            }
            Ok(view.clone())
        }
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            view.reject(ticket, action, &e);
            Err(port_failure(&e))
        }
    }
}
