//! services/web/src/web/middleware.rs
//!
//! Role gate for the routes that belong to a protected view.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use deep_purple_core::routes::{View, PUBLIC_ENTRY};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// The view whose allowed roles guard a group of routes.
#[derive(Clone)]
pub struct Gate {
    pub state: Arc<AppState>,
    pub view: View,
}

/// Lets the request through only when the session role may see `gate.view`.
/// Anything else is sent to the public entry.
pub async fn require_view(State(gate): State<Gate>, req: Request, next: Next) -> Response {
    let auth = gate.state.auth.state();
    if gate.view.is_reachable(&auth) {
        return next.run(req).await;
    }

    warn!(
        view = ?gate.view,
        role = ?auth.role,
        path = %req.uri().path(),
        "Blocked request outside the session's role"
    );
    Redirect::to(PUBLIC_ENTRY).into_response()
}
