//! services/web/src/web/auth.rs
//!
//! Login, registration and logout. The backend decides the role; the host
//! persists it and uses it for every later route decision.

use axum::{extract::State, http::StatusCode, Json};
use deep_purple_core::domain::Credentials;
use deep_purple_core::ports::{ErrorKind, PortError};
use deep_purple_core::routes::{landing_path, navigation, NavItem, PUBLIC_ENTRY};
use deep_purple_core::session::AuthState;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::web::rest::{failure, port_failure, ApiError};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize)]
pub struct SessionResponse {
    pub auth: AuthState,
    pub nav: Vec<NavItem>,
    /// Where the client should navigate next, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

impl SessionResponse {
    fn new(auth: AuthState, redirect: Option<&'static str>) -> Self {
        Self {
            nav: navigation(&auth),
            auth,
            redirect,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /auth/state - The current session and its navigation
pub async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(SessionResponse::new(state.auth.state(), None))
}

/// POST /auth/login - Log in and land on the role's dashboard
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let response = state
        .auth_service
        .login(&credentials)
        .await
        .map_err(|e| {
            warn!("Login failed for '{}': {}", credentials.username, e);
            match e {
                PortError::Transport(_) => port_failure(&e),
                _ => failure(
                    ErrorKind::Unauthorized,
                    "Invalid username or password. Please try again.",
                ),
            }
        })?;

    // A new login starts a new session: nothing mounted before survives.
    state.teardown().await;
    let auth = state.auth.login(response).await.map_err(|e| {
        error!("Failed to persist session: {}", e);
        port_failure(&e)
    })?;

    let redirect = auth.role.map(landing_path);
    info!("Logged in as {:?}", auth.role);
    Ok((StatusCode::OK, Json(SessionResponse::new(auth, redirect))))
}

/// POST /auth/register - Create an account, then go back to the entry view
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    state
        .auth_service
        .register(&credentials)
        .await
        .map_err(|e| {
            error!("Registration failed for '{}': {}", credentials.username, e);
            failure(e.kind(), "Registration failed. Please try again.")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(state.auth.state(), Some(PUBLIC_ENTRY))),
    ))
}

/// POST /auth/logout - End the session and forget the persisted role
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    state.teardown().await;
    state.auth.logout().await.map_err(|e| {
        error!("Failed to clear persisted session: {}", e);
        port_failure(&e)
    })?;

    info!("Logged out");
    Ok(Json(SessionResponse::new(
        AuthState::anonymous(),
        Some(PUBLIC_ENTRY),
    )))
}
