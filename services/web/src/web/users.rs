//! services/web/src/web/users.rs
//!
//! The admin users table: list, create, update, delete, and the per-row
//! password reveal toggle.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use deep_purple_core::domain::{Role, User, UserDraft};
use deep_purple_core::view::{EntityView, LoadState, Mutation, Notice};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::web::rest::{load_into, mutate, ApiError};
use crate::web::state::{AppState, Views};

const PASSWORD_MASK: &str = "••••••••";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub password_visible: bool,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct UsersTable {
    pub state: LoadState,
    pub rows: Vec<UserRow>,
    pub notice: Option<Notice>,
}

impl UsersTable {
    pub fn build(view: &EntityView<User>, revealed: &HashSet<i64>) -> Self {
        let rows = view
            .items()
            .iter()
            .map(|user| {
                let visible = revealed.contains(&user.id);
                UserRow {
                    id: user.id,
                    username: user.username.clone(),
                    password: if visible {
                        user.password.clone()
                    } else {
                        PASSWORD_MASK.to_string()
                    },
                    password_visible: visible,
                    role: user.role,
                }
            })
            .collect();
        Self {
            state: view.state().clone(),
            rows,
            notice: view.notice().cloned(),
        }
    }
}

fn users(views: &mut Views) -> &mut EntityView<User> {
    &mut views.users
}

async fn table(state: &AppState, view: &EntityView<User>) -> UsersTable {
    let views = state.views.lock().await;
    UsersTable::build(view, &views.revealed_passwords)
}

/// Mounts the users table (or refreshes it) from the backend.
pub async fn load_users(state: &AppState) -> UsersTable {
    let view = load_into(state, users, state.users.list_users()).await;
    table(state, &view).await
}

/// GET /api/users
pub async fn list_handler(State(state): State<Arc<AppState>>) -> Json<UsersTable> {
    Json(load_users(&state).await)
}

/// POST /api/users
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<UserDraft>,
) -> Result<(StatusCode, Json<UsersTable>), ApiError> {
    let call = async { state.users.create_user(&draft).await.map(Mutation::Created) };
    let view = mutate(&state, users, "create user", call).await?;
    Ok((StatusCode::CREATED, Json(table(&state, &view).await)))
}

/// PUT /api/users/{id}
pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(draft): Json<UserDraft>,
) -> Result<Json<UsersTable>, ApiError> {
    let call = async { state.users.update_user(id, &draft).await.map(Mutation::Updated) };
    let view = mutate(&state, users, "update user", call).await?;
    Ok(Json(table(&state, &view).await))
}

/// DELETE /api/users/{id}
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UsersTable>, ApiError> {
    let call = async { state.users.delete_user(id).await.map(|()| Mutation::Deleted(id)) };
    let view = mutate(&state, users, "delete user", call).await?;
    state.views.lock().await.revealed_passwords.remove(&id);
    Ok(Json(table(&state, &view).await))
}

/// POST /api/users/{id}/password-visibility - Toggle one row's password mask
pub async fn toggle_password_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Json<UsersTable> {
    let mut views = state.views.lock().await;
    if !views.revealed_passwords.remove(&id) {
        views.revealed_passwords.insert(id);
    }
    Json(UsersTable::build(&views.users, &views.revealed_passwords))
}
