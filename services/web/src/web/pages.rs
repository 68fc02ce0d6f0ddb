//! services/web/src/web/pages.rs
//!
//! Page models: the data each view renders, gated by the session's role.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use deep_purple_core::charts::EmotionDistribution;
use deep_purple_core::domain::{EmotionCategory, Model, WordAssociation};
use deep_purple_core::form::{FormField, FormMode};
use deep_purple_core::routes::{navigation, resolve, NavItem, RouteDecision, View};
use deep_purple_core::session::AuthState;
use deep_purple_core::view::{EntityView, Notice};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::catalogue::{load_associations, load_categories, load_models};
use crate::web::communications::load_distribution;
use crate::web::state::AppState;
use crate::web::users::{load_users, UsersTable};

#[derive(Serialize)]
pub struct PageModel {
    pub view: View,
    pub title: &'static str,
    pub path: String,
    pub auth: AuthState,
    pub nav: Vec<NavItem>,
    pub content: PageContent,
}

#[derive(Serialize)]
pub struct FormOperation {
    pub mode: FormMode,
    pub description: &'static str,
    pub fields: &'static [FormField],
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    Entry,
    AdminDashboard {
        users: UsersTable,
    },
    UserDashboard {
        distribution: Option<EmotionDistribution>,
        notice: Option<Notice>,
    },
    Analysis {
        models: EntityView<Model>,
        operations: Vec<FormOperation>,
    },
    EmotionManager {
        models: EntityView<Model>,
        #[serde(rename = "selectedModel")]
        selected_model: Option<i64>,
        categories: Option<EntityView<EmotionCategory>>,
        associations: Option<EntityView<WordAssociation>>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// The model selected in the emotion manager.
    pub model: Option<i64>,
}

async fn content_for(state: &AppState, view: View, query: &PageQuery) -> PageContent {
    match view {
        View::Entry => PageContent::Entry,
        View::AdminDashboard => PageContent::AdminDashboard {
            users: load_users(state).await,
        },
        View::UserDashboard => match load_distribution(state).await {
            Ok(distribution) => PageContent::UserDashboard {
                notice: (distribution.total == 0)
                    .then(|| Notice::info("No data available for visualization.")),
                distribution: Some(distribution),
            },
            Err(e) => {
                error!("Failed to load the emotion distribution: {}", e);
                PageContent::UserDashboard {
                    distribution: None,
                    notice: Some(Notice::error(format!(
                        "Failed to load communications: {e}"
                    ))),
                }
            }
        },
        View::Analysis => PageContent::Analysis {
            models: load_models(state).await,
            operations: FormMode::ALL
                .into_iter()
                .map(|mode| FormOperation {
                    mode,
                    description: mode.description(),
                    fields: mode.fields(),
                })
                .collect(),
        },
        View::EmotionManager => {
            let models = load_models(state).await;
            let (categories, associations) = match query.model {
                Some(model_id) => (
                    Some(load_categories(state, model_id).await),
                    Some(load_associations(state, model_id).await),
                ),
                None => {
                    let mut views = state.views.lock().await;
                    views.categories.unmount();
                    views.associations.unmount();
                    (None, None)
                }
            };
            PageContent::EmotionManager {
                models,
                selected_model: query.model,
                categories,
                associations,
            }
        }
    }
}

/// Renders `path` for the current session, or redirects to the public entry.
pub async fn render(state: &AppState, path: &str, query: &PageQuery) -> Response {
    let auth = state.auth.state();
    let view = match resolve(path, &auth) {
        RouteDecision::Render(view) => view,
        RouteDecision::Redirect(to) => {
            debug!("Redirecting '{}' to '{}'", path, to);
            return Redirect::to(to).into_response();
        }
    };

    let content = content_for(state, view, query).await;
    Json(PageModel {
        view,
        title: view.title(),
        path: path.to_string(),
        nav: navigation(&auth),
        auth,
        content,
    })
    .into_response()
}

/// GET /
pub async fn entry_handler(State(state): State<Arc<AppState>>) -> Response {
    render(&state, "/", &PageQuery::default()).await
}

/// GET /{*path}
pub async fn page_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let path = format!("/{}", path.trim_start_matches('/'));
    render(&state, &path, &query).await
}
