//! services/web/src/web/catalogue.rs
//!
//! The emotion model manager: models, the categories of the selected model,
//! and the word associations of the selected model.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use deep_purple_core::domain::{EmotionCategory, Model, WordAssociation};
use deep_purple_core::ports::PortError;
use deep_purple_core::view::{EntityView, Keyed, LoadState, Mutation};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::web::rest::{load_into, mutate, port_failure, ApiError};
use crate::web::state::{AppState, Views};

#[derive(Deserialize)]
pub struct NamePayload {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationPayload {
    pub word: String,
    #[serde(default)]
    pub emotion_category_id: Option<i64>,
}

/// Rejects blank input before anything is sent to the backend.
fn required(value: &str, message: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(port_failure(&PortError::Invalid(message.to_string())));
    }
    Ok(trimmed.to_string())
}

/// A record owned by another model is not part of a list scoped to `scope`,
/// so it reduces to a removal there.
fn within_scope<T: Keyed>(
    item: T,
    owner: Option<i64>,
    scope: Option<i64>,
    mutation: fn(T) -> Mutation<T>,
) -> Mutation<T> {
    match (owner, scope) {
        (Some(owner), Some(scope)) if owner != scope => Mutation::Deleted(item.key()),
        _ => mutation(item),
    }
}

fn models(views: &mut Views) -> &mut EntityView<Model> {
    &mut views.models
}

fn categories(views: &mut Views) -> &mut EntityView<EmotionCategory> {
    &mut views.categories
}

fn associations(views: &mut Views) -> &mut EntityView<WordAssociation> {
    &mut views.associations
}

//=========================================================================================
// Models
//=========================================================================================

pub async fn load_models(state: &AppState) -> EntityView<Model> {
    load_into(state, models, state.models.list_models()).await
}

/// GET /api/models
pub async fn list_models_handler(State(state): State<Arc<AppState>>) -> Json<EntityView<Model>> {
    Json(load_models(&state).await)
}

/// POST /api/models
pub async fn create_model_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NamePayload>,
) -> Result<(StatusCode, Json<EntityView<Model>>), ApiError> {
    let name = required(&payload.name, "Model name cannot be empty!")?;
    let call = async { state.models.create_model(&name).await.map(Mutation::Created) };
    let view = mutate(&state, models, "create model", call).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/models/{id}
///
/// The backend removes the model's categories and associations with it, so
/// views scoped to that model are unmounted too.
pub async fn delete_model_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EntityView<Model>>, ApiError> {
    let call = async { state.models.delete_model(id).await.map(|()| Mutation::Deleted(id)) };
    let view = mutate(&state, models, "delete model", call).await?;

    let mut views = state.views.lock().await;
    if views.categories.scope() == Some(id) {
        views.categories.unmount();
    }
    if views.associations.scope() == Some(id) {
        views.associations.unmount();
    }
    Ok(Json(view))
}

//=========================================================================================
// Categories
//=========================================================================================

/// Mounts the category list on `model_id`, then fetches it.
pub async fn load_categories(state: &AppState, model_id: i64) -> EntityView<EmotionCategory> {
    state.views.lock().await.categories.mount_scope(Some(model_id));
    load_into(state, categories, state.emotions.list_categories(model_id)).await
}

/// Scopes the category list to `model_id`. A list that was remounted, or
/// never landed, is fetched first so later mutations reduce onto server state.
async fn scope_categories(state: &AppState, model_id: i64) {
    let loaded = {
        let mut views = state.views.lock().await;
        views.categories.mount_scope(Some(model_id));
        views.categories.state() == &LoadState::Loaded
    };
    if !loaded {
        load_into(state, categories, state.emotions.list_categories(model_id)).await;
    }
}

/// GET /api/models/{id}/categories
pub async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<i64>,
) -> Json<EntityView<EmotionCategory>> {
    Json(load_categories(&state, model_id).await)
}

/// GET /api/emotion-categories - Every category of every model
pub async fn all_categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EmotionCategory>>, ApiError> {
    state
        .guarded(state.emotions.list_all_categories())
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to list emotion categories: {}", e);
            port_failure(&e)
        })
}

/// POST /api/models/{id}/categories
pub async fn create_category_handler(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<i64>,
    Json(payload): Json<NamePayload>,
) -> Result<(StatusCode, Json<EntityView<EmotionCategory>>), ApiError> {
    let name = required(&payload.name, "Category name cannot be empty!")?;
    scope_categories(&state, model_id).await;
    let call = async {
        state
            .emotions
            .create_category(model_id, &name)
            .await
            .map(|category| {
                let owner = category.model_id;
                within_scope(category, owner, Some(model_id), Mutation::Created)
            })
    };
    let view = mutate(&state, categories, "create category", call).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /api/categories/{id}
pub async fn update_category_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<EntityView<EmotionCategory>>, ApiError> {
    let name = required(&payload.name, "Category name cannot be empty!")?;
    let call = async {
        let category = state.emotions.update_category(id, &name).await?;
        let scope = state.views.lock().await.categories.scope();
        let owner = category.model_id;
        Ok::<_, PortError>(within_scope(category, owner, scope, Mutation::Updated))
    };
    mutate(&state, categories, "update category", call)
        .await
        .map(Json)
}

/// DELETE /api/categories/{id}
pub async fn delete_category_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EntityView<EmotionCategory>>, ApiError> {
    let call = async { state.emotions.delete_category(id).await.map(|()| Mutation::Deleted(id)) };
    mutate(&state, categories, "delete category", call)
        .await
        .map(Json)
}

//=========================================================================================
// Word Associations
//=========================================================================================

/// Mounts the association list on `model_id`, then fetches it.
pub async fn load_associations(state: &AppState, model_id: i64) -> EntityView<WordAssociation> {
    state.views.lock().await.associations.mount_scope(Some(model_id));
    load_into(state, associations, state.emotions.list_associations(model_id)).await
}

/// GET /api/models/{id}/associations
pub async fn list_associations_handler(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<i64>,
) -> Json<EntityView<WordAssociation>> {
    Json(load_associations(&state, model_id).await)
}

/// Scopes the association list to `model_id`, fetching it when it was
/// remounted or never landed.
async fn scope_associations(state: &AppState, model_id: i64) {
    let loaded = {
        let mut views = state.views.lock().await;
        views.associations.mount_scope(Some(model_id));
        views.associations.state() == &LoadState::Loaded
    };
    if !loaded {
        load_into(state, associations, state.emotions.list_associations(model_id)).await;
    }
}

/// POST /api/models/{id}/associations
pub async fn create_association_handler(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<i64>,
    Json(payload): Json<AssociationPayload>,
) -> Result<(StatusCode, Json<EntityView<WordAssociation>>), ApiError> {
    let word = required(&payload.word, "Word cannot be empty!")?;
    let emotion_category_id = payload.emotion_category_id.ok_or_else(|| {
        port_failure(&PortError::Invalid(
            "Please select an emotion category!".to_string(),
        ))
    })?;

    scope_associations(&state, model_id).await;
    let call = async {
        let association = state
            .emotions
            .create_association(&word, emotion_category_id)
            .await?;
        let owner = association
            .emotion_category
            .as_ref()
            .and_then(|category| category.model_id);
        Ok::<_, PortError>(within_scope(association, owner, Some(model_id), Mutation::Created))
    };
    let view = mutate(&state, associations, "create association", call).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/associations/{id}
pub async fn delete_association_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EntityView<WordAssociation>>, ApiError> {
    let call = async {
        state
            .emotions
            .delete_association(id)
            .await
            .map(|()| Mutation::Deleted(id))
    };
    mutate(&state, associations, "delete association", call)
        .await
        .map(Json)
}
