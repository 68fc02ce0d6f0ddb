pub mod auth;
pub mod catalogue;
pub mod communications;
pub mod middleware;
pub mod pages;
pub mod rest;
pub mod state;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use deep_purple_core::routes::View;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::web::middleware::{require_view, Gate};
use crate::web::state::AppState;

/// Builds the client host's router: public auth and entry routes, the action
/// routes of each protected view behind that view's role gate, and the page
/// catch-all.
pub fn router(state: Arc<AppState>) -> Router {
    let gate = |view: View| {
        axum_middleware::from_fn_with_state(
            Gate {
                state: state.clone(),
                view,
            },
            require_view,
        )
    };

    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no role required)
    let public_routes = Router::new()
        .route("/", get(pages::entry_handler))
        .route("/auth/state", get(auth::session_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let admin_routes = Router::new()
        .route("/api/users", get(users::list_handler).post(users::create_handler))
        .route(
            "/api/users/{id}",
            put(users::update_handler).delete(users::delete_handler),
        )
        .route(
            "/api/users/{id}/password-visibility",
            post(users::toggle_password_handler),
        )
        .route_layer(gate(View::AdminDashboard));

    let emotion_routes = Router::new()
        .route(
            "/api/models",
            get(catalogue::list_models_handler).post(catalogue::create_model_handler),
        )
        .route("/api/models/{id}", delete(catalogue::delete_model_handler))
        .route(
            "/api/models/{id}/categories",
            get(catalogue::list_categories_handler).post(catalogue::create_category_handler),
        )
        .route(
            "/api/categories/{id}",
            put(catalogue::update_category_handler).delete(catalogue::delete_category_handler),
        )
        .route(
            "/api/emotion-categories",
            get(catalogue::all_categories_handler),
        )
        .route(
            "/api/models/{id}/associations",
            get(catalogue::list_associations_handler)
                .post(catalogue::create_association_handler),
        )
        .route(
            "/api/associations/{id}",
            delete(catalogue::delete_association_handler),
        )
        .route_layer(gate(View::EmotionManager));

    let analysis_routes = Router::new()
        .route("/api/communications", get(communications::list_handler))
        .route(
            "/api/communications/form",
            post(communications::form_handler),
        )
        .route(
            "/api/communications/upload",
            post(communications::upload_handler),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .route_layer(gate(View::Analysis));

    let dashboard_routes = Router::new()
        .route(
            "/api/communications/distribution",
            get(communications::distribution_handler),
        )
        .route_layer(gate(View::UserDashboard));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(emotion_routes)
        .merge(analysis_routes)
        .merge(dashboard_routes)
        .route("/{*path}", get(pages::page_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
