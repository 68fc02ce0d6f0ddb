//! services/web/src/bin/deep_purple.rs

use deep_purple_core::session::AuthContext;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_lib::{
    adapters::{FileSessionStore, HttpBackend},
    config::Config,
    error::AppError,
    web::{
        router,
        state::{AppState, Ports},
    },
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting client host...");

    // --- 2. Restore the Persisted Session ---
    let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
    let auth = match AuthContext::restore(store.clone()).await {
        Ok(auth) => auth,
        Err(e) => {
            warn!("Could not restore the saved session, starting logged out: {}", e);
            AuthContext::anonymous(store)
        }
    };
    let auth = Arc::new(auth);
    info!("Session restored: {:?}", auth.state().role);

    // --- 3. Initialize the Backend Client ---
    let backend = Arc::new(HttpBackend::new(
        &config.backend_url,
        &config.communications_url,
        auth.clone(),
    )?);
    info!(
        backend = %config.backend_url,
        communications = %config.communications_url,
        "Backend client ready"
    );

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        auth,
        Ports::from_backend(backend),
    ));
    let app = router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
