//! services/web/src/web/state.rs
//!
//! Defines the client host's shared state: the backend ports, the session,
//! and the entity views mounted for that session.

use crate::config::Config;
use deep_purple_core::domain::{EmotionCategory, Model, User, WordAssociation};
use deep_purple_core::ports::{
    AuthService, CommunicationService, EmotionService, ModelService, PortError, PortResult,
    UserAdminService,
};
use deep_purple_core::session::AuthContext;
use deep_purple_core::view::EntityView;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthContext>,
    pub auth_service: Arc<dyn AuthService>,
    pub users: Arc<dyn UserAdminService>,
    pub models: Arc<dyn ModelService>,
    pub emotions: Arc<dyn EmotionService>,
    pub communications: Arc<dyn CommunicationService>,
    /// Collections owned by the mounted views. Never held across a backend call.
    pub views: Mutex<Views>,
    /// Cancelled when the session ends so in-flight calls are abandoned.
    lifetime: StdMutex<CancellationToken>,
}

/// The backend ports bundled together; the HTTP adapter provides all of them.
pub struct Ports {
    pub auth_service: Arc<dyn AuthService>,
    pub users: Arc<dyn UserAdminService>,
    pub models: Arc<dyn ModelService>,
    pub emotions: Arc<dyn EmotionService>,
    pub communications: Arc<dyn CommunicationService>,
}

impl Ports {
    /// Uses one adapter for every port.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthService
            + UserAdminService
            + ModelService
            + EmotionService
            + CommunicationService
            + 'static,
    {
        Self {
            auth_service: backend.clone(),
            users: backend.clone(),
            models: backend.clone(),
            emotions: backend.clone(),
            communications: backend,
        }
    }
}

impl AppState {
    pub fn new(config: Arc<Config>, auth: Arc<AuthContext>, ports: Ports) -> Self {
        Self {
            config,
            auth,
            auth_service: ports.auth_service,
            users: ports.users,
            models: ports.models,
            emotions: ports.emotions,
            communications: ports.communications,
            views: Mutex::new(Views::default()),
            lifetime: StdMutex::new(CancellationToken::new()),
        }
    }

    fn lifetime_token(&self) -> CancellationToken {
        self.lifetime
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Runs a backend call tied to the current session. If the session is torn
    /// down first, the call is dropped and `PortError::Cancelled` returned.
    pub async fn guarded<T>(&self, call: impl Future<Output = PortResult<T>>) -> PortResult<T> {
        let token = self.lifetime_token();
        tokio::select! {
            _ = token.cancelled() => Err(PortError::Cancelled),
            result = call => result,
        }
    }

    /// Cancels every in-flight call, unmounts every view and starts a fresh
    /// lifetime for the next session.
    pub async fn teardown(&self) {
        {
            let mut lifetime = self
                .lifetime
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            lifetime.cancel();
            *lifetime = CancellationToken::new();
        }
        self.views.lock().await.unmount_all();
    }
}

//=========================================================================================
// Views (Per Session)
//=========================================================================================

/// The entity views of the current session.
#[derive(Default)]
pub struct Views {
    pub users: EntityView<User>,
    /// User ids whose password is shown in clear in the users table.
    pub revealed_passwords: HashSet<i64>,
    pub models: EntityView<Model>,
    pub categories: EntityView<EmotionCategory>,
    pub associations: EntityView<WordAssociation>,
}

impl Views {
    pub fn unmount_all(&mut self) {
        self.users.unmount();
        self.revealed_passwords.clear();
        self.models.unmount();
        self.categories.unmount();
        self.associations.unmount();
    }
}
