//! crates/deep_purple_core/src/ports.rs
//!
//! Defines the service contracts (traits) between the client core and the
//! outside world: one port per backend resource family, plus the durable
//! session store. Adapters in the `web` service implement them.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    Communication, CommunicationDraft, Credentials, EmotionCategory, LoginResponse, Model,
    UploadRequest, User, UserDraft, WordAssociation,
};
use crate::session::PersistedSession;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The category of a port failure, used to pick a status code and a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Status,
    Malformed,
    NotFound,
    Unauthorized,
    Invalid,
    Cancelled,
}

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The request never produced a response (connection refused, reset, ...).
    #[error("Transport failure: {0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("Backend responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The caller supplied incomplete input; nothing was sent.
    #[error("Invalid input: {0}")]
    Invalid(String),
    /// The owning view was torn down before the response arrived.
    #[error("Request cancelled")]
    Cancelled,
}

impl PortError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortError::Transport(_) => ErrorKind::Transport,
            PortError::Status { .. } => ErrorKind::Status,
            PortError::Malformed(_) => ErrorKind::Malformed,
            PortError::NotFound(_) => ErrorKind::NotFound,
            PortError::Unauthorized => ErrorKind::Unauthorized,
            PortError::Invalid(_) => ErrorKind::Invalid,
            PortError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Backend Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> PortResult<LoginResponse>;

    async fn register(&self, credentials: &Credentials) -> PortResult<()>;
}

#[async_trait]
pub trait UserAdminService: Send + Sync {
    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn create_user(&self, draft: &UserDraft) -> PortResult<User>;

    async fn update_user(&self, id: i64, draft: &UserDraft) -> PortResult<User>;

    async fn delete_user(&self, id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait ModelService: Send + Sync {
    async fn list_models(&self) -> PortResult<Vec<Model>>;

    async fn create_model(&self, name: &str) -> PortResult<Model>;

    async fn delete_model(&self, id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait EmotionService: Send + Sync {
    // --- Categories ---
    async fn list_categories(&self, model_id: i64) -> PortResult<Vec<EmotionCategory>>;

    async fn list_all_categories(&self) -> PortResult<Vec<EmotionCategory>>;

    async fn create_category(&self, model_id: i64, name: &str) -> PortResult<EmotionCategory>;

    async fn update_category(&self, id: i64, name: &str) -> PortResult<EmotionCategory>;

    async fn delete_category(&self, id: i64) -> PortResult<()>;

    // --- Word associations ---
    async fn list_associations(&self, model_id: i64) -> PortResult<Vec<WordAssociation>>;

    async fn create_association(
        &self,
        word: &str,
        emotion_category_id: i64,
    ) -> PortResult<WordAssociation>;

    async fn delete_association(&self, id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait CommunicationService: Send + Sync {
    /// Analyses the content with the named model and stores the result.
    async fn save(&self, draft: &CommunicationDraft) -> PortResult<Communication>;

    async fn update(&self, id: i64, draft: &CommunicationDraft) -> PortResult<Communication>;

    async fn delete(&self, id: i64) -> PortResult<()>;

    async fn get(&self, id: i64) -> PortResult<Communication>;

    async fn list(&self) -> PortResult<Vec<Communication>>;

    /// Analyses an uploaded file with the named model.
    async fn upload(&self, request: UploadRequest) -> PortResult<Communication>;
}

//=========================================================================================
// Session Persistence Port
//=========================================================================================

/// Durable storage for the active session, surviving restarts until logout.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> PortResult<Option<PersistedSession>>;

    async fn save(&self, session: &PersistedSession) -> PortResult<()>;

    async fn clear(&self) -> PortResult<()>;
}
