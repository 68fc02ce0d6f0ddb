pub mod charts;
pub mod domain;
pub mod form;
pub mod ports;
pub mod routes;
pub mod session;
pub mod view;

pub use domain::{
    Communication, CommunicationDraft, Credentials, EmotionCategory, EmotionDetails,
    LoginResponse, Model, Role, UploadRequest, User, UserDraft, WordAssociation,
};
pub use ports::{
    AuthService, CommunicationService, EmotionService, ErrorKind, ModelService, PortError,
    PortResult, SessionStore, UserAdminService,
};
pub use session::{AuthContext, AuthState, PersistedSession};
pub use view::{EntityView, Keyed, LoadState, Mutation, Notice};
