//! crates/deep_purple_core/src/session.rs
//!
//! The authentication context of the running client. It is built once at
//! startup from the persisted session and handed to every component that
//! needs to know who is logged in.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::domain::{LoginResponse, Role};
use crate::ports::{PortResult, SessionStore};

/// A snapshot of who is logged in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub role: Option<Role>,
    pub is_authenticated: bool,
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_role(role: Role) -> Self {
        Self {
            role: Some(role),
            is_authenticated: true,
        }
    }

    /// True when the current role is a member of `allowed`.
    pub fn permits(&self, allowed: &[Role]) -> bool {
        match self.role {
            Some(role) => self.is_authenticated && allowed.contains(&role),
            None => false,
        }
    }
}

/// The value kept in durable storage between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(rename = "userRole")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Default)]
struct Current {
    role: Option<Role>,
    token: Option<String>,
}

/// Holds the single active role and keeps the session store in step with it.
pub struct AuthContext {
    current: RwLock<Current>,
    store: Arc<dyn SessionStore>,
}

impl AuthContext {
    /// A logged-out context backed by `store`.
    pub fn anonymous(store: Arc<dyn SessionStore>) -> Self {
        Self {
            current: RwLock::new(Current::default()),
            store,
        }
    }

    /// Restores the context from whatever `store` persisted last.
    pub async fn restore(store: Arc<dyn SessionStore>) -> PortResult<Self> {
        let persisted = store.load().await?;
        let current = match persisted {
            Some(session) => Current {
                role: Some(session.role),
                token: session.token,
            },
            None => Current::default(),
        };
        Ok(Self {
            current: RwLock::new(current),
            store,
        })
    }

    pub fn state(&self) -> AuthState {
        match self.read().role {
            Some(role) => AuthState::for_role(role),
            None => AuthState::anonymous(),
        }
    }

    /// The bearer token to attach to backend calls, if the backend issued one.
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Persists the role returned by the backend, then makes it current.
    /// On a storage failure the previous state is kept.
    pub async fn login(&self, response: LoginResponse) -> PortResult<AuthState> {
        let persisted = PersistedSession {
            role: response.role,
            token: response.token,
        };
        self.store.save(&persisted).await?;

        let mut current = self.write();
        current.role = Some(persisted.role);
        current.token = persisted.token;
        Ok(AuthState::for_role(persisted.role))
    }

    /// Forgets the role in durable storage, then in memory. On a storage
    /// failure the session stays logged in.
    pub async fn logout(&self) -> PortResult<()> {
        self.store.clear().await?;

        let mut current = self.write();
        current.role = None;
        current.token = None;
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Current> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Current> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
