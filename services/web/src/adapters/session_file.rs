//! services/web/src/adapters/session_file.rs
//!
//! File-backed implementation of the `SessionStore` port. The active session
//! is written as a small JSON document so it survives restarts until logout.

use async_trait::async_trait;
use deep_purple_core::ports::{PortError, PortResult, SessionStore};
use deep_purple_core::session::PersistedSession;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn io_error(error: std::io::Error) -> PortError {
    PortError::Transport(format!("session store: {error}"))
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> PortResult<Option<PersistedSession>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| PortError::Malformed(format!("session file {}: {e}", self.path.display())))
    }

    async fn save(&self, session: &PersistedSession) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| PortError::Malformed(e.to_string()))?;

        // Write beside the target, then rename over it.
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await.map_err(io_error)?;
        tokio::fs::rename(&staging, &self.path).await.map_err(io_error)?;
        debug!(path = %self.path.display(), role = %session.role, "session persisted");
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }
}
