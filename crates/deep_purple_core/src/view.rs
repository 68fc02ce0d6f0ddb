//! crates/deep_purple_core/src/view.rs
//!
//! The state owned by one entity view (users table, model list, category and
//! association lists). A view fetches its collection when mounted and is then
//! kept in step with the backend by reducing the return value of every
//! mutation it issues.

use serde::Serialize;

use crate::domain::{EmotionCategory, Model, User, WordAssociation};
use crate::ports::{PortError, PortResult};

/// Anything held in an entity view is addressed by its backend id.
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for User {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Model {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for EmotionCategory {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for WordAssociation {
    fn key(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// Identifies one list fetch. Only the newest ticket of the current mount
/// may land its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    mount: u64,
    seq: u64,
}

/// Identifies the mount a mutation was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountTicket(u64);

/// The outcome of a successful create/update/delete.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    Created(T),
    Updated(T),
    Deleted(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView<T> {
    state: LoadState,
    items: Vec<T>,
    /// The parent record the collection belongs to, e.g. the selected model.
    scope: Option<i64>,
    notice: Option<Notice>,
    #[serde(skip)]
    mount: u64,
    #[serde(skip)]
    seq: u64,
}

impl<T> Default for EntityView<T> {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            items: Vec::new(),
            scope: None,
            notice: None,
            mount: 0,
            seq: 0,
        }
    }
}

impl<T: Keyed + Clone> EntityView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn scope(&self) -> Option<i64> {
        self.scope
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Starts a list fetch for the current mount.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.seq += 1;
        self.state = LoadState::Loading;
        LoadTicket {
            mount: self.mount,
            seq: self.seq,
        }
    }

    /// Lands a list result. Returns `false` when the ticket is stale and the
    /// result was dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: PortResult<Vec<T>>) -> bool {
        if ticket.mount != self.mount || ticket.seq != self.seq {
            return false;
        }
        match result {
            Ok(items) => {
                self.items = items;
                self.state = LoadState::Loaded;
            }
            Err(error) => {
                self.state = LoadState::Errored(error.to_string());
            }
        }
        true
    }

    pub fn mount_ticket(&self) -> MountTicket {
        MountTicket(self.mount)
    }

    /// Reduces a successful mutation into the collection. Results from a
    /// previous mount are dropped and `false` is returned.
    pub fn apply(&mut self, ticket: MountTicket, mutation: Mutation<T>) -> bool {
        if ticket.0 != self.mount {
            return false;
        }
        match mutation {
            Mutation::Created(item) | Mutation::Updated(item) => {
                let key = item.key();
                match self.items.iter_mut().find(|existing| existing.key() == key) {
                    Some(slot) => *slot = item,
                    None => self.items.push(item),
                }
            }
            Mutation::Deleted(id) => self.items.retain(|item| item.key() != id),
        }
        self.notice = None;
        true
    }

    /// Records a failed action. The collection is left untouched.
    pub fn reject(&mut self, ticket: MountTicket, action: &str, error: &PortError) -> bool {
        if ticket.0 != self.mount {
            return false;
        }
        self.notice = Some(Notice::error(format!("Failed to {action}: {error}")));
        true
    }

    /// Discards the collection and invalidates every outstanding ticket.
    pub fn unmount(&mut self) {
        self.mount += 1;
        self.state = LoadState::Idle;
        self.items.clear();
        self.scope = None;
        self.notice = None;
    }

    /// Remounts under `scope` when it differs from the current one.
    pub fn mount_scope(&mut self, scope: Option<i64>) {
        if self.scope != scope {
            self.unmount();
            self.scope = scope;
        }
    }
}
