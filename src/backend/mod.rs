//! Backend seam: the storage and auth surface the store talks to.
//!
//! The trait mirrors a hosted BaaS client (filtered table reads, row
//! mutations, password auth, an auth event stream) so the store logic
//! stays identical whether it runs against the bundled SQLite backend
//! or the in-memory one.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::models::User;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

/// The four synced collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    ShoppingLists,
    Categories,
    Items,
    Messages,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::ShoppingLists => "shopping_lists",
            Table::Categories => "categories",
            Table::Items => "items",
            Table::Messages => "messages",
        }
    }
}

/// Row filter for [`Backend::query`]. Built fluently:
///
/// ```ignore
/// Filter::new().eq("ownerId", user_id).order_by("createdAt", false).limit(1)
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    eq: Vec<(&'static str, Value)>,
    neq: Vec<(&'static str, Value)>,
    order_by: Option<(&'static str, bool)>,
    limit: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.eq.push((column, value.into()));
        self
    }

    pub fn neq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.neq.push((column, value.into()));
        self
    }

    /// Sort on `column`; `ascending = false` gives newest-first for
    /// timestamp columns.
    pub fn order_by(mut self, column: &'static str, ascending: bool) -> Self {
        self.order_by = Some((column, ascending));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    // Read-side accessors for backend implementations.

    pub fn eq_clauses(&self) -> &[(&'static str, Value)] {
        &self.eq
    }

    pub fn neq_clauses(&self) -> &[(&'static str, Value)] {
        &self.neq
    }

    pub fn ordering(&self) -> Option<(&'static str, bool)> {
        self.order_by
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }
}

/// A single write against one table.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Insert `payload`; the backend mints the id and returns the full row.
    Insert(Value),
    /// Patch the row with the given id. Returns the updated row when found.
    Update { id: String, patch: Value },
    /// Delete the row with the given id.
    Delete { id: String },
    /// Delete every row where `column` equals `value`. Used for the
    /// explicit category cascade fallback.
    DeleteWhere { column: &'static str, value: Value },
}

/// An authenticated backend session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Auth state transitions, broadcast to whoever subscribes.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid e-mail address: {0}")]
    InvalidEmail(String),

    #[error("an account with e-mail {0} already exists")]
    EmailTaken(String),

    #[error("password must have at least {0} characters")]
    WeakPassword(usize),

    #[error("no active session")]
    NoSession,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed row: {0}")]
    Malformed(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Malformed(e.to_string())
    }
}

/// Minimum accepted password length, matched on sign-up and password update.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Storage plus auth, as one capability.
///
/// All operations are async to keep real network backends and the local
/// ones behind the same seam.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read rows from `table` matching `filter`.
    async fn query(&self, table: Table, filter: &Filter) -> BackendResult<Vec<Value>>;

    /// Apply one write. Inserts and updates return the resulting row;
    /// deletes return `None`.
    async fn mutate(&self, table: Table, mutation: Mutation) -> BackendResult<Option<Value>>;

    /// The session restored from persisted credentials, if any.
    async fn current_session(&self) -> BackendResult<Option<Session>>;

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Start a password recovery for `email`. Delivery of the recovery
    /// secret is backend-specific; `redirect` names where the user
    /// should land to finish the flow, for backends that deliver links.
    async fn request_password_reset(&self, email: &str, redirect: Option<&str>)
    -> BackendResult<()>;

    /// Change the password of the signed-in user.
    async fn update_password(&self, new_password: &str) -> BackendResult<()>;

    async fn sign_out(&self) -> BackendResult<()>;

    /// Subscribe to auth transitions. Events are broadcast; each receiver
    /// sees every event from subscription time on.
    fn subscribe_auth(&self) -> broadcast::Receiver<AuthEvent>;
}
