//! In-memory backend.
//!
//! Keeps every table as a plain `Vec<Value>` behind a mutex. Used by the
//! store tests, which also rely on the one-shot failure injection to
//! exercise rollback paths without a real backend outage.

use crate::backend::{
    AuthEvent, Backend, BackendError, BackendResult, Filter, MIN_PASSWORD_LEN, Mutation, Session,
    Table,
};
use crate::models::User;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

/// Operation kinds a failure can be injected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Query,
    Insert,
    Update,
    Delete,
    DeleteWhere,
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    accounts: Mutex<Vec<Account>>,
    session: Mutex<Option<Session>>,
    /// Pending one-shot failures, consumed by the first matching call.
    failures: Mutex<Vec<(Table, Op)>>,
    auth_tx: AuthChannel,
}

/// Broadcast sender with a Default impl so the backend itself can derive it.
struct AuthChannel(broadcast::Sender<AuthEvent>);

impl Default for AuthChannel {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(16);
        AuthChannel(tx)
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrange for the next `op` on `table` to fail.
    pub async fn inject_failure(&self, table: Table, op: Op) {
        self.failures.lock().await.push((table, op));
    }

    /// Create an account and an active session for it directly, skipping
    /// the password dance. Test setup helper.
    pub async fn seed_session(&self, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.accounts.lock().await.push(Account {
            user: user.clone(),
            password: String::new(),
        });
        *self.session.lock().await = Some(Session {
            token: Uuid::new_v4().to_string(),
            user: user.clone(),
        });
        user
    }

    /// Insert a row directly, minting an id when the payload has none.
    /// Returns the stored row.
    pub async fn seed(&self, table: Table, mut row: Value) -> Value {
        if let Some(obj) = row.as_object_mut()
            && !obj.contains_key("id")
        {
            obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        let mut tables = self.tables.lock().await;
        tables.entry(table).or_default().push(row.clone());
        row
    }

    /// Current remote rows of `table`, for assertions.
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .lock()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    async fn take_failure(&self, table: Table, op: Op) -> bool {
        let mut failures = self.failures.lock().await;
        if let Some(pos) = failures.iter().position(|f| *f == (table, op)) {
            failures.remove(pos);
            return true;
        }
        false
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn query(&self, table: Table, filter: &Filter) -> BackendResult<Vec<Value>> {
        if self.take_failure(table, Op::Query).await {
            return Err(BackendError::Unavailable("injected query failure".into()));
        }
        let tables = self.tables.lock().await;
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row_matches(row, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some((col, ascending)) = filter.ordering() {
            rows.sort_by(|a, b| {
                let ord = cmp_column(a.get(col), b.get(col));
                if ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(n) = filter.row_limit() {
            rows.truncate(n);
        }
        Ok(rows)
    }

    async fn mutate(&self, table: Table, mutation: Mutation) -> BackendResult<Option<Value>> {
        match mutation {
            Mutation::Insert(payload) => {
                if self.take_failure(table, Op::Insert).await {
                    return Err(BackendError::Unavailable("injected insert failure".into()));
                }
                let mut row = payload;
                let obj = row.as_object_mut().ok_or_else(|| {
                    BackendError::Malformed("insert payload must be an object".into())
                })?;
                obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
                let mut tables = self.tables.lock().await;
                tables.entry(table).or_default().push(row.clone());
                Ok(Some(row))
            }
            Mutation::Update { id, patch } => {
                if self.take_failure(table, Op::Update).await {
                    return Err(BackendError::Unavailable("injected update failure".into()));
                }
                let patch = patch
                    .as_object()
                    .ok_or_else(|| {
                        BackendError::Malformed("update patch must be an object".into())
                    })?
                    .clone();
                let mut tables = self.tables.lock().await;
                let rows = tables.entry(table).or_default();
                let row = rows
                    .iter_mut()
                    .find(|row| row.get("id").and_then(Value::as_str) == Some(id.as_str()))
                    .ok_or_else(|| BackendError::NotFound(format!("{} id {id}", table.as_str())))?;
                if let Some(obj) = row.as_object_mut() {
                    for (k, v) in patch {
                        obj.insert(k, v);
                    }
                }
                Ok(Some(row.clone()))
            }
            Mutation::Delete { id } => {
                if self.take_failure(table, Op::Delete).await {
                    return Err(BackendError::Unavailable("injected delete failure".into()));
                }
                let mut tables = self.tables.lock().await;
                tables
                    .entry(table)
                    .or_default()
                    .retain(|row| row.get("id").and_then(Value::as_str) != Some(id.as_str()));
                Ok(None)
            }
            Mutation::DeleteWhere { column, value } => {
                if self.take_failure(table, Op::DeleteWhere).await {
                    return Err(BackendError::Unavailable("injected delete failure".into()));
                }
                let mut tables = self.tables.lock().await;
                tables
                    .entry(table)
                    .or_default()
                    .retain(|row| row.get(column) != Some(&value));
                Ok(None)
            }
        }
    }

    async fn current_session(&self) -> BackendResult<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(BackendError::InvalidEmail(email));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let mut accounts = self.accounts.lock().await;
        if accounts.iter().any(|a| a.user.email == email) {
            return Err(BackendError::EmailTaken(email));
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            created_at: Utc::now(),
        };
        accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user: user.clone(),
        };
        *self.session.lock().await = Some(session.clone());
        let _ = self.auth_tx.0.send(AuthEvent::SignedIn(user));
        Ok(session)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let email = email.trim().to_lowercase();
        let accounts = self.accounts.lock().await;
        let account = accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
            .ok_or(BackendError::InvalidCredentials)?;
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user: account.user.clone(),
        };
        drop(accounts);
        *self.session.lock().await = Some(session.clone());
        let _ = self.auth_tx.0.send(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn request_password_reset(
        &self,
        email: &str,
        _redirect: Option<&str>,
    ) -> BackendResult<()> {
        let email = email.trim().to_lowercase();
        let accounts = self.accounts.lock().await;
        if !accounts.iter().any(|a| a.user.email == email) {
            return Err(BackendError::NotFound(format!("account {email}")));
        }
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> BackendResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let session = self
            .session
            .lock()
            .await
            .clone()
            .ok_or(BackendError::NoSession)?;
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.user.id == session.user.id)
            .ok_or(BackendError::NoSession)?;
        account.password = new_password.to_string();
        Ok(())
    }

    async fn sign_out(&self) -> BackendResult<()> {
        *self.session.lock().await = None;
        let _ = self.auth_tx.0.send(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe_auth(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_tx.0.subscribe()
    }
}

fn row_matches(row: &Value, filter: &Filter) -> bool {
    filter
        .eq_clauses()
        .iter()
        .all(|(col, v)| row.get(*col) == Some(v))
        && filter
            .neq_clauses()
            .iter()
            .all(|(col, v)| row.get(*col) != Some(v))
}

fn cmp_column(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}
