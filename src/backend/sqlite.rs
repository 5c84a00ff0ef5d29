//! Bundled SQLite backend.
//!
//! Stores the four synced tables plus the auth surface (accounts,
//! sessions, recovery tokens) in a single database file. The signed-in
//! session token is persisted next to it so separate CLI invocations
//! share one session, the way a browser client keeps its local storage.

use crate::backend::{
    AuthEvent, Backend, BackendError, BackendResult, Filter, MIN_PASSWORD_LEN, Mutation, Session,
    Table,
};
use crate::models::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    /// Where the active session token is cached between invocations.
    /// `None` keeps the session in-process only.
    session_file: Option<PathBuf>,
    current_token: Mutex<Option<String>>,
    auth_tx: broadcast::Sender<AuthEvent>,
}

impl SqliteBackend {
    /// Open (and create if needed) the database at `db_path`.
    pub fn open(db_path: &Path, session_file: Option<PathBuf>) -> BackendResult<Self> {
        if let Some(dir) = db_path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(db_path)?;
        init_schema(&conn)?;
        let (auth_tx, _) = broadcast::channel(16);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            session_file,
            current_token: Mutex::new(None),
            auth_tx,
        })
    }

    /// Throwaway database, used by tests.
    pub fn open_in_memory() -> BackendResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        let (auth_tx, _) = broadcast::channel(16);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            session_file: None,
            current_token: Mutex::new(None),
            auth_tx,
        })
    }

    /// Mint a password recovery token for `email`.
    ///
    /// A hosted backend would mail a reset link; here the token itself is
    /// handed back so the caller can deliver it.
    pub async fn issue_recovery_token(&self, email: &str) -> BackendResult<String> {
        let conn = self.conn.lock().await;
        let (user, _, _) = find_user_by_email(&conn, email)?
            .ok_or_else(|| BackendError::NotFound(format!("account {email}")))?;
        let token = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO recovery_tokens (token, userId, createdAt) VALUES (?1, ?2, ?3)",
            params![token, user.id, Utc::now().to_rfc3339()],
        )?;
        Ok(token)
    }

    /// Redeem a recovery token: consumes it and opens a session for its
    /// owner, who can then change the password while signed in.
    pub async fn redeem_recovery_token(&self, token: &str) -> BackendResult<Session> {
        let session = {
            let conn = self.conn.lock().await;
            let user_id: Option<String> = conn
                .prepare("SELECT userId FROM recovery_tokens WHERE token = ?1 AND used = 0")?
                .query_row(params![token], |row| row.get(0))
                .optional()?;
            let user_id =
                user_id.ok_or_else(|| BackendError::NotFound("recovery token".into()))?;
            conn.execute(
                "UPDATE recovery_tokens SET used = 1 WHERE token = ?1",
                params![token],
            )?;
            let user = fetch_user(&conn, &user_id)?;
            create_session(&conn, user)?
        };
        self.adopt_session(&session).await?;
        let _ = self.auth_tx.send(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    /// Cache the token in-process and, when configured, on disk.
    async fn adopt_session(&self, session: &Session) -> BackendResult<()> {
        *self.current_token.lock().await = Some(session.token.clone());
        if let Some(path) = &self.session_file {
            if let Some(dir) = path.parent()
                && !dir.as_os_str().is_empty()
            {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, &session.token)?;
        }
        Ok(())
    }

    async fn drop_session_token(&self) -> Option<String> {
        let token = self.current_token.lock().await.take();
        if let Some(path) = &self.session_file {
            fs::remove_file(path).ok();
        }
        token
    }

    /// Token restored from a previous invocation, if any.
    async fn restore_token(&self) -> Option<String> {
        if let Some(token) = self.current_token.lock().await.clone() {
            return Some(token);
        }
        let path = self.session_file.as_ref()?;
        let token = fs::read_to_string(path).ok()?.trim().to_string();
        if token.is_empty() {
            return None;
        }
        *self.current_token.lock().await = Some(token.clone());
        Some(token)
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn query(&self, table: Table, filter: &Filter) -> BackendResult<Vec<Value>> {
        let conn = self.conn.lock().await;
        let mut sql = format!("SELECT * FROM {}", table.as_str());
        let mut binds: Vec<rusqlite::types::Value> = Vec::new();
        let mut clauses: Vec<String> = Vec::new();
        for (col, v) in filter.eq_clauses() {
            binds.push(to_sql_value(v));
            clauses.push(format!("{} = ?{}", col, binds.len()));
        }
        for (col, v) in filter.neq_clauses() {
            binds.push(to_sql_value(v));
            clauses.push(format!("{} <> ?{}", col, binds.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if let Some((col, ascending)) = filter.ordering() {
            sql.push_str(" ORDER BY ");
            sql.push_str(col);
            sql.push_str(if ascending { " ASC" } else { " DESC" });
        }
        if let Some(n) = filter.row_limit() {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(binds), row_to_value)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    async fn mutate(&self, table: Table, mutation: Mutation) -> BackendResult<Option<Value>> {
        let conn = self.conn.lock().await;
        match mutation {
            Mutation::Insert(payload) => {
                let obj = payload.as_object().ok_or_else(|| {
                    BackendError::Malformed("insert payload must be an object".into())
                })?;
                let id = Uuid::new_v4().to_string();
                let mut cols = vec!["id"];
                let mut binds = vec![rusqlite::types::Value::Text(id.clone())];
                for col in table_columns(table) {
                    if let Some(v) = obj.get(*col) {
                        cols.push(col);
                        binds.push(to_sql_value(v));
                    }
                }
                let placeholders: Vec<String> =
                    (1..=binds.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    table.as_str(),
                    cols.join(", "),
                    placeholders.join(", ")
                );
                conn.execute(&sql, params_from_iter(binds))?;
                fetch_by_id(&conn, table, &id)
            }
            Mutation::Update { id, patch } => {
                let obj = patch.as_object().ok_or_else(|| {
                    BackendError::Malformed("update patch must be an object".into())
                })?;
                let mut sets: Vec<String> = Vec::new();
                let mut binds: Vec<rusqlite::types::Value> = Vec::new();
                for col in table_columns(table) {
                    if let Some(v) = obj.get(*col) {
                        binds.push(to_sql_value(v));
                        sets.push(format!("{} = ?{}", col, binds.len()));
                    }
                }
                if sets.is_empty() {
                    return fetch_by_id(&conn, table, &id);
                }
                binds.push(rusqlite::types::Value::Text(id.clone()));
                let sql = format!(
                    "UPDATE {} SET {} WHERE id = ?{}",
                    table.as_str(),
                    sets.join(", "),
                    binds.len()
                );
                let changed = conn.execute(&sql, params_from_iter(binds))?;
                if changed == 0 {
                    return Err(BackendError::NotFound(format!("{} id {id}", table.as_str())));
                }
                fetch_by_id(&conn, table, &id)
            }
            Mutation::Delete { id } => {
                let sql = format!("DELETE FROM {} WHERE id = ?1", table.as_str());
                conn.execute(&sql, params![id])?;
                Ok(None)
            }
            Mutation::DeleteWhere { column, value } => {
                let sql = format!("DELETE FROM {} WHERE {} = ?1", table.as_str(), column);
                conn.execute(&sql, params![to_sql_value(&value)])?;
                Ok(None)
            }
        }
    }

    async fn current_session(&self) -> BackendResult<Option<Session>> {
        let Some(token) = self.restore_token().await else {
            return Ok(None);
        };
        let conn = self.conn.lock().await;
        match load_session(&conn, &token)? {
            Some(session) => Ok(Some(session)),
            None => {
                // Stale token file: the session row is gone.
                drop(conn);
                self.drop_session_token().await;
                Ok(None)
            }
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(BackendError::InvalidEmail(email));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let session = {
            let conn = self.conn.lock().await;
            if find_user_by_email(&conn, &email)?.is_some() {
                return Err(BackendError::EmailTaken(email));
            }
            let user = User {
                id: Uuid::new_v4().to_string(),
                email,
                created_at: Utc::now(),
            };
            let salt = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO users (id, email, password_hash, salt, createdAt)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.email,
                    hash_password(&salt, password),
                    salt,
                    user.created_at.to_rfc3339(),
                ],
            )?;
            create_session(&conn, user)?
        };
        self.adopt_session(&session).await?;
        let _ = self.auth_tx.send(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let email = email.trim().to_lowercase();
        let session = {
            let conn = self.conn.lock().await;
            // Unknown account and wrong password answer identically.
            let (user, hash, salt) = find_user_by_email(&conn, &email)?
                .ok_or(BackendError::InvalidCredentials)?;
            if hash_password(&salt, password) != hash {
                return Err(BackendError::InvalidCredentials);
            }
            create_session(&conn, user)?
        };
        self.adopt_session(&session).await?;
        let _ = self.auth_tx.send(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn request_password_reset(
        &self,
        email: &str,
        redirect: Option<&str>,
    ) -> BackendResult<()> {
        // Nothing to redirect to locally; the token is redeemed in place.
        let token = self.issue_recovery_token(email).await?;
        tracing::info!(email, token, redirect, "recovery token issued");
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> BackendResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let token = self.restore_token().await.ok_or(BackendError::NoSession)?;
        let conn = self.conn.lock().await;
        let session = load_session(&conn, &token)?.ok_or(BackendError::NoSession)?;
        let salt = Uuid::new_v4().to_string();
        conn.execute(
            "UPDATE users SET password_hash = ?1, salt = ?2 WHERE id = ?3",
            params![
                hash_password(&salt, new_password),
                salt,
                session.user.id
            ],
        )?;
        Ok(())
    }

    async fn sign_out(&self) -> BackendResult<()> {
        if let Some(token) = self.drop_session_token().await {
            let conn = self.conn.lock().await;
            conn.execute("DELETE FROM auth_sessions WHERE token = ?1", params![token])?;
        }
        let _ = self.auth_tx.send(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe_auth(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_tx.subscribe()
    }
}

/// Full schema, idempotent. `items.categoryId` cascades on category
/// delete, which is what the store's single-delete path relies on.
fn init_schema(conn: &Connection) -> BackendResult<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            salt          TEXT NOT NULL,
            createdAt     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS auth_sessions (
            token     TEXT PRIMARY KEY,
            userId    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            createdAt TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recovery_tokens (
            token     TEXT PRIMARY KEY,
            userId    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            createdAt TEXT NOT NULL,
            used      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS shopping_lists (
            id        TEXT PRIMARY KEY,
            name      TEXT NOT NULL,
            createdAt TEXT NOT NULL,
            ownerId   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id      TEXT PRIMARY KEY,
            name    TEXT NOT NULL,
            ownerId TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS items (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            price       REAL NOT NULL DEFAULT 0,
            categoryId  TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            ownerId     TEXT NOT NULL,
            listId      TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            link        TEXT,
            observation TEXT
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            text        TEXT NOT NULL,
            senderId    TEXT NOT NULL,
            listId      TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            senderEmail TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lists_owner ON shopping_lists(ownerId, createdAt);
        CREATE INDEX IF NOT EXISTS idx_items_list ON items(listId);
        CREATE INDEX IF NOT EXISTS idx_items_category ON items(categoryId);
        CREATE INDEX IF NOT EXISTS idx_messages_list ON messages(listId, timestamp);
        "#,
    )?;
    Ok(())
}

/// Writable columns per table. Unknown payload keys are dropped, ids are
/// always minted server-side.
fn table_columns(table: Table) -> &'static [&'static str] {
    match table {
        Table::ShoppingLists => &["name", "createdAt", "ownerId"],
        Table::Categories => &["name", "ownerId"],
        Table::Items => &[
            "name",
            "price",
            "categoryId",
            "ownerId",
            "listId",
            "completed",
            "link",
            "observation",
        ],
        Table::Messages => &["text", "senderId", "listId", "timestamp", "senderEmail"],
    }
}

fn to_sql_value(v: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match v {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Sql::Integer(i),
            None => Sql::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => Sql::Text(s.clone()),
        other => Sql::Text(other.to_string()),
    }
}

fn row_to_value(row: &rusqlite::Row<'_>) -> rusqlite::Result<Value> {
    let mut obj = Map::new();
    let column_names: Vec<String> = row
        .as_ref()
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for (i, name) in column_names.iter().enumerate() {
        let v = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => json!(f),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::String(hex::encode(b)),
        };
        obj.insert(name.clone(), v);
    }
    Ok(Value::Object(obj))
}

fn fetch_by_id(conn: &Connection, table: Table, id: &str) -> BackendResult<Option<Value>> {
    let sql = format!("SELECT * FROM {} WHERE id = ?1", table.as_str());
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row(params![id], row_to_value).optional()?;
    Ok(row)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_raw: String = row.get("createdAt")?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        created_at,
    })
}

fn fetch_user(conn: &Connection, id: &str) -> BackendResult<User> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;
    let user = stmt
        .query_row(params![id], map_user)
        .optional()?
        .ok_or_else(|| BackendError::NotFound(format!("user {id}")))?;
    Ok(user)
}

/// Returns the user plus stored password hash and salt.
fn find_user_by_email(
    conn: &Connection,
    email: &str,
) -> BackendResult<Option<(User, String, String)>> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?1")?;
    let found = stmt
        .query_row(params![email], |row| {
            let user = map_user(row)?;
            let hash: String = row.get("password_hash")?;
            let salt: String = row.get("salt")?;
            Ok((user, hash, salt))
        })
        .optional()?;
    Ok(found)
}

fn create_session(conn: &Connection, user: User) -> BackendResult<Session> {
    let token = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO auth_sessions (token, userId, createdAt) VALUES (?1, ?2, ?3)",
        params![token, user.id, Utc::now().to_rfc3339()],
    )?;
    Ok(Session { token, user })
}

fn load_session(conn: &Connection, token: &str) -> BackendResult<Option<Session>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.email, u.createdAt
         FROM auth_sessions s
         JOIN users u ON u.id = s.userId
         WHERE s.token = ?1",
    )?;
    let user = stmt.query_row(params![token], map_user).optional()?;
    Ok(user.map(|user| Session {
        token: token.to_string(),
        user,
    }))
}
