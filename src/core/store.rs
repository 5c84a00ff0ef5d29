//! Session-scoped data store.
//!
//! Owns every piece of per-session state (user, active list, categories,
//! items, messages, stats) behind one mutex and drives the auth and
//! hydration lifecycle against the backend seam. Mutation policies live
//! in `core::mutations`.

use crate::backend::{AuthEvent, Backend, BackendError, Filter, Mutation, Table};
use crate::core::stats::compute_stats;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Category, DEFAULT_LIST_NAME, Item, Message, RecordId, ShoppingList, StatsSnapshot, User,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Unauthenticated,
    Authenticating,
    Hydrating,
    Ready,
}

/// Everything scoped to the signed-in user. Replaced wholesale on
/// sign-in and sign-out; never partially cleared.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub current_list: Option<ShoppingList>,
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub messages: Vec<Message>,
    pub stats: StatsSnapshot,
}

impl StoreState {
    /// Rebuild the aggregate from the full item set. Called inside the
    /// same lock scope as the item change it reflects.
    pub(crate) fn recompute_stats(&mut self) {
        self.stats = compute_stats(&self.items);
    }
}

pub struct Store<B: Backend> {
    pub(crate) backend: Arc<B>,
    pub(crate) state: Arc<Mutex<StoreState>>,
    default_list_name: String,
}

impl<B: Backend> Clone for Store<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            state: self.state.clone(),
            default_list_name: self.default_list_name.clone(),
        }
    }
}

impl<B: Backend> Store<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(StoreState::default())),
            default_list_name: DEFAULT_LIST_NAME.to_string(),
        }
    }

    /// Override the name given to the list created on first sign-in.
    pub fn with_default_list_name(mut self, name: impl Into<String>) -> Self {
        self.default_list_name = name.into();
        self
    }

    /// Cloned view of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    /// Restore a persisted session, if the backend has one. Returns
    /// whether a session was found (and the store hydrated).
    pub async fn bootstrap(&self) -> AppResult<bool> {
        match self.backend.current_session().await? {
            Some(session) => {
                self.enter_session(session.user).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<()> {
        self.set_phase(SessionPhase::Authenticating).await;
        match self.backend.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.enter_session(session.user).await;
                Ok(())
            }
            Err(e) => {
                self.set_phase(SessionPhase::Unauthenticated).await;
                Err(AppError::Auth(e.to_string()))
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<()> {
        self.set_phase(SessionPhase::Authenticating).await;
        match self.backend.sign_up(email, password).await {
            Ok(session) => {
                self.enter_session(session.user).await;
                Ok(())
            }
            Err(e) => {
                self.set_phase(SessionPhase::Unauthenticated).await;
                Err(AppError::Auth(e.to_string()))
            }
        }
    }

    /// Sign out and drop every piece of session state in one step.
    pub async fn sign_out(&self) -> AppResult<()> {
        if let Err(e) = self.backend.sign_out().await {
            // Local state is cleared regardless; the remote session ages out.
            warn!(error = %e, "sign-out request failed");
        }
        self.reset_state().await;
        Ok(())
    }

    /// Start a password recovery for `email`. How the recovery secret
    /// reaches the user, and whether `redirect` means anything, is up
    /// to the backend.
    pub async fn request_password_reset(
        &self,
        email: &str,
        redirect: Option<&str>,
    ) -> AppResult<()> {
        self.backend
            .request_password_reset(email, redirect)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))
    }

    /// Change the signed-in user's password.
    pub async fn update_password(&self, new_password: &str) -> AppResult<()> {
        self.session_user().await?;
        self.backend
            .update_password(new_password)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))
    }

    /// Bridge the backend's auth broadcast into this store: every event
    /// received drives [`Store::handle_auth_event`], so an out-of-band
    /// sign-in hydrates and an out-of-band sign-out tears the session
    /// down. Runs until the backend drops its sender or the returned
    /// handle is aborted.
    pub fn attach_auth_events(&self) -> JoinHandle<()>
    where
        B: 'static,
    {
        let store = self.clone();
        let mut events = self.backend.subscribe_auth();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => store.handle_auth_event(event).await,
                    // Skipped events are fine: the next one re-converges
                    // the session either way.
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "auth event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Apply a backend auth transition. Converges on the same two
    /// internal transitions the imperative calls use.
    pub async fn handle_auth_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => {
                let already_in = {
                    let state = self.state.lock().await;
                    state.phase == SessionPhase::Ready
                        && state.user.as_ref().is_some_and(|u| u.id == user.id)
                };
                if !already_in {
                    self.enter_session(user).await;
                }
            }
            AuthEvent::SignedOut => self.reset_state().await,
        }
    }

    // -----------------------------
    // Session transitions
    // -----------------------------

    async fn enter_session(&self, user: User) {
        {
            let mut state = self.state.lock().await;
            state.phase = SessionPhase::Hydrating;
            state.user = Some(user.clone());
        }
        self.hydrate(&user).await;
    }

    async fn reset_state(&self) {
        let mut state = self.state.lock().await;
        *state = StoreState::default();
    }

    async fn set_phase(&self, phase: SessionPhase) {
        self.state.lock().await.phase = phase;
    }

    pub(crate) async fn session_user(&self) -> AppResult<User> {
        self.state.lock().await.user.clone().ok_or_else(no_session)
    }

    pub(crate) async fn session_context(&self) -> AppResult<(User, ShoppingList)> {
        let state = self.state.lock().await;
        let user = state.user.clone().ok_or_else(no_session)?;
        let list = state
            .current_list
            .clone()
            .ok_or_else(|| AppError::Session("no active shopping list".into()))?;
        Ok((user, list))
    }

    // -----------------------------
    // Hydration
    // -----------------------------

    /// Load everything the session needs, in order: active list (created
    /// on first run), categories, then items and messages of that list.
    /// A failed step logs and leaves its collection empty; the session
    /// still reaches Ready.
    async fn hydrate(&self, user: &User) {
        let list = match self.fetch_or_create_list(user).await {
            Ok(list) => Some(list),
            Err(e) => {
                warn!(error = %e, "list hydration failed");
                None
            }
        };

        let categories = match self.fetch_categories(user).await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "category hydration failed");
                Vec::new()
            }
        };

        let (items, messages) = match &list {
            Some(list) => {
                let items = match self.fetch_items(&list.id).await {
                    Ok(items) => items,
                    Err(e) => {
                        warn!(error = %e, "item hydration failed");
                        Vec::new()
                    }
                };
                let messages = match self.fetch_messages(&list.id).await {
                    Ok(messages) => messages,
                    Err(e) => {
                        warn!(error = %e, "message hydration failed");
                        Vec::new()
                    }
                };
                (items, messages)
            }
            None => (Vec::new(), Vec::new()),
        };

        // Single lock scope: the populated state becomes visible at once.
        let mut state = self.state.lock().await;
        state.current_list = list;
        state.categories = categories;
        state.items = items;
        state.messages = messages;
        state.recompute_stats();
        state.phase = SessionPhase::Ready;
    }

    /// Newest list owned by the user, created on first run.
    async fn fetch_or_create_list(&self, user: &User) -> AppResult<ShoppingList> {
        let rows = self
            .backend
            .query(
                Table::ShoppingLists,
                &Filter::new()
                    .eq("ownerId", user.id.as_str())
                    .order_by("createdAt", false)
                    .limit(1),
            )
            .await?;
        if let Some(row) = rows.into_iter().next() {
            return decode(row);
        }

        debug!("no shopping list found, creating the default one");
        let created = self
            .backend
            .mutate(
                Table::ShoppingLists,
                Mutation::Insert(ShoppingList::insert_payload(
                    &self.default_list_name,
                    &user.id,
                )),
            )
            .await?
            .ok_or_else(|| AppError::Other("backend returned no row for the created list".into()))?;
        decode(created)
    }

    async fn fetch_categories(&self, user: &User) -> AppResult<Vec<Category>> {
        let rows = self
            .backend
            .query(
                Table::Categories,
                &Filter::new().eq("ownerId", user.id.as_str()),
            )
            .await?;
        rows.into_iter().map(decode).collect()
    }

    async fn fetch_items(&self, list_id: &RecordId) -> AppResult<Vec<Item>> {
        let rows = self
            .backend
            .query(
                Table::Items,
                &Filter::new().eq("listId", list_id.to_string()),
            )
            .await?;
        rows.into_iter().map(decode).collect()
    }

    async fn fetch_messages(&self, list_id: &RecordId) -> AppResult<Vec<Message>> {
        let rows = self
            .backend
            .query(
                Table::Messages,
                &Filter::new()
                    .eq("listId", list_id.to_string())
                    .order_by("timestamp", true),
            )
            .await?;
        rows.into_iter().map(decode).collect()
    }

    // -----------------------------
    // Archived lists (read-only)
    // -----------------------------

    /// Older lists owned by the user, newest first. The active list is
    /// excluded.
    pub async fn fetch_archived_lists(&self) -> AppResult<Vec<ShoppingList>> {
        let (user, current_id) = {
            let state = self.state.lock().await;
            let user = state.user.clone().ok_or_else(no_session)?;
            (user, state.current_list.as_ref().map(|l| l.id.to_string()))
        };
        let mut filter = Filter::new()
            .eq("ownerId", user.id.as_str())
            .order_by("createdAt", false);
        if let Some(id) = current_id {
            filter = filter.neq("id", id);
        }
        let rows = self.backend.query(Table::ShoppingLists, &filter).await?;
        rows.into_iter().map(decode).collect()
    }

    /// Items of one archived list. Prices come back canonical.
    pub async fn fetch_list_items(&self, list_id: &RecordId) -> AppResult<Vec<Item>> {
        self.fetch_items(list_id).await
    }
}

pub(crate) fn no_session() -> AppError {
    AppError::Session("no active session".into())
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(row: Value) -> AppResult<T> {
    Ok(serde_json::from_value(row).map_err(BackendError::from)?)
}
