//! Optimistic mutation policies.
//!
//! Three families, by how much protection each action gets:
//! - adds run under a placeholder id and roll back on backend failure
//! - renames, edits, toggles and item deletes apply locally and only log
//!   a remote failure
//! - the category delete is a staged composite with a full snapshot
//!   restore if even the fallback fails
//!
//! Stats are recomputed inside the same lock scope as any item change,
//! so no reader can observe items and stats out of step.

use crate::backend::{Backend, BackendError, Mutation, Table};
use crate::core::price::normalize_price;
use crate::core::store::{Store, decode};
use crate::errors::{AppError, AppResult};
use crate::models::{Category, Item, ItemPatch, Message, RecordId};
use serde_json::{Value, json};
use tracing::{debug, warn};

impl<B: Backend> Store<B> {
    // -----------------------------
    // Categories
    // -----------------------------

    /// Add a category under a placeholder id. Rolled back if the backend
    /// rejects the insert.
    pub async fn add_category(&self, name: &str) -> AppResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Mutation("category name must not be empty".into()));
        }
        let user = self.session_user().await?;
        let category = Category::new(name, user.id.as_str());
        let placeholder_id = category.id.clone();

        {
            let mut state = self.state.lock().await;
            state.categories.push(category.clone());
        }

        match self
            .backend
            .mutate(Table::Categories, Mutation::Insert(category.insert_payload()))
            .await
        {
            Ok(Some(row)) => match decode::<Category>(row) {
                Ok(confirmed) => {
                    let mut state = self.state.lock().await;
                    match state
                        .categories
                        .iter_mut()
                        .find(|c| c.id == placeholder_id)
                    {
                        Some(slot) => *slot = confirmed.clone(),
                        // Deleted while the insert was in flight; drop the
                        // late resolution.
                        None => {
                            warn!(id = %confirmed.id, "category vanished before insert resolved")
                        }
                    }
                    Ok(confirmed)
                }
                Err(e) => {
                    let mut state = self.state.lock().await;
                    state.categories.retain(|c| c.id != placeholder_id);
                    Err(e)
                }
            },
            other => {
                let reason = match other {
                    Err(e) => e.to_string(),
                    _ => "backend returned no row".into(),
                };
                let mut state = self.state.lock().await;
                state.categories.retain(|c| c.id != placeholder_id);
                Err(AppError::Mutation(format!("could not add category: {reason}")))
            }
        }
    }

    /// Rename in place, then tell the backend. A remote failure only
    /// logs; the local rename stands.
    pub async fn rename_category(&self, id: &RecordId, name: &str) -> AppResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Mutation("category name must not be empty".into()));
        }
        {
            let mut state = self.state.lock().await;
            let category = state
                .categories
                .iter_mut()
                .find(|c| c.id == *id)
                .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;
            category.name = name.to_string();
        }
        match id.server() {
            Some(server_id) => {
                let mutation = Mutation::Update {
                    id: server_id.to_string(),
                    patch: json!({ "name": name }),
                };
                if let Err(e) = self.backend.mutate(Table::Categories, mutation).await {
                    warn!(error = %e, category = %id, "category rename did not reach the backend");
                }
            }
            None => debug!(category = %id, "rename of unsynced category kept local"),
        }
        Ok(())
    }

    /// Delete a category and every item in it.
    ///
    /// Local state drops both immediately. Remotely the plain category
    /// delete goes first (the backend cascades); on failure the explicit
    /// two-step fallback runs (items by category, then the category).
    /// Only if the fallback fails too is the snapshot restored and the
    /// error surfaced.
    pub async fn delete_category(&self, id: &RecordId) -> AppResult<()> {
        let (categories_backup, items_backup) = {
            let mut state = self.state.lock().await;
            if !state.categories.iter().any(|c| c.id == *id) {
                return Err(AppError::NotFound(format!("category {id}")));
            }
            let categories_backup = state.categories.clone();
            let items_backup = state.items.clone();
            state.categories.retain(|c| c.id != *id);
            state.items.retain(|i| i.category_id != *id);
            state.recompute_stats();
            (categories_backup, items_backup)
        };

        let Some(server_id) = id.server() else {
            // Never reached the backend; nothing to delete remotely.
            return Ok(());
        };

        let delete_category = Mutation::Delete {
            id: server_id.to_string(),
        };
        if let Err(e) = self
            .backend
            .mutate(Table::Categories, delete_category.clone())
            .await
        {
            warn!(error = %e, category = %id, "cascade delete failed, retrying items-then-category");

            let fallback: Result<(), BackendError> = async {
                self.backend
                    .mutate(
                        Table::Items,
                        Mutation::DeleteWhere {
                            column: "categoryId",
                            value: Value::String(server_id.to_string()),
                        },
                    )
                    .await?;
                self.backend.mutate(Table::Categories, delete_category).await?;
                Ok(())
            }
            .await;

            if let Err(e) = fallback {
                let mut state = self.state.lock().await;
                state.categories = categories_backup;
                state.items = items_backup;
                state.recompute_stats();
                return Err(AppError::Mutation(format!("could not delete category: {e}")));
            }
        }
        Ok(())
    }

    // -----------------------------
    // Items
    // -----------------------------

    /// Add an item under a placeholder id. The raw price input goes
    /// through the normalizer before anything is stored. Rolled back if
    /// the backend rejects the insert.
    pub async fn add_item(
        &self,
        name: &str,
        price_input: &str,
        category_id: &RecordId,
        link: Option<String>,
        observation: Option<String>,
    ) -> AppResult<Item> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Mutation("item name must not be empty".into()));
        }
        let price = normalize_price(Some(price_input));
        let (user, list) = self.session_context().await?;

        let item = {
            let mut state = self.state.lock().await;
            if !state.categories.iter().any(|c| c.id == *category_id) {
                return Err(AppError::NotFound(format!("category {category_id}")));
            }
            let item = Item::new(
                name,
                price,
                category_id.clone(),
                user.id.as_str(),
                list.id.clone(),
                link,
                observation,
            );
            state.items.push(item.clone());
            state.recompute_stats();
            item
        };
        let placeholder_id = item.id.clone();

        match self
            .backend
            .mutate(Table::Items, Mutation::Insert(item.insert_payload()))
            .await
        {
            Ok(Some(row)) => match decode::<Item>(row) {
                Ok(confirmed) => {
                    let mut state = self.state.lock().await;
                    match state.items.iter_mut().find(|i| i.id == placeholder_id) {
                        Some(slot) => *slot = confirmed.clone(),
                        // Deleted while the insert was in flight; drop the
                        // late resolution.
                        None => warn!(id = %confirmed.id, "item vanished before insert resolved"),
                    }
                    state.recompute_stats();
                    Ok(confirmed)
                }
                Err(e) => {
                    self.rollback_item(&placeholder_id).await;
                    Err(e)
                }
            },
            other => {
                let reason = match other {
                    Err(e) => e.to_string(),
                    _ => "backend returned no row".into(),
                };
                self.rollback_item(&placeholder_id).await;
                Err(AppError::Mutation(format!("could not add item: {reason}")))
            }
        }
    }

    /// Patch an item locally, then fire the same patch at the backend.
    /// Remote failure only logs; the local edit stands.
    pub async fn update_item(&self, id: &RecordId, patch: ItemPatch) -> AppResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let price = patch.price.as_deref().map(|raw| normalize_price(Some(raw)));

        let wire_patch = {
            let mut state = self.state.lock().await;
            if let Some(target) = &patch.category_id
                && !state.categories.iter().any(|c| c.id == *target)
            {
                return Err(AppError::NotFound(format!("category {target}")));
            }
            let item = state
                .items
                .iter_mut()
                .find(|i| i.id == *id)
                .ok_or_else(|| AppError::NotFound(format!("item {id}")))?;

            let mut wire = serde_json::Map::new();
            if let Some(name) = &patch.name {
                item.name = name.clone();
                wire.insert("name".into(), json!(name));
            }
            if let Some(price) = price {
                item.price = price;
                wire.insert("price".into(), json!(price));
            }
            if let Some(category_id) = &patch.category_id {
                item.category_id = category_id.clone();
                wire.insert("categoryId".into(), json!(category_id.to_string()));
            }
            if let Some(link) = &patch.link {
                item.link = (!link.is_empty()).then(|| link.clone());
                wire.insert("link".into(), json!(item.link));
            }
            if let Some(observation) = &patch.observation {
                item.observation = (!observation.is_empty()).then(|| observation.clone());
                wire.insert("observation".into(), json!(item.observation));
            }
            state.recompute_stats();
            Value::Object(wire)
        };

        match id.server() {
            Some(server_id) => {
                let mutation = Mutation::Update {
                    id: server_id.to_string(),
                    patch: wire_patch,
                };
                if let Err(e) = self.backend.mutate(Table::Items, mutation).await {
                    warn!(error = %e, item = %id, "item update did not reach the backend");
                }
            }
            None => debug!(item = %id, "update of unsynced item kept local"),
        }
        Ok(())
    }

    /// Flip completion and fire the new flag at the backend. Returns the
    /// new completion state. Remote failure only logs.
    pub async fn toggle_item(&self, id: &RecordId) -> AppResult<bool> {
        let completed = {
            let mut state = self.state.lock().await;
            let item = state
                .items
                .iter_mut()
                .find(|i| i.id == *id)
                .ok_or_else(|| AppError::NotFound(format!("item {id}")))?;
            item.completed = !item.completed;
            let completed = item.completed;
            state.recompute_stats();
            completed
        };

        match id.server() {
            Some(server_id) => {
                let mutation = Mutation::Update {
                    id: server_id.to_string(),
                    patch: json!({ "completed": completed }),
                };
                if let Err(e) = self.backend.mutate(Table::Items, mutation).await {
                    warn!(error = %e, item = %id, "toggle did not reach the backend");
                }
            }
            None => debug!(item = %id, "toggle of unsynced item kept local"),
        }
        Ok(completed)
    }

    /// Drop the item locally, then fire the remote delete. Remote
    /// failure only logs.
    pub async fn delete_item(&self, id: &RecordId) -> AppResult<()> {
        {
            let mut state = self.state.lock().await;
            let before = state.items.len();
            state.items.retain(|i| i.id != *id);
            if state.items.len() == before {
                return Err(AppError::NotFound(format!("item {id}")));
            }
            state.recompute_stats();
        }

        match id.server() {
            Some(server_id) => {
                let mutation = Mutation::Delete {
                    id: server_id.to_string(),
                };
                if let Err(e) = self.backend.mutate(Table::Items, mutation).await {
                    warn!(error = %e, item = %id, "item delete did not reach the backend");
                }
            }
            None => debug!(item = %id, "unsynced item dropped locally only"),
        }
        Ok(())
    }

    // -----------------------------
    // Messages
    // -----------------------------

    /// Append a chat message under a placeholder id. Rolled back if the
    /// backend rejects the insert.
    pub async fn add_message(&self, text: &str) -> AppResult<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Mutation("message text must not be empty".into()));
        }
        let (user, list) = self.session_context().await?;
        let message = Message::new(text, &user, list.id.clone());
        let placeholder_id = message.id.clone();

        {
            let mut state = self.state.lock().await;
            state.messages.push(message.clone());
        }

        match self
            .backend
            .mutate(Table::Messages, Mutation::Insert(message.insert_payload()))
            .await
        {
            Ok(Some(row)) => match decode::<Message>(row) {
                Ok(confirmed) => {
                    let mut state = self.state.lock().await;
                    match state
                        .messages
                        .iter_mut()
                        .find(|m| m.id == placeholder_id)
                    {
                        // Replace in place so the chat ordering is untouched.
                        Some(slot) => *slot = confirmed.clone(),
                        None => {
                            warn!(id = %confirmed.id, "message vanished before insert resolved")
                        }
                    }
                    Ok(confirmed)
                }
                Err(e) => {
                    let mut state = self.state.lock().await;
                    state.messages.retain(|m| m.id != placeholder_id);
                    Err(e)
                }
            },
            other => {
                let reason = match other {
                    Err(e) => e.to_string(),
                    _ => "backend returned no row".into(),
                };
                let mut state = self.state.lock().await;
                state.messages.retain(|m| m.id != placeholder_id);
                Err(AppError::Mutation(format!("could not send message: {reason}")))
            }
        }
    }

    async fn rollback_item(&self, placeholder_id: &RecordId) {
        let mut state = self.state.lock().await;
        state.items.retain(|i| i.id != *placeholder_id);
        state.recompute_stats();
    }
}
