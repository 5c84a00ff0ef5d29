use super::record_id::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name given to the list created on first sign-in.
pub const DEFAULT_LIST_NAME: &str = "Minha Lista de Compras";

/// A shopping list. The newest list owned by the user is the active one;
/// older lists stay readable as archives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: RecordId, // ⇔ shopping_lists.id (TEXT, uuid)
    pub name: String, // ⇔ shopping_lists.name
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>, // ⇔ shopping_lists.createdAt (TEXT, RFC3339)
    #[serde(rename = "ownerId")]
    pub owner_id: String, // ⇔ shopping_lists.ownerId (user uuid)
}

impl ShoppingList {
    /// Wire payload for creating a list. Lists are never inserted
    /// optimistically, so there is no id to omit here; the backend
    /// mints it.
    pub fn insert_payload(name: &str, owner_id: &str) -> Value {
        json!({
            "name": name,
            "createdAt": Utc::now().to_rfc3339(),
            "ownerId": owner_id,
        })
    }
}
