use super::record_id::RecordId;
use crate::core::price::normalize_price_value;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(default = "RecordId::placeholder")]
    pub id: RecordId, // ⇔ items.id (TEXT, uuid)
    pub name: String, // ⇔ items.name
    #[serde(default, deserialize_with = "de_price")]
    pub price: f64, // ⇔ items.price (canonical, >= 0)
    #[serde(rename = "categoryId")]
    pub category_id: RecordId, // ⇔ items.categoryId
    #[serde(rename = "ownerId")]
    pub owner_id: String, // ⇔ items.ownerId (user uuid)
    #[serde(rename = "listId")]
    pub list_id: RecordId, // ⇔ items.listId
    #[serde(default, deserialize_with = "de_flag")]
    pub completed: bool, // ⇔ items.completed (0|1)
    #[serde(default)]
    pub link: Option<String>, // ⇔ items.link
    #[serde(default)]
    pub observation: Option<String>, // ⇔ items.observation
}

impl Item {
    /// Item created locally, pending backend acknowledgement.
    /// `price` must already be canonical.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        price: f64,
        category_id: RecordId,
        owner_id: impl Into<String>,
        list_id: RecordId,
        link: Option<String>,
        observation: Option<String>,
    ) -> Self {
        Self {
            id: RecordId::placeholder(),
            name: name.into(),
            price,
            category_id,
            owner_id: owner_id.into(),
            list_id,
            completed: false,
            link,
            observation,
        }
    }

    /// Wire payload for the insert. The placeholder id stays local.
    pub fn insert_payload(&self) -> Value {
        json!({
            "name": self.name,
            "price": self.price,
            "categoryId": self.category_id.to_string(),
            "ownerId": self.owner_id,
            "listId": self.list_id.to_string(),
            "completed": self.completed,
            "link": self.link,
            "observation": self.observation,
        })
    }
}

/// Partial update for an item. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    /// Raw price input; the store canonicalizes it before applying.
    pub price: Option<String>,
    pub category_id: Option<RecordId>,
    /// `Some("")` clears the link.
    pub link: Option<String>,
    /// `Some("")` clears the observation.
    pub observation: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
            && self.link.is_none()
            && self.observation.is_none()
    }
}

/// The backend is allowed to hand prices back as strings or numbers;
/// both are folded into the canonical decimal on the way in.
fn de_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_price_value(&raw))
}

/// SQLite reports booleans as 0/1 integers.
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        _ => Ok(false),
    }
}
