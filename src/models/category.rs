use super::record_id::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Items moved here are hidden from the main list view.
pub const ARCHIVED_CATEGORY: &str = "Arquivados";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default = "RecordId::placeholder")]
    pub id: RecordId, // ⇔ categories.id (TEXT, uuid)
    pub name: String, // ⇔ categories.name
    #[serde(rename = "ownerId")]
    pub owner_id: String, // ⇔ categories.ownerId (user uuid)
}

impl Category {
    /// Category created locally, pending backend acknowledgement.
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: RecordId::placeholder(),
            name: name.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Wire payload for the insert. The placeholder id stays local.
    pub fn insert_payload(&self) -> Value {
        json!({
            "name": self.name,
            "ownerId": self.owner_id,
        })
    }

    pub fn is_archive(&self) -> bool {
        self.name == ARCHIVED_CATEGORY
    }
}
