use super::record_id::RecordId;
use super::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One chat message attached to a list. Messages are append-only and
/// rendered oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "RecordId::placeholder")]
    pub id: RecordId, // ⇔ messages.id (TEXT, uuid)
    pub text: String, // ⇔ messages.text
    #[serde(rename = "senderId")]
    pub sender_id: String, // ⇔ messages.senderId (user uuid)
    #[serde(rename = "listId")]
    pub list_id: RecordId, // ⇔ messages.listId
    pub timestamp: DateTime<Utc>, // ⇔ messages.timestamp (TEXT, RFC3339)
    #[serde(rename = "senderEmail")]
    pub sender_email: String, // ⇔ messages.senderEmail
}

impl Message {
    /// Message created locally, pending backend acknowledgement.
    pub fn new(text: impl Into<String>, sender: &User, list_id: RecordId) -> Self {
        Self {
            id: RecordId::placeholder(),
            text: text.into(),
            sender_id: sender.id.clone(),
            list_id,
            timestamp: Utc::now(),
            sender_email: sender.email.clone(),
        }
    }

    /// Wire payload for the insert. The placeholder id stays local.
    pub fn insert_payload(&self) -> Value {
        json!({
            "text": self.text,
            "senderId": self.sender_id,
            "listId": self.list_id.to_string(),
            "timestamp": self.timestamp.to_rfc3339(),
            "senderEmail": self.sender_email,
        })
    }

    /// Local part of the sender address, shown in the chat view.
    pub fn sender_label(&self) -> &str {
        self.sender_email.split('@').next().unwrap_or_default()
    }
}
