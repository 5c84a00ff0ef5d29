use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated account, as reported by the backend session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,    // ⇔ users.id (TEXT, uuid)
    pub email: String, // ⇔ users.email
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>, // ⇔ users.createdAt (TEXT, RFC3339)
}

impl User {
    /// Local part of the address, used as the short display name.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or_default()
    }
}
