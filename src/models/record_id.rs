use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reserved prefix for ids minted on this device. Backend ids never carry it.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Identifier of a synced record.
///
/// Optimistic inserts run under a `Local` placeholder until the backend
/// acknowledges the row; everything read back from the backend carries a
/// `Server` id. On the wire both render as a plain string, local ids under
/// the reserved `local-` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordId {
    Local(Uuid),
    Server(String),
}

impl RecordId {
    /// Fresh placeholder id for a record that has not reached the backend yet.
    pub fn placeholder() -> Self {
        RecordId::Local(Uuid::new_v4())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, RecordId::Local(_))
    }

    /// Backend-side id, if this record has been acknowledged.
    pub fn server(&self) -> Option<&str> {
        match self {
            RecordId::Server(id) => Some(id.as_str()),
            RecordId::Local(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Local(uuid) => write!(f, "{LOCAL_ID_PREFIX}{uuid}"),
            RecordId::Server(id) => f.write_str(id),
        }
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        match s
            .strip_prefix(LOCAL_ID_PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
        {
            Some(uuid) => RecordId::Local(uuid),
            None => RecordId::Server(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::from(s.to_string())
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_round_trips_through_string() {
        let id = RecordId::placeholder();
        assert!(id.is_local());
        assert!(RecordId::from(id.to_string()).is_local());
    }

    #[test]
    fn server_ids_never_parse_as_local() {
        let id = RecordId::from("3f2c9a44-1d7e-4f2e-9a14-000000000000");
        assert!(!id.is_local());
        assert!(id.server().is_some());
        // the reserved prefix alone is not enough, the rest must be a uuid
        assert!(!RecordId::from("local-not-a-uuid").is_local());
    }
}
