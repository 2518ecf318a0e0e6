//! Audit entry entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Which kind of record an audit entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditTarget {
    Sector,
    Orchard,
    Block,
    Tree,
}

impl std::fmt::Display for AuditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditTarget::Sector => write!(f, "sector"),
            AuditTarget::Orchard => write!(f, "orchard"),
            AuditTarget::Block => write!(f, "block"),
            AuditTarget::Tree => write!(f, "tree"),
        }
    }
}

/// One immutable record of a change to the store
///
/// Append-only: never mutated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique identifier
    pub id: EntityId,

    /// When the change happened
    #[serde(with = "crate::entities::iso_millis")]
    pub at: DateTime<Utc>,

    /// Operator who made the change
    pub who: String,

    /// Kind of record changed
    pub entity: AuditTarget,

    /// Id of the record changed
    pub entity_id: EntityId,

    /// Human-readable description, e.g. `quantity: 18 → 19`
    pub message: String,
}

impl AuditEntry {
    pub fn new(
        entity: AuditTarget,
        entity_id: EntityId,
        who: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Aud),
            at: Utc::now(),
            who: who.into(),
            entity,
            entity_id,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_entry_roundtrip() {
        let entry = AuditEntry::new(
            AuditTarget::Tree,
            EntityId::new(EntityPrefix::Evt),
            "alex",
            "quantity: 18 → 19",
        );
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, parsed);
    }

    #[test]
    fn test_target_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&AuditTarget::Sector).unwrap(),
            "\"sector\""
        );
        assert_eq!(
            serde_json::to_string(&AuditTarget::Tree).unwrap(),
            "\"tree\""
        );
    }
}
