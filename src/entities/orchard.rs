//! Orchard entity type

use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// A named growing site belonging to one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orchard {
    /// Unique identifier
    pub id: EntityId,

    /// Owning sector
    pub sector_id: EntityId,

    /// Display name
    pub name: String,
}

impl Orchard {
    /// Create a new orchard under the given sector
    pub fn new(sector_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Orc),
            sector_id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchard_roundtrip() {
        let sector_id = EntityId::new(crate::core::identity::EntityPrefix::Sec);
        let orchard = Orchard::new(sector_id, "Tutaekuri");
        let json = serde_json::to_string(&orchard).unwrap();
        let parsed: Orchard = serde_json::from_str(&json).unwrap();
        assert_eq!(orchard, parsed);
    }

    #[test]
    fn test_orchard_wire_names_are_camel_case() {
        let sector_id = EntityId::parse("SEC-1").unwrap();
        let orchard = Orchard::new(sector_id, "Clive");
        let json = serde_json::to_string(&orchard).unwrap();
        assert!(json.contains("\"sectorId\""));
    }
}
