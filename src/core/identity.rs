//! Entity identity - prefixed ULID identifiers
//!
//! Generated ids look like `SEC-01JA3F8Z9QK4N2X7B5C6D8E9F0`. Ids that arrive
//! through CSV import or an external database are treated as opaque strings;
//! the only hard rule is that an id is never empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes for generated ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityPrefix {
    /// Sector
    Sec,
    /// Orchard
    Orc,
    /// Block (lot)
    Blk,
    /// Tree-change event
    Evt,
    /// Audit entry
    Aud,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Sec => "SEC",
            EntityPrefix::Orc => "ORC",
            EntityPrefix::Blk => "BLK",
            EntityPrefix::Evt => "EVT",
            EntityPrefix::Aud => "AUD",
        }
    }
}

impl std::fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SEC" => Ok(EntityPrefix::Sec),
            "ORC" => Ok(EntityPrefix::Orc),
            "BLK" => Ok(EntityPrefix::Blk),
            "EVT" => Ok(EntityPrefix::Evt),
            "AUD" => Ok(EntityPrefix::Aud),
            _ => Err(format!("Unknown entity prefix: {}", s)),
        }
    }
}

/// Errors from parsing an entity id
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("entity id must not be empty")]
    Empty,
}

/// Opaque, globally unique entity identifier
///
/// Wire format is a plain string, so foreign ids survive a round trip
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh id with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self(format!("{}-{}", prefix.as_str(), Ulid::new()))
    }

    /// Accept an existing id string (imported data, storage rows)
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_carries_prefix() {
        let id = EntityId::new(EntityPrefix::Sec);
        assert!(id.as_str().starts_with("SEC-"));
        // 3 prefix + 1 dash + 26 ULID
        assert_eq!(id.as_str().len(), 30);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = EntityId::new(EntityPrefix::Evt);
        let b = EntityId::new(EntityPrefix::Evt);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_accepts_opaque_ids() {
        let id = EntityId::parse("a1b2c3").unwrap();
        assert_eq!(id.as_str(), "a1b2c3");
        assert_eq!(EntityId::parse("  "), Err(IdError::Empty));
    }

    #[test]
    fn test_prefix_from_str() {
        assert_eq!("sec".parse::<EntityPrefix>().unwrap(), EntityPrefix::Sec);
        assert_eq!("EVT".parse::<EntityPrefix>().unwrap(), EntityPrefix::Evt);
        assert!("XYZ".parse::<EntityPrefix>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = EntityId::parse("BLK-01ABC").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"BLK-01ABC\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
