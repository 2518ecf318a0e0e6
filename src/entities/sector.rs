//! Sector entity type - top of the orchard hierarchy

use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// A geographic/administrative grouping of orchards
///
/// Names need not be unique; identity is always the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Unique identifier
    pub id: EntityId,

    /// Display name
    pub name: String,
}

impl Sector {
    /// Create a new sector with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Sec),
            name: name.into(),
        }
    }
}
