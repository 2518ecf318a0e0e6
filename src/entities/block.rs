//! Block (lot) entity type

use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Clamp a health score into the valid [0, 100] range
pub fn clamp_health(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// A planted sub-area of an orchard with a single variety and structure
///
/// `latitude`/`longitude` are a GPS pair: either both present or both absent.
/// They are stored as two optional fields to stay wire-faithful, but every
/// constructor takes the pair together so the invariant holds on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique identifier
    pub id: EntityId,

    /// Owning orchard
    pub orchard_id: EntityId,

    /// Display name, e.g. "B3"
    pub name: String,

    /// Planted variety, e.g. "Jazz"
    #[serde(default)]
    pub variety: String,

    /// Planting structure, e.g. "2D V-trellis"
    #[serde(default)]
    pub structure_type: String,

    /// Number of planted rows
    #[serde(default)]
    pub row_count: u32,

    /// Planted area in hectares
    #[serde(default)]
    pub hectares: f64,

    /// GPS latitude (paired with longitude)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// GPS longitude (paired with latitude)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Block health score in [0, 100]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
}

impl Block {
    /// Create a new block under the given orchard
    pub fn new(orchard_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Blk),
            orchard_id,
            name: name.into(),
            variety: String::new(),
            structure_type: String::new(),
            row_count: 0,
            hectares: 0.0,
            latitude: None,
            longitude: None,
            health: None,
        }
    }

    pub fn with_variety(mut self, variety: impl Into<String>) -> Self {
        self.variety = variety.into();
        self
    }

    pub fn with_structure(mut self, structure_type: impl Into<String>) -> Self {
        self.structure_type = structure_type.into();
        self
    }

    pub fn with_layout(mut self, row_count: u32, hectares: f64) -> Self {
        self.row_count = row_count;
        self.hectares = hectares;
        self
    }

    /// Set or clear the GPS pair as a unit
    pub fn with_gps(mut self, gps: Option<(f64, f64)>) -> Self {
        match gps {
            Some((lat, lon)) => {
                self.latitude = Some(lat);
                self.longitude = Some(lon);
            }
            None => {
                self.latitude = None;
                self.longitude = None;
            }
        }
        self
    }

    pub fn with_health(mut self, health: Option<f64>) -> Self {
        self.health = health.map(clamp_health);
        self
    }

    /// The GPS pair, when complete
    pub fn gps(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Block {
        let orchard_id = EntityId::new(EntityPrefix::Orc);
        Block::new(orchard_id, "B3")
            .with_variety("Jazz")
            .with_structure("Tall spindle")
            .with_layout(12, 1.8)
    }

    #[test]
    fn test_block_roundtrip() {
        let block = block().with_gps(Some((-39.5903, 176.8506)));
        let json = serde_json::to_string(&block).unwrap();
        let parsed: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block, parsed);
    }

    #[test]
    fn test_block_wire_names_are_camel_case() {
        let json = serde_json::to_string(&block()).unwrap();
        assert!(json.contains("\"orchardId\""));
        assert!(json.contains("\"structureType\""));
        assert!(json.contains("\"rowCount\""));
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let json = serde_json::to_string(&block()).unwrap();
        assert!(!json.contains("latitude"));
        assert!(!json.contains("health"));
    }

    #[test]
    fn test_gps_is_all_or_nothing() {
        let b = block().with_gps(Some((-39.59, 176.85)));
        assert_eq!(b.gps(), Some((-39.59, 176.85)));
        let b = b.with_gps(None);
        assert_eq!(b.latitude, None);
        assert_eq!(b.longitude, None);
    }

    #[test]
    fn test_health_is_clamped() {
        assert_eq!(block().with_health(Some(130.0)).health, Some(100.0));
        assert_eq!(block().with_health(Some(-5.0)).health, Some(0.0));
        assert_eq!(block().with_health(Some(86.0)).health, Some(86.0));
    }
}
