//! Tree-change event entity type

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// What happened to the trees in this event
///
/// Doubles as the CLI value for `--status` on event entry, where only
/// concrete statuses make sense (listing commands take a filter instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
pub enum EventStatus {
    #[default]
    #[serde(rename = "New Planting")]
    NewPlanting,
    #[serde(rename = "Replanting")]
    Replanting,
    #[serde(rename = "Kneecapped")]
    Kneecapped,
    #[serde(rename = "Grafted")]
    Grafted,
    #[serde(rename = "Removed")]
    Removed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::NewPlanting => "New Planting",
            EventStatus::Replanting => "Replanting",
            EventStatus::Kneecapped => "Kneecapped",
            EventStatus::Grafted => "Grafted",
            EventStatus::Removed => "Removed",
        }
    }

    /// Map a status name from the deprecated flat per-tree schema
    ///
    /// Legacy inventory rows re-enter as planting records ("OK"/"Attention"/
    /// "New"); only "Removed" survives as-is. Unknown names get the default.
    pub fn from_legacy(s: &str) -> Self {
        match s {
            "Removed" => EventStatus::Removed,
            _ => EventStatus::NewPlanting,
        }
    }

    pub const ALL: [EventStatus; 5] = [
        EventStatus::NewPlanting,
        EventStatus::Replanting,
        EventStatus::Kneecapped,
        EventStatus::Grafted,
        EventStatus::Removed,
    ];
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new planting" => Ok(EventStatus::NewPlanting),
            "replanting" => Ok(EventStatus::Replanting),
            "kneecapped" => Ok(EventStatus::Kneecapped),
            "grafted" => Ok(EventStatus::Grafted),
            "removed" => Ok(EventStatus::Removed),
            _ => Err(format!("Unknown event status: {}", s)),
        }
    }
}

/// A recorded change affecting some quantity of trees within one block
///
/// The three scope ids are entered together by the caller and must stay
/// mutually consistent; the store rejects a save with any of them empty but
/// does not re-derive them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEvent {
    /// Unique identifier
    pub id: EntityId,

    /// Scope: owning sector
    pub sector_id: EntityId,

    /// Scope: owning orchard
    pub orchard_id: EntityId,

    /// Scope: owning block
    pub block_id: EntityId,

    /// Number of trees affected; absent only on records that arrived via
    /// import/storage, the save path requires it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    /// Change kind
    #[serde(default)]
    pub status: EventStatus,

    /// Estimated tray-carton-equivalent value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tce: Option<f64>,

    /// Rootstock, e.g. "M9"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootstock: Option<String>,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Tree age in years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,

    /// Refreshed to "now" on every successful save; the sole recency sort key
    #[serde(with = "crate::entities::iso_millis")]
    pub last_updated: DateTime<Utc>,
}

impl TreeEvent {
    /// Create a new event with a fresh id within the given scope
    pub fn new(sector_id: EntityId, orchard_id: EntityId, block_id: EntityId) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Evt),
            sector_id,
            orchard_id,
            block_id,
            quantity: None,
            status: EventStatus::default(),
            tce: None,
            rootstock: None,
            notes: None,
            age: None,
            last_updated: Utc::now(),
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
