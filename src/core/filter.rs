//! Filter/search pipeline - scope, status and free-text narrowing
//!
//! The scope selection carries the cascading reset rule as pure value
//! operations: selecting a sector clears the orchard and block selections,
//! selecting an orchard clears the block selection. A stale narrow child
//! selection must never survive a broadened parent.

use crate::core::identity::EntityId;
use crate::core::store::InventoryStore;
use crate::entities::{display_number, EventStatus, TreeEvent};

/// Hierarchical scope selection; `None` means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    sector: Option<EntityId>,
    orchard: Option<EntityId>,
    block: Option<EntityId>,
}

impl Scope {
    /// Everything selected
    pub fn all() -> Self {
        Self::default()
    }

    /// Change the sector selection; resets orchard and block to "all"
    pub fn select_sector(mut self, sector: Option<EntityId>) -> Self {
        self.sector = sector;
        self.orchard = None;
        self.block = None;
        self
    }

    /// Change the orchard selection; resets block to "all"
    pub fn select_orchard(mut self, orchard: Option<EntityId>) -> Self {
        self.orchard = orchard;
        self.block = None;
        self
    }

    /// Change the block selection
    pub fn select_block(mut self, block: Option<EntityId>) -> Self {
        self.block = block;
        self
    }

    pub fn sector(&self) -> Option<&EntityId> {
        self.sector.as_ref()
    }

    pub fn orchard(&self) -> Option<&EntityId> {
        self.orchard.as_ref()
    }

    pub fn block(&self) -> Option<&EntityId> {
        self.block.as_ref()
    }

    fn matches(&self, event: &TreeEvent) -> bool {
        if let Some(ref sector) = self.sector {
            if &event.sector_id != sector {
                return false;
            }
        }
        if let Some(ref orchard) = self.orchard {
            if &event.orchard_id != orchard {
                return false;
            }
        }
        if let Some(ref block) = self.block {
            if &event.block_id != block {
                return false;
            }
        }
        true
    }
}

/// The full event filter: scope, status and free text, AND-combined
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub scope: Scope,
    pub status: Option<EventStatus>,
    pub text: String,
}

impl EventQuery {
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_status(mut self, status: Option<EventStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Stage order: scope, status, text. Any stage can short-circuit.
    pub fn matches(&self, event: &TreeEvent, store: &InventoryStore) -> bool {
        if !self.scope.matches(event) {
            return false;
        }
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }
        let query = self.text.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        search_blob(event, store).contains(&query)
    }

    /// Apply the filter without mutating anything
    pub fn apply(&self, events: &[TreeEvent], store: &InventoryStore) -> Vec<TreeEvent> {
        events
            .iter()
            .filter(|e| self.matches(e, store))
            .cloned()
            .collect()
    }
}

/// The per-event searchable string: space-joined, lower-cased resolved names
/// and fields, in fixed order
fn search_blob(event: &TreeEvent, store: &InventoryStore) -> String {
    let block = store.block(&event.block_id);
    let parts = [
        store.sector_name(&event.sector_id).to_string(),
        store.orchard_name(&event.orchard_id).to_string(),
        store.block_name(&event.block_id).to_string(),
        block.map(|b| b.variety.clone()).unwrap_or_default(),
        block.map(|b| b.structure_type.clone()).unwrap_or_default(),
        event.status.to_string(),
        event.quantity.map(display_number).unwrap_or_default(),
        event.notes.clone().unwrap_or_default(),
    ];
    parts.join(" ").to_lowercase()
}
