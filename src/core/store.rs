//! Entity store - source of truth for the orchard hierarchy
//!
//! Holds the four entity collections plus the audit trail, enforces
//! referential integrity on deletion, validates event saves, and writes one
//! audit entry for every successful mutation. All mutation is replace-by-id:
//! "save" and "create" share one code path.

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::codec::import::ImportRecord;
use crate::core::audit::AuditTrail;
use crate::core::identity::EntityId;
use crate::entities::{display_number, AuditEntry, AuditTarget, Block, Orchard, Sector, TreeEvent};

/// Sentinel shown in diff messages when a field had no prior value
const NO_VALUE: &str = "—";

/// Event save rejected before any state change
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("event is missing its sector reference")]
    MissingSector,
    #[error("event is missing its orchard reference")]
    MissingOrchard,
    #[error("event is missing its block reference")]
    MissingBlock,
    #[error("event quantity must be present and non-negative")]
    BadQuantity,
}

/// Deletion blocked by dependents; no collection was touched
#[derive(Debug, Error, PartialEq)]
pub enum IntegrityError {
    #[error("sector '{name}' still has {count} orchard(s)")]
    SectorHasOrchards { name: String, count: usize },
    #[error("orchard '{name}' still has {count} block(s)")]
    OrchardHasBlocks { name: String, count: usize },
    #[error("block '{name}' still has {count} event(s)")]
    BlockHasEvents { name: String, count: usize },
}

/// Counts reported by a CSV merge
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub replaced: usize,
}

/// In-memory entity store
///
/// Constructed per session; there are no module-level singletons. Persistence
/// lives behind the workspace, which writes whole collections back after each
/// mutation.
#[derive(Debug, Clone, Default)]
pub struct InventoryStore {
    sectors: Vec<Sector>,
    orchards: Vec<Orchard>,
    blocks: Vec<Block>,
    events: Vec<TreeEvent>,
    audit: AuditTrail,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from persisted collections
    pub fn from_collections(
        sectors: Vec<Sector>,
        orchards: Vec<Orchard>,
        blocks: Vec<Block>,
        events: Vec<TreeEvent>,
        audit_entries: Vec<AuditEntry>,
    ) -> Self {
        Self {
            sectors,
            orchards,
            blocks,
            events,
            audit: AuditTrail::from_entries(audit_entries),
        }
    }

    // =====================================================================
    // Read access
    // =====================================================================

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn orchards(&self) -> &[Orchard] {
        &self.orchards
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn events(&self) -> &[TreeEvent] {
        &self.events
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    pub fn sector(&self, id: &EntityId) -> Option<&Sector> {
        self.sectors.iter().find(|s| &s.id == id)
    }

    pub fn orchard(&self, id: &EntityId) -> Option<&Orchard> {
        self.orchards.iter().find(|o| &o.id == id)
    }

    pub fn block(&self, id: &EntityId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub fn event(&self, id: &EntityId) -> Option<&TreeEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Resolved sector name, or "" when the id no longer resolves
    pub fn sector_name(&self, id: &EntityId) -> &str {
        self.sector(id).map(|s| s.name.as_str()).unwrap_or("")
    }

    /// Resolved orchard name, or "" when the id no longer resolves
    pub fn orchard_name(&self, id: &EntityId) -> &str {
        self.orchard(id).map(|o| o.name.as_str()).unwrap_or("")
    }

    /// Resolved block name, or "" when the id no longer resolves
    pub fn block_name(&self, id: &EntityId) -> &str {
        self.block(id).map(|b| b.name.as_str()).unwrap_or("")
    }

    // =====================================================================
    // Sector mutations
    // =====================================================================

    pub fn create_sector(&mut self, name: impl Into<String>, who: &str) -> EntityId {
        let sector = Sector::new(name);
        let id = sector.id.clone();
        self.audit.record(AuditEntry::new(
            AuditTarget::Sector,
            id.clone(),
            who,
            format!("created sector {}", sector.name),
        ));
        self.sectors.push(sector);
        id
    }

    /// Replace-by-id, or insert when the id is new
    pub fn save_sector(&mut self, sector: Sector, who: &str) {
        match self.sectors.iter_mut().find(|s| s.id == sector.id) {
            Some(existing) => {
                if existing.name != sector.name {
                    self.audit.record(AuditEntry::new(
                        AuditTarget::Sector,
                        sector.id.clone(),
                        who,
                        format!("renamed sector {} → {}", existing.name, sector.name),
                    ));
                }
                *existing = sector;
            }
            None => {
                self.audit.record(AuditEntry::new(
                    AuditTarget::Sector,
                    sector.id.clone(),
                    who,
                    format!("created sector {}", sector.name),
                ));
                self.sectors.push(sector);
            }
        }
    }

    /// Hard delete; a miss is a no-op and reports `false`
    pub fn delete_sector(&mut self, id: &EntityId, who: &str) -> Result<bool, IntegrityError> {
        let dependents = self.orchards.iter().filter(|o| &o.sector_id == id).count();
        if dependents > 0 {
            return Err(IntegrityError::SectorHasOrchards {
                name: self.sector_name(id).to_string(),
                count: dependents,
            });
        }
        let Some(sector) = self.sector(id).cloned() else {
            return Ok(false);
        };
        self.sectors.retain(|s| &s.id != id);
        self.audit.record(AuditEntry::new(
            AuditTarget::Sector,
            id.clone(),
            who,
            format!("deleted sector {}", sector.name),
        ));
        Ok(true)
    }

    // =====================================================================
    // Orchard mutations
    // =====================================================================

    pub fn create_orchard(
        &mut self,
        sector_id: EntityId,
        name: impl Into<String>,
        who: &str,
    ) -> EntityId {
        let orchard = Orchard::new(sector_id, name);
        let id = orchard.id.clone();
        self.audit.record(AuditEntry::new(
            AuditTarget::Orchard,
            id.clone(),
            who,
            format!("created orchard {}", orchard.name),
        ));
        self.orchards.push(orchard);
        id
    }

    pub fn save_orchard(&mut self, orchard: Orchard, who: &str) {
        match self.orchards.iter_mut().find(|o| o.id == orchard.id) {
            Some(existing) => {
                if existing.name != orchard.name {
                    self.audit.record(AuditEntry::new(
                        AuditTarget::Orchard,
                        orchard.id.clone(),
                        who,
                        format!("renamed orchard {} → {}", existing.name, orchard.name),
                    ));
                } else if *existing != orchard {
                    self.audit.record(AuditEntry::new(
                        AuditTarget::Orchard,
                        orchard.id.clone(),
                        who,
                        format!("updated orchard {}", orchard.name),
                    ));
                }
                *existing = orchard;
            }
            None => {
                self.audit.record(AuditEntry::new(
                    AuditTarget::Orchard,
                    orchard.id.clone(),
                    who,
                    format!("created orchard {}", orchard.name),
                ));
                self.orchards.push(orchard);
            }
        }
    }

    pub fn delete_orchard(&mut self, id: &EntityId, who: &str) -> Result<bool, IntegrityError> {
        let dependents = self.blocks.iter().filter(|b| &b.orchard_id == id).count();
        if dependents > 0 {
            return Err(IntegrityError::OrchardHasBlocks {
                name: self.orchard_name(id).to_string(),
                count: dependents,
            });
        }
        let Some(orchard) = self.orchard(id).cloned() else {
            return Ok(false);
        };
        self.orchards.retain(|o| &o.id != id);
        self.audit.record(AuditEntry::new(
            AuditTarget::Orchard,
            id.clone(),
            who,
            format!("deleted orchard {}", orchard.name),
        ));
        Ok(true)
    }

    // =====================================================================
    // Block mutations
    // =====================================================================

    pub fn save_block(&mut self, block: Block, who: &str) {
        match self.blocks.iter_mut().find(|b| b.id == block.id) {
            Some(existing) => {
                if *existing != block {
                    self.audit.record(AuditEntry::new(
                        AuditTarget::Block,
                        block.id.clone(),
                        who,
                        format!("updated block {}", block.name),
                    ));
                }
                *existing = block;
            }
            None => {
                self.audit.record(AuditEntry::new(
                    AuditTarget::Block,
                    block.id.clone(),
                    who,
                    format!("created block {}", block.name),
                ));
                self.blocks.push(block);
            }
        }
    }

    pub fn delete_block(&mut self, id: &EntityId, who: &str) -> Result<bool, IntegrityError> {
        let dependents = self.events.iter().filter(|e| &e.block_id == id).count();
        if dependents > 0 {
            return Err(IntegrityError::BlockHasEvents {
                name: self.block_name(id).to_string(),
                count: dependents,
            });
        }
        let Some(block) = self.block(id).cloned() else {
            return Ok(false);
        };
        self.blocks.retain(|b| &b.id != id);
        self.audit.record(AuditEntry::new(
            AuditTarget::Block,
            id.clone(),
            who,
            format!("deleted block {}", block.name),
        ));
        Ok(true)
    }

    // =====================================================================
    // Event mutations
    // =====================================================================

    /// Save an event: validate, refresh `last_updated`, diff-audit, replace-by-id
    ///
    /// Validation happens before the timestamp refresh and before any audit
    /// entry; a rejected save leaves everything untouched. The refreshed
    /// timestamp is strictly greater than the prior record's even if the wall
    /// clock stalls.
    pub fn upsert_event(
        &mut self,
        mut event: TreeEvent,
        who: &str,
    ) -> Result<TreeEvent, ValidationError> {
        if event.sector_id.is_empty() {
            return Err(ValidationError::MissingSector);
        }
        if event.orchard_id.is_empty() {
            return Err(ValidationError::MissingOrchard);
        }
        if event.block_id.is_empty() {
            return Err(ValidationError::MissingBlock);
        }
        match event.quantity {
            Some(q) if q >= 0.0 => {}
            _ => return Err(ValidationError::BadQuantity),
        }

        let prior = self.event(&event.id).cloned();

        let mut now = Utc::now();
        if let Some(ref p) = prior {
            if now <= p.last_updated {
                now = p.last_updated + Duration::milliseconds(1);
            }
        }
        event.last_updated = now;

        self.log_event_diff(prior.as_ref(), &event, who);
        self.replace_event(event.clone());
        Ok(event)
    }

    pub fn delete_event(&mut self, id: &EntityId, who: &str) -> bool {
        if self.event(id).is_none() {
            return false;
        }
        self.events.retain(|e| &e.id != id);
        self.audit.record(AuditEntry::new(
            AuditTarget::Tree,
            id.clone(),
            who,
            "deleted tree event".to_string(),
        ));
        true
    }

    /// Merge CSV import records: re-resolve scope by name (find-or-create so
    /// the merge never mints orphans), then replace-by-id or insert each
    /// event, preserving the file's timestamps. Re-importing an unchanged
    /// export is audit-quiet.
    pub fn merge_imported(&mut self, records: Vec<ImportRecord>, who: &str) -> MergeStats {
        let mut stats = MergeStats::default();
        for record in records {
            let sector_id = self.find_or_create_sector(&record.sector, who);
            let orchard_id = self.find_or_create_orchard(&sector_id, &record.orchard, who);
            let block_id = self.find_or_create_block(&orchard_id, &record, who);

            let event = TreeEvent {
                id: record.id,
                sector_id,
                orchard_id,
                block_id,
                quantity: Some(record.quantity),
                status: record.status,
                tce: record.tce,
                rootstock: record.rootstock,
                notes: record.notes,
                age: record.age,
                last_updated: record.last_updated,
            };

            let prior = self.event(&event.id).cloned();
            if prior.is_some() {
                stats.replaced += 1;
            } else {
                stats.inserted += 1;
            }
            self.log_event_diff(prior.as_ref(), &event, who);
            self.replace_event(event);
        }
        stats
    }

    fn find_or_create_sector(&mut self, name: &str, who: &str) -> EntityId {
        if let Some(sector) = self.sectors.iter().find(|s| s.name == name) {
            return sector.id.clone();
        }
        self.create_sector(name, who)
    }

    fn find_or_create_orchard(&mut self, sector_id: &EntityId, name: &str, who: &str) -> EntityId {
        if let Some(orchard) = self
            .orchards
            .iter()
            .find(|o| &o.sector_id == sector_id && o.name == name)
        {
            return orchard.id.clone();
        }
        self.create_orchard(sector_id.clone(), name, who)
    }

    fn find_or_create_block(
        &mut self,
        orchard_id: &EntityId,
        record: &ImportRecord,
        who: &str,
    ) -> EntityId {
        if let Some(block) = self
            .blocks
            .iter()
            .find(|b| &b.orchard_id == orchard_id && b.name == record.block)
        {
            return block.id.clone();
        }
        let block = Block::new(orchard_id.clone(), record.block.clone())
            .with_variety(record.variety.clone())
            .with_structure(record.structure_type.clone())
            .with_layout(record.row_count, record.hectares)
            .with_gps(record.gps)
            .with_health(record.block_health);
        let id = block.id.clone();
        self.save_block(block, who);
        id
    }

    fn replace_event(&mut self, event: TreeEvent) {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => self.events.push(event),
        }
    }

    /// Field-level diff across the audited event fields, in fixed order.
    /// Appends exactly one entry when anything differs; nothing on a benign
    /// re-save.
    fn log_event_diff(&mut self, prior: Option<&TreeEvent>, next: &TreeEvent, who: &str) {
        fn opt_num(v: Option<f64>) -> String {
            v.map(display_number).unwrap_or_else(|| NO_VALUE.to_string())
        }
        fn opt_str(v: Option<&String>) -> String {
            v.cloned().unwrap_or_else(|| NO_VALUE.to_string())
        }

        let fields: [(&str, String, String); 9] = [
            (
                "sectorId",
                prior
                    .map(|p| p.sector_id.to_string())
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                next.sector_id.to_string(),
            ),
            (
                "orchardId",
                prior
                    .map(|p| p.orchard_id.to_string())
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                next.orchard_id.to_string(),
            ),
            (
                "blockId",
                prior
                    .map(|p| p.block_id.to_string())
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                next.block_id.to_string(),
            ),
            (
                "quantity",
                prior
                    .map(|p| opt_num(p.quantity))
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                opt_num(next.quantity),
            ),
            (
                "status",
                prior
                    .map(|p| p.status.to_string())
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                next.status.to_string(),
            ),
            (
                "tce",
                prior
                    .map(|p| opt_num(p.tce))
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                opt_num(next.tce),
            ),
            (
                "notes",
                prior
                    .map(|p| opt_str(p.notes.as_ref()))
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                opt_str(next.notes.as_ref()),
            ),
            (
                "rootstock",
                prior
                    .map(|p| opt_str(p.rootstock.as_ref()))
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                opt_str(next.rootstock.as_ref()),
            ),
            (
                "age",
                prior
                    .map(|p| opt_num(p.age))
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                opt_num(next.age),
            ),
        ];

        let changes: Vec<String> = fields
            .iter()
            .filter(|(_, before, after)| before != after)
            .map(|(field, before, after)| format!("{}: {} → {}", field, before, after))
            .collect();

        if changes.is_empty() {
            return;
        }
        self.audit.record(AuditEntry::new(
            AuditTarget::Tree,
            next.id.clone(),
            who,
            changes.join(" | "),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EventStatus;

    const WHO: &str = "test";

    /// Sector "North" → Orchard "Tutaekuri" → Block "B3", returning the ids
    fn seeded() -> (InventoryStore, EntityId, EntityId, EntityId) {
        let mut store = InventoryStore::new();
        let sector = store.create_sector("North", WHO);
        let orchard = store.create_orchard(sector.clone(), "Tutaekuri", WHO);
        let block = Block::new(orchard.clone(), "B3").with_variety("Jazz");
        let block_id = block.id.clone();
        store.save_block(block, WHO);
        (store, sector, orchard, block_id)
    }

    fn event_in(sector: &EntityId, orchard: &EntityId, block: &EntityId, qty: f64) -> TreeEvent {
        TreeEvent::new(sector.clone(), orchard.clone(), block.clone()).with_quantity(qty)
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let (mut store, s, o, b) = seeded();
        let event = event_in(&s, &o, &b, 18.0);
        let saved = store.upsert_event(event.clone(), WHO).unwrap();
        assert_eq!(store.events().len(), 1);

        let updated = saved.clone().with_quantity(19.0);
        store.upsert_event(updated, WHO).unwrap();
        assert_eq!(store.events().len(), 1);
        assert_eq!(store.events()[0].quantity, Some(19.0));
    }

    #[test]
    fn test_validation_order_and_no_state_change() {
        let (mut store, s, o, b) = seeded();

        let mut event = event_in(&s, &o, &b, 18.0);
        event.sector_id = EntityId::default();
        event.orchard_id = EntityId::default();
        assert_eq!(
            store.upsert_event(event, WHO),
            Err(ValidationError::MissingSector)
        );

        let mut event = event_in(&s, &o, &b, 18.0);
        event.orchard_id = EntityId::default();
        assert_eq!(
            store.upsert_event(event, WHO),
            Err(ValidationError::MissingOrchard)
        );

        let mut event = event_in(&s, &o, &b, 18.0);
        event.block_id = EntityId::default();
        assert_eq!(
            store.upsert_event(event, WHO),
            Err(ValidationError::MissingBlock)
        );

        let mut event = event_in(&s, &o, &b, 0.0);
        event.quantity = None;
        assert_eq!(
            store.upsert_event(event, WHO),
            Err(ValidationError::BadQuantity)
        );
        assert_eq!(
            store.upsert_event(event_in(&s, &o, &b, -1.0), WHO),
            Err(ValidationError::BadQuantity)
        );

        // nothing landed, and no audit entry beyond the seeding ones
        assert!(store.events().is_empty());
        let audit_before = store.audit().len();
        let _ = store.upsert_event(event_in(&s, &o, &b, -1.0), WHO);
        assert_eq!(store.audit().len(), audit_before);
    }

    #[test]
    fn test_last_updated_is_strictly_monotonic() {
        let (mut store, s, o, b) = seeded();
        let saved = store.upsert_event(event_in(&s, &o, &b, 18.0), WHO).unwrap();
        let first = saved.last_updated;
        let again = store.upsert_event(saved, WHO).unwrap();
        assert!(again.last_updated > first);
    }

    #[test]
    fn test_guarded_deletes_leave_state_untouched() {
        let (mut store, s, o, b) = seeded();
        store.upsert_event(event_in(&s, &o, &b, 18.0), WHO).unwrap();
        let snapshot = store.clone();

        assert!(matches!(
            store.delete_block(&b, WHO),
            Err(IntegrityError::BlockHasEvents { .. })
        ));
        assert!(matches!(
            store.delete_orchard(&o, WHO),
            Err(IntegrityError::OrchardHasBlocks { .. })
        ));
        assert!(matches!(
            store.delete_sector(&s, WHO),
            Err(IntegrityError::SectorHasOrchards { .. })
        ));

        assert_eq!(store.sectors(), snapshot.sectors());
        assert_eq!(store.orchards(), snapshot.orchards());
        assert_eq!(store.blocks(), snapshot.blocks());
        assert_eq!(store.events(), snapshot.events());
        assert_eq!(store.audit().len(), snapshot.audit().len());
    }

    #[test]
    fn test_delete_succeeds_bottom_up() {
        let (mut store, s, o, b) = seeded();
        let saved = store.upsert_event(event_in(&s, &o, &b, 18.0), WHO).unwrap();

        assert!(store.delete_block(&b, WHO).is_err());
        assert!(store.delete_event(&saved.id, WHO));
        assert!(store.delete_block(&b, WHO).unwrap());
        assert!(store.delete_orchard(&o, WHO).unwrap());
        assert!(store.delete_sector(&s, WHO).unwrap());
        assert!(store.sectors().is_empty());
    }

    #[test]
    fn test_delete_missing_id_is_a_noop() {
        let (mut store, _, _, _) = seeded();
        let ghost = EntityId::parse("SEC-GHOST").unwrap();
        assert_eq!(store.delete_sector(&ghost, WHO), Ok(false));
        assert!(!store.delete_event(&ghost, WHO));
    }

    #[test]
    fn test_insert_audits_with_no_value_sentinel() {
        let (mut store, s, o, b) = seeded();
        store
            .upsert_event(
                event_in(&s, &o, &b, 18.0).with_status(EventStatus::Kneecapped),
                WHO,
            )
            .unwrap();

        let entry = &store.audit().entries()[0];
        assert_eq!(entry.entity, AuditTarget::Tree);
        assert!(entry.message.contains("quantity: — → 18"));
        assert!(entry.message.contains("status: — → Kneecapped"));
    }

    #[test]
    fn test_change_audits_one_pipe_joined_entry() {
        let (mut store, s, o, b) = seeded();
        let saved = store.upsert_event(event_in(&s, &o, &b, 18.0), WHO).unwrap();
        let audit_before = store.audit().len();

        let changed = saved
            .with_quantity(19.0)
            .with_status(EventStatus::Grafted)
            .with_notes("graft take looks good");
        store.upsert_event(changed, WHO).unwrap();

        assert_eq!(store.audit().len(), audit_before + 1);
        let message = &store.audit().entries()[0].message;
        assert!(message.contains("quantity: 18 → 19"));
        assert!(message.contains("status: New Planting → Grafted"));
        assert!(message.contains("notes: — → graft take looks good"));
        assert_eq!(message.matches(" | ").count(), 2);
    }

    #[test]
    fn test_benign_resave_logs_nothing() {
        let (mut store, s, o, b) = seeded();
        let saved = store.upsert_event(event_in(&s, &o, &b, 18.0), WHO).unwrap();
        let audit_before = store.audit().len();
        store.upsert_event(saved, WHO).unwrap();
        assert_eq!(store.audit().len(), audit_before);
    }

    #[test]
    fn test_orphan_events_survive_master_deletes() {
        let (mut store, s, o, b) = seeded();
        let saved = store.upsert_event(event_in(&s, &o, &b, 18.0), WHO).unwrap();

        // removing just the event's block via a fresh store models a lagging
        // master-data load; the event is kept, not auto-deleted
        let orphaned = InventoryStore::from_collections(
            store.sectors().to_vec(),
            store.orchards().to_vec(),
            Vec::new(),
            store.events().to_vec(),
            Vec::new(),
        );
        assert!(orphaned.event(&saved.id).is_some());
        assert!(orphaned.block(&b).is_none());
    }
}
