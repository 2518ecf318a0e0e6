//! Aggregation engine - per-block rollups derived from the event set
//!
//! Pure computation over an already-filtered event list plus the store's
//! master data; nothing here mutates or persists.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::identity::EntityId;
use crate::core::store::InventoryStore;
use crate::entities::{Block, TreeEvent};

/// One rollup per distinct block present among the input events
///
/// The scope ids come from the first-seen event in the block, not from the
/// block record itself, since master-data edits may lag behind event entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockGroup {
    pub block: Block,
    pub sector_id: EntityId,
    pub orchard_id: EntityId,
    /// Events sorted by `last_updated` descending (stable)
    pub events: Vec<TreeEvent>,
    /// Summed quantity; an absent quantity counts as 0
    pub total_quantity: f64,
    /// Max `last_updated` across the group
    #[serde(with = "crate::entities::iso_millis")]
    pub latest_update: DateTime<Utc>,
}

/// Group events by block
///
/// Events whose block no longer resolves are silently dropped (orphan
/// policy). Groups come back sorted by resolved sector name, then orchard
/// name, then block name, ascending, with unresolved names ordering as "".
pub fn group_by_block(events: &[TreeEvent], store: &InventoryStore) -> Vec<BlockGroup> {
    let mut groups: Vec<BlockGroup> = Vec::new();

    for event in events {
        let Some(block) = store.block(&event.block_id) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.block.id == event.block_id) {
            Some(group) => group.events.push(event.clone()),
            None => groups.push(BlockGroup {
                block: block.clone(),
                sector_id: event.sector_id.clone(),
                orchard_id: event.orchard_id.clone(),
                events: vec![event.clone()],
                total_quantity: 0.0,
                latest_update: event.last_updated,
            }),
        }
    }

    for group in &mut groups {
        group
            .events
            .sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        group.total_quantity = group
            .events
            .iter()
            .map(|e| e.quantity.unwrap_or(0.0))
            .sum();
        // events are non-empty by construction; after the descending sort the
        // first entry carries the max timestamp
        group.latest_update = group.events[0].last_updated;
    }

    groups.sort_by(|a, b| {
        let key_a = (
            store.sector_name(&a.sector_id),
            store.orchard_name(&a.orchard_id),
            a.block.name.as_str(),
        );
        let key_b = (
            store.sector_name(&b.sector_id),
            store.orchard_name(&b.orchard_id),
            b.block.name.as_str(),
        );
        key_a.cmp(&key_b)
    });

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EventStatus;
    use chrono::Duration;

    const WHO: &str = "test";

    struct Fixture {
        store: InventoryStore,
        b3: EntityId,
        q1: EntityId,
    }

    /// North → Tutaekuri → B3 and South → Clive → Q1
    fn fixture() -> Fixture {
        let mut store = InventoryStore::new();
        let north = store.create_sector("North", WHO);
        let south = store.create_sector("South", WHO);
        let tutaekuri = store.create_orchard(north.clone(), "Tutaekuri", WHO);
        let clive = store.create_orchard(south.clone(), "Clive", WHO);

        let b3 = Block::new(tutaekuri.clone(), "B3").with_variety("Jazz");
        let q1 = Block::new(clive.clone(), "Q1").with_variety("Envy");
        let (b3_id, q1_id) = (b3.id.clone(), q1.id.clone());
        store.save_block(b3, WHO);
        store.save_block(q1, WHO);

        Fixture {
            store,
            b3: b3_id,
            q1: q1_id,
        }
    }

    fn record(fx: &mut Fixture, block: &EntityId, qty: f64, status: EventStatus) -> TreeEvent {
        let block_rec = fx.store.block(block).unwrap().clone();
        let orchard = fx.store.orchard(&block_rec.orchard_id).unwrap().clone();
        let event = TreeEvent::new(orchard.sector_id.clone(), orchard.id.clone(), block.clone())
            .with_quantity(qty)
            .with_status(status);
        fx.store.upsert_event(event, WHO).unwrap()
    }

    #[test]
    fn test_single_group_totals_and_latest() {
        let mut fx = fixture();
        let b3 = fx.b3.clone();
        let first = record(&mut fx, &b3, 18.0, EventStatus::Kneecapped);
        let second = record(&mut fx, &b3, 19.0, EventStatus::Grafted);

        let groups = group_by_block(fx.store.events(), &fx.store);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.block.name, "B3");
        assert_eq!(group.total_quantity, 37.0);
        assert_eq!(group.latest_update, second.last_updated);
        // descending recency
        assert_eq!(group.events[0].id, second.id);
        assert_eq!(group.events[1].id, first.id);
    }

    #[test]
    fn test_missing_quantity_counts_as_zero() {
        let mut fx = fixture();
        let b3 = fx.b3.clone();
        record(&mut fx, &b3, 18.0, EventStatus::Grafted);
        let mut events = fx.store.events().to_vec();
        events[0].quantity = None;
        events.push({
            let mut e = events[0].clone();
            e.id = EntityId::new(crate::core::identity::EntityPrefix::Evt);
            e.quantity = Some(4.0);
            e.last_updated = e.last_updated + Duration::milliseconds(1);
            e
        });

        let groups = group_by_block(&events, &fx.store);
        assert_eq!(groups[0].total_quantity, 4.0);
    }

    #[test]
    fn test_orphans_are_dropped_silently() {
        let mut fx = fixture();
        let b3 = fx.b3.clone();
        record(&mut fx, &b3, 18.0, EventStatus::Grafted);
        let mut orphan = fx.store.events()[0].clone();
        orphan.id = EntityId::new(crate::core::identity::EntityPrefix::Evt);
        orphan.block_id = EntityId::parse("BLK-GONE").unwrap();
        orphan.quantity = Some(100.0);

        let mut events = fx.store.events().to_vec();
        events.push(orphan);

        let groups = group_by_block(&events, &fx.store);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_quantity, 18.0);
    }

    #[test]
    fn test_total_matches_resolvable_sum() {
        let mut fx = fixture();
        let (b3, q1) = (fx.b3.clone(), fx.q1.clone());
        record(&mut fx, &b3, 18.0, EventStatus::Kneecapped);
        record(&mut fx, &b3, 19.0, EventStatus::Grafted);
        record(&mut fx, &q1, 7.0, EventStatus::NewPlanting);

        let events = fx.store.events().to_vec();
        let groups = group_by_block(&events, &fx.store);
        let grouped_total: f64 = groups.iter().map(|g| g.total_quantity).sum();
        let resolvable_total: f64 = events
            .iter()
            .filter(|e| fx.store.block(&e.block_id).is_some())
            .map(|e| e.quantity.unwrap_or(0.0))
            .sum();
        assert_eq!(grouped_total, resolvable_total);
    }

    #[test]
    fn test_groups_sorted_by_sector_orchard_block_names() {
        let mut fx = fixture();
        // insert the South/Clive/Q1 event first; name order must win anyway
        let (b3, q1) = (fx.b3.clone(), fx.q1.clone());
        record(&mut fx, &q1, 7.0, EventStatus::NewPlanting);
        record(&mut fx, &b3, 18.0, EventStatus::Grafted);

        let groups = group_by_block(fx.store.events(), &fx.store);
        let names: Vec<&str> = groups.iter().map(|g| g.block.name.as_str()).collect();
        // "North" < "South"
        assert_eq!(names, ["B3", "Q1"]);
    }

    #[test]
    fn test_scope_ids_come_from_first_seen_event() {
        let mut fx = fixture();
        let b3 = fx.b3.clone();
        let saved = record(&mut fx, &b3, 18.0, EventStatus::Grafted);

        // simulate a lagging master edit by pointing the event at a scope the
        // block record does not know about
        let mut events = fx.store.events().to_vec();
        let stale_sector = EntityId::parse("SEC-STALE").unwrap();
        events[0].sector_id = stale_sector.clone();

        let groups = group_by_block(&events, &fx.store);
        assert_eq!(groups[0].sector_id, stale_sector);
        assert_eq!(groups[0].orchard_id, saved.orchard_id);
    }
}
