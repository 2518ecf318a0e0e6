//! CSV export - one denormalized row per event
//!
//! Sector/orchard/block columns carry resolved *names*, not ids; that is
//! lossy by design, and re-import re-resolves by name. The event id column
//! drives replace-by-id on re-import. Fields are quoted/escaped per RFC 4180
//! by the `csv` crate; newlines inside notes are flattened to spaces before
//! emission.

use chrono::{DateTime, Utc};

use crate::core::store::InventoryStore;
use crate::entities::{display_number, iso_millis, TreeEvent};

use super::import::CsvError;

/// Fixed column order of the export format
pub const EXPORT_HEADER: [&str; 16] = [
    "id",
    "sector",
    "orchard",
    "block",
    "status",
    "quantity",
    "tce",
    "notes",
    "lastUpdated",
    "variety",
    "structureType",
    "rowCount",
    "hectares",
    "latitude",
    "longitude",
    "blockHealth",
];

fn opt_num(value: Option<f64>) -> String {
    value.map(display_number).unwrap_or_default()
}

/// Serialize the given events (the filtered subset or the whole store)
pub fn to_csv(events: &[TreeEvent], store: &InventoryStore) -> Result<String, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for event in events {
        let block = store.block(&event.block_id);
        let notes = event
            .notes
            .as_deref()
            .unwrap_or_default()
            .replace(['\n', '\r'], " ");

        writer.write_record([
            event.id.as_str(),
            store.sector_name(&event.sector_id),
            store.orchard_name(&event.orchard_id),
            store.block_name(&event.block_id),
            event.status.as_str(),
            &opt_num(event.quantity),
            &opt_num(event.tce),
            &notes,
            &iso_millis::to_string(&event.last_updated),
            block.map(|b| b.variety.as_str()).unwrap_or_default(),
            block.map(|b| b.structure_type.as_str()).unwrap_or_default(),
            &block
                .map(|b| b.row_count.to_string())
                .unwrap_or_default(),
            &block
                .map(|b| display_number(b.hectares))
                .unwrap_or_default(),
            &opt_num(block.and_then(|b| b.latitude)),
            &opt_num(block.and_then(|b| b.longitude)),
            &opt_num(block.and_then(|b| b.health)),
        ])?;
    }

    let buf = writer
        .into_inner()
        .map_err(|e| CsvError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Export filename stamped with the export timestamp
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("orchard360_export_{}.csv", now.format("%Y-%m-%dT%H:%M:%S"))
}
