//! CSV import - tolerant parse of current exports and legacy flat files
//!
//! Rows are matched by header name, not position, so column order and extra
//! columns do not matter. Missing columns fall back to per-field defaults
//! and malformed rows are skipped rather than failing the whole file. The
//! legacy flat format (one row per tree, `healthScore` column, OK/Attention
//! style statuses) imports through the same path.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{clamp_health, EventStatus};

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV input has no header row")]
    MissingHeader,
    #[error("malformed CSV")]
    Malformed(#[from] csv::Error),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// One parsed import row, already normalized to defaults
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: EntityId,
    pub sector: String,
    pub orchard: String,
    pub block: String,
    pub status: EventStatus,
    pub quantity: f64,
    pub tce: Option<f64>,
    pub rootstock: Option<String>,
    pub notes: Option<String>,
    pub age: Option<f64>,
    pub last_updated: DateTime<Utc>,
    pub variety: String,
    pub structure_type: String,
    pub row_count: u32,
    pub hectares: f64,
    pub gps: Option<(f64, f64)>,
    pub block_health: Option<f64>,
}

struct Columns<'a> {
    index: HashMap<&'a str, usize>,
}

impl<'a> Columns<'a> {
    fn from_headers(headers: &'a csv::StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();
        Self { index }
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn get<'r>(&self, row: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        let i = *self.index.get(name)?;
        row.get(i).map(str::trim).filter(|v| !v.is_empty())
    }
}

fn parse_f64(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.parse().ok())
}

fn parse_status(raw: Option<&str>) -> EventStatus {
    let raw = raw.unwrap_or("OK");
    raw.parse()
        .unwrap_or_else(|_| EventStatus::from_legacy(raw))
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Parse CSV text into import records.
///
/// Empty input is an error; individual rows that fail to parse are dropped.
pub fn parse_csv(text: &str) -> Result<Vec<ImportRecord>, CsvError> {
    if text.trim().is_empty() {
        return Err(CsvError::MissingHeader);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    let columns = Columns::from_headers(&headers);

    // The legacy flat file has no quantity column: each row is one tree.
    let row_quantity_default = if columns.has("quantity") { 0.0 } else { 1.0 };

    let mut records = Vec::new();
    for result in reader.records() {
        let Ok(row) = result else { continue };

        let id = match columns.get(&row, "id") {
            Some(raw) => EntityId::parse(raw).unwrap_or_else(|_| EntityId::new(EntityPrefix::Evt)),
            None => EntityId::new(EntityPrefix::Evt),
        };

        let latitude = parse_f64(columns.get(&row, "latitude"));
        let longitude = parse_f64(columns.get(&row, "longitude"));
        let gps = latitude.zip(longitude);

        let block_health = parse_f64(columns.get(&row, "blockHealth"))
            .or_else(|| parse_f64(columns.get(&row, "healthScore")))
            .map(clamp_health);

        records.push(ImportRecord {
            id,
            sector: columns
                .get(&row, "sector")
                .unwrap_or("Unknown")
                .to_string(),
            orchard: columns
                .get(&row, "orchard")
                .unwrap_or("Unknown")
                .to_string(),
            block: columns
                .get(&row, "block")
                .unwrap_or("Unknown")
                .to_string(),
            status: parse_status(columns.get(&row, "status")),
            quantity: parse_f64(columns.get(&row, "quantity")).unwrap_or(row_quantity_default),
            tce: parse_f64(columns.get(&row, "tce")),
            rootstock: columns.get(&row, "rootstock").map(str::to_string),
            notes: columns.get(&row, "notes").map(str::to_string),
            age: parse_f64(columns.get(&row, "age")),
            last_updated: parse_timestamp(columns.get(&row, "lastUpdated")),
            variety: columns.get(&row, "variety").unwrap_or_default().to_string(),
            structure_type: columns
                .get(&row, "structureType")
                .unwrap_or_default()
                .to_string(),
            row_count: columns
                .get(&row, "rowCount")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            hectares: parse_f64(columns.get(&row, "hectares")).unwrap_or(0.0),
            gps,
            block_health,
        });
    }

    Ok(records)
}
