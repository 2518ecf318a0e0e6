//! SQLite storage provider
//!
//! One table per collection (`sectors`, `orchards`, `blocks`, `tree_events`,
//! `audit_log`) with snake_case columns mapped to the entities' camelCase
//! wire fields; SQL `NULL` becomes an absent optional field. A save is a
//! transactional delete-and-reinsert of the whole table. The audit table
//! carries a `position` column so the most-recent-first trail order survives
//! the round trip.

use std::path::Path;

use rusqlite::{params, Connection};
use serde_json::{json, Map, Value};

use super::{Collection, StorageError, StorageProvider};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sectors (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS orchards (
    id          TEXT PRIMARY KEY,
    sector_id   TEXT NOT NULL,
    name        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS blocks (
    id              TEXT PRIMARY KEY,
    orchard_id      TEXT NOT NULL,
    name            TEXT NOT NULL,
    variety         TEXT NOT NULL DEFAULT '',
    structure_type  TEXT NOT NULL DEFAULT '',
    row_count       INTEGER NOT NULL DEFAULT 0,
    hectares        REAL NOT NULL DEFAULT 0,
    latitude        REAL,
    longitude       REAL,
    health          REAL
);
CREATE TABLE IF NOT EXISTS tree_events (
    id            TEXT PRIMARY KEY,
    sector_id     TEXT NOT NULL,
    orchard_id    TEXT NOT NULL,
    block_id      TEXT NOT NULL,
    quantity      REAL,
    status        TEXT NOT NULL,
    tce           REAL,
    rootstock     TEXT,
    notes         TEXT,
    age           REAL,
    last_updated  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS audit_log (
    position    INTEGER NOT NULL,
    id          TEXT PRIMARY KEY,
    at          TEXT NOT NULL,
    who         TEXT NOT NULL,
    entity      TEXT NOT NULL,
    entity_id   TEXT NOT NULL,
    message     TEXT NOT NULL
);
";

pub struct SqliteProvider {
    conn: Connection,
}

impl SqliteProvider {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

// Field accessors for wire-shaped rows. Optional fields pass through as
// SQL NULL and come back as absent/null JSON.
fn text(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_text(row: &Value, key: &str) -> Option<String> {
    row.get(key).and_then(Value::as_str).map(String::from)
}

fn num(row: &Value, key: &str) -> f64 {
    row.get(key).and_then(Value::as_f64).unwrap_or_default()
}

fn opt_num(row: &Value, key: &str) -> Option<f64> {
    row.get(key).and_then(Value::as_f64)
}

fn int(row: &Value, key: &str) -> i64 {
    row.get(key).and_then(Value::as_i64).unwrap_or_default()
}

/// Drop `null` members so optional fields come back absent, matching the
/// JSON provider's output
fn object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = Map::new();
    for (key, value) in pairs {
        if !value.is_null() {
            map.insert(key.to_string(), value);
        }
    }
    Value::Object(map)
}

impl StorageProvider for SqliteProvider {
    fn load(&self, collection: Collection) -> Result<Vec<Value>, StorageError> {
        let mut rows = Vec::new();
        match collection {
            Collection::Sectors => {
                let mut stmt = self.conn.prepare("SELECT id, name FROM sectors")?;
                let mapped = stmt.query_map([], |row| {
                    Ok(json!({
                        "id": row.get::<_, String>(0)?,
                        "name": row.get::<_, String>(1)?,
                    }))
                })?;
                for row in mapped {
                    rows.push(row?);
                }
            }
            Collection::Orchards => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT id, sector_id, name FROM orchards")?;
                let mapped = stmt.query_map([], |row| {
                    Ok(json!({
                        "id": row.get::<_, String>(0)?,
                        "sectorId": row.get::<_, String>(1)?,
                        "name": row.get::<_, String>(2)?,
                    }))
                })?;
                for row in mapped {
                    rows.push(row?);
                }
            }
            Collection::Blocks => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, orchard_id, name, variety, structure_type, row_count,
                            hectares, latitude, longitude, health
                     FROM blocks",
                )?;
                let mapped = stmt.query_map([], |row| {
                    Ok(object(vec![
                        ("id", json!(row.get::<_, String>(0)?)),
                        ("orchardId", json!(row.get::<_, String>(1)?)),
                        ("name", json!(row.get::<_, String>(2)?)),
                        ("variety", json!(row.get::<_, String>(3)?)),
                        ("structureType", json!(row.get::<_, String>(4)?)),
                        ("rowCount", json!(row.get::<_, i64>(5)?)),
                        ("hectares", json!(row.get::<_, f64>(6)?)),
                        ("latitude", json!(row.get::<_, Option<f64>>(7)?)),
                        ("longitude", json!(row.get::<_, Option<f64>>(8)?)),
                        ("health", json!(row.get::<_, Option<f64>>(9)?)),
                    ]))
                })?;
                for row in mapped {
                    rows.push(row?);
                }
            }
            Collection::TreeEvents => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, sector_id, orchard_id, block_id, quantity, status,
                            tce, rootstock, notes, age, last_updated
                     FROM tree_events",
                )?;
                let mapped = stmt.query_map([], |row| {
                    Ok(object(vec![
                        ("id", json!(row.get::<_, String>(0)?)),
                        ("sectorId", json!(row.get::<_, String>(1)?)),
                        ("orchardId", json!(row.get::<_, String>(2)?)),
                        ("blockId", json!(row.get::<_, String>(3)?)),
                        ("quantity", json!(row.get::<_, Option<f64>>(4)?)),
                        ("status", json!(row.get::<_, String>(5)?)),
                        ("tce", json!(row.get::<_, Option<f64>>(6)?)),
                        ("rootstock", json!(row.get::<_, Option<String>>(7)?)),
                        ("notes", json!(row.get::<_, Option<String>>(8)?)),
                        ("age", json!(row.get::<_, Option<f64>>(9)?)),
                        ("lastUpdated", json!(row.get::<_, String>(10)?)),
                    ]))
                })?;
                for row in mapped {
                    rows.push(row?);
                }
            }
            Collection::AuditLog => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, at, who, entity, entity_id, message
                     FROM audit_log ORDER BY position ASC",
                )?;
                let mapped = stmt.query_map([], |row| {
                    Ok(json!({
                        "id": row.get::<_, String>(0)?,
                        "at": row.get::<_, String>(1)?,
                        "who": row.get::<_, String>(2)?,
                        "entity": row.get::<_, String>(3)?,
                        "entityId": row.get::<_, String>(4)?,
                        "message": row.get::<_, String>(5)?,
                    }))
                })?;
                for row in mapped {
                    rows.push(row?);
                }
            }
        }
        Ok(rows)
    }

    fn save(&mut self, collection: Collection, rows: &[Value]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(&format!("DELETE FROM {}", collection.key()), [])?;
        match collection {
            Collection::Sectors => {
                for row in rows {
                    tx.execute(
                        "INSERT INTO sectors (id, name) VALUES (?1, ?2)",
                        params![text(row, "id"), text(row, "name")],
                    )?;
                }
            }
            Collection::Orchards => {
                for row in rows {
                    tx.execute(
                        "INSERT INTO orchards (id, sector_id, name) VALUES (?1, ?2, ?3)",
                        params![text(row, "id"), text(row, "sectorId"), text(row, "name")],
                    )?;
                }
            }
            Collection::Blocks => {
                for row in rows {
                    tx.execute(
                        "INSERT INTO blocks (id, orchard_id, name, variety, structure_type,
                                             row_count, hectares, latitude, longitude, health)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                        params![
                            text(row, "id"),
                            text(row, "orchardId"),
                            text(row, "name"),
                            text(row, "variety"),
                            text(row, "structureType"),
                            int(row, "rowCount"),
                            num(row, "hectares"),
                            opt_num(row, "latitude"),
                            opt_num(row, "longitude"),
                            opt_num(row, "health"),
                        ],
                    )?;
                }
            }
            Collection::TreeEvents => {
                for row in rows {
                    tx.execute(
                        "INSERT INTO tree_events (id, sector_id, orchard_id, block_id, quantity,
                                                  status, tce, rootstock, notes, age, last_updated)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                        params![
                            text(row, "id"),
                            text(row, "sectorId"),
                            text(row, "orchardId"),
                            text(row, "blockId"),
                            opt_num(row, "quantity"),
                            text(row, "status"),
                            opt_num(row, "tce"),
                            opt_text(row, "rootstock"),
                            opt_text(row, "notes"),
                            opt_num(row, "age"),
                            text(row, "lastUpdated"),
                        ],
                    )?;
                }
            }
            Collection::AuditLog => {
                for (position, row) in rows.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO audit_log (position, id, at, who, entity, entity_id, message)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            position as i64,
                            text(row, "id"),
                            text(row, "at"),
                            text(row, "who"),
                            text(row, "entity"),
                            text(row, "entityId"),
                            text(row, "message"),
                        ],
                    )?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
