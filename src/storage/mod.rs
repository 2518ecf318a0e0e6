//! Storage providers - the read/write contract behind the entity store
//!
//! Two interchangeable implementations: local JSON collection files and a
//! relational SQLite database. Both speak `serde_json::Value` rows in the
//! entities' camelCase wire shape, so the workspace can deserialize either
//! source identically. A save always rewrites the whole collection as one
//! unit; there is no partial persistence.

pub mod json;
pub mod sqlite;

pub use json::JsonProvider;
pub use sqlite::SqliteProvider;

use serde_json::Value;
use thiserror::Error;

/// The five persisted entity sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Sectors,
    Orchards,
    Blocks,
    TreeEvents,
    AuditLog,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Sectors,
        Collection::Orchards,
        Collection::Blocks,
        Collection::TreeEvents,
        Collection::AuditLog,
    ];

    /// Storage key: file stem for the JSON provider, table name for SQLite
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Sectors => "sectors",
            Collection::Orchards => "orchards",
            Collection::Blocks => "blocks",
            Collection::TreeEvents => "tree_events",
            Collection::AuditLog => "audit_log",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable for {collection}: {reason}")]
    Unavailable {
        collection: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// The storage contract consumed by the workspace
///
/// `load` returns rows in the entities' wire shape; a missing collection is
/// an empty vec, not an error. `save` replaces the whole collection.
pub trait StorageProvider {
    fn load(&self, collection: Collection) -> Result<Vec<Value>, StorageError>;
    fn save(&mut self, collection: Collection, rows: &[Value]) -> Result<(), StorageError>;
}
