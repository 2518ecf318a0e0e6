//! Workspace - the per-invocation session owning store and provider
//!
//! Opening a workspace loads every collection from the configured provider.
//! A failed collection load degrades to an empty collection with a surfaced
//! warning; a row that fails to parse is skipped, also with a warning, since
//! the next persist rewrites the collection from what was loaded. Partial
//! data is expected (orphan policy), never corruption.
//! After each mutation the caller persists the affected collections back as
//! whole units. The event collection and the audit log are separate
//! persistence operations, not one transaction.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::config::{Config, StorageBackend};
use crate::core::project::Project;
use crate::core::store::InventoryStore;
use crate::entities::{AuditEntry, Block, Orchard, Sector, TreeEvent};
use crate::storage::{Collection, JsonProvider, SqliteProvider, StorageError, StorageProvider};

pub struct Workspace {
    project: Project,
    config: Config,
    provider: Box<dyn StorageProvider>,
    pub store: InventoryStore,
    warnings: Vec<String>,
}

impl Workspace {
    /// Load all collections; individual failures degrade to empty with a warning
    pub fn open(project: Project) -> Result<Self, StorageError> {
        let config = Config::load(&project);
        let provider = make_provider(&project, config.storage)?;
        let mut warnings = Vec::new();

        let sectors: Vec<Sector> = load_collection(&*provider, Collection::Sectors, &mut warnings);
        let orchards: Vec<Orchard> =
            load_collection(&*provider, Collection::Orchards, &mut warnings);
        let blocks: Vec<Block> = load_collection(&*provider, Collection::Blocks, &mut warnings);
        let events: Vec<TreeEvent> =
            load_collection(&*provider, Collection::TreeEvents, &mut warnings);
        let audit: Vec<AuditEntry> =
            load_collection(&*provider, Collection::AuditLog, &mut warnings);

        Ok(Self {
            project,
            config,
            provider,
            store: InventoryStore::from_collections(sectors, orchards, blocks, events, audit),
            warnings,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn author(&self) -> &str {
        &self.config.author
    }

    /// Load warnings accumulated while opening (degraded collections)
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Write the named collections back, each as one unit
    pub fn persist(&mut self, collections: &[Collection]) -> Result<(), StorageError> {
        for &collection in collections {
            let rows = self.rows_for(collection)?;
            self.provider.save(collection, &rows)?;
        }
        Ok(())
    }

    /// Write every collection back
    pub fn persist_all(&mut self) -> Result<(), StorageError> {
        self.persist(&Collection::ALL)
    }

    fn rows_for(&self, collection: Collection) -> Result<Vec<Value>, StorageError> {
        let rows = match collection {
            Collection::Sectors => to_rows(self.store.sectors())?,
            Collection::Orchards => to_rows(self.store.orchards())?,
            Collection::Blocks => to_rows(self.store.blocks())?,
            Collection::TreeEvents => to_rows(self.store.events())?,
            Collection::AuditLog => to_rows(self.store.audit().entries())?,
        };
        Ok(rows)
    }
}

fn make_provider(
    project: &Project,
    backend: StorageBackend,
) -> Result<Box<dyn StorageProvider>, StorageError> {
    match backend {
        StorageBackend::Json => Ok(Box::new(JsonProvider::new(project.data_dir()))),
        StorageBackend::Sqlite => Ok(Box::new(SqliteProvider::open(&project.db_path())?)),
    }
}

fn load_collection<T: DeserializeOwned>(
    provider: &dyn StorageProvider,
    collection: Collection,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    match provider.load(collection) {
        Ok(rows) => {
            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                match serde_json::from_value(row) {
                    Ok(item) => items.push(item),
                    Err(e) => warnings.push(format!(
                        "skipped one {} row that could not be parsed: {} \
                         (it will not survive the next write)",
                        collection, e
                    )),
                }
            }
            items
        }
        Err(e) => {
            warnings.push(format!(
                "failed to load {}: {} (continuing with an empty collection)",
                collection, e
            ));
            Vec::new()
        }
    }
}

fn to_rows<T: serde::Serialize>(items: &[T]) -> Result<Vec<Value>, StorageError> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(StorageError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityId;
    use tempfile::tempdir;

    const WHO: &str = "test";

    #[test]
    fn test_mutations_survive_reopen() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        {
            let mut ws = Workspace::open(project.clone()).unwrap();
            let sector = ws.store.create_sector("North", WHO);
            let orchard = ws.store.create_orchard(sector.clone(), "Tutaekuri", WHO);
            let block = Block::new(orchard.clone(), "B3");
            let block_id = block.id.clone();
            ws.store.save_block(block, WHO);
            let event = TreeEvent::new(sector, orchard, block_id).with_quantity(18.0);
            ws.store.upsert_event(event, WHO).unwrap();
            ws.persist_all().unwrap();
        }

        let ws = Workspace::open(project).unwrap();
        assert!(ws.warnings().is_empty());
        assert_eq!(ws.store.sectors().len(), 1);
        assert_eq!(ws.store.events().len(), 1);
        assert_eq!(ws.store.events()[0].quantity, Some(18.0));
        // audit trail came back most-recent-first: the event diff leads
        assert!(ws.store.audit().entries()[0].message.contains("quantity"));
    }

    #[test]
    fn test_corrupt_collection_degrades_to_empty() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.data_dir().join("sectors.json"), "{{broken").unwrap();

        let ws = Workspace::open(project).unwrap();
        assert!(ws.store.sectors().is_empty());
        assert_eq!(ws.warnings().len(), 1);
        assert!(ws.warnings()[0].contains("sectors"));
    }

    #[test]
    fn test_malformed_row_is_skipped_with_warning() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let sec = EntityId::parse("SEC-1").unwrap();
        let orc = EntityId::parse("ORC-1").unwrap();
        let blk = EntityId::parse("BLK-1").unwrap();
        let good = TreeEvent::new(sec.clone(), orc.clone(), blk.clone()).with_quantity(18.0);
        let good_id = good.id.clone();
        let mut bad = serde_json::to_value(TreeEvent::new(sec, orc, blk)).unwrap();
        bad["lastUpdated"] = serde_json::Value::from("not-a-timestamp");
        let rows = vec![serde_json::to_value(&good).unwrap(), bad];
        std::fs::write(
            project.data_dir().join("tree_events.json"),
            serde_json::to_string_pretty(&rows).unwrap(),
        )
        .unwrap();

        let ws = Workspace::open(project).unwrap();
        assert_eq!(ws.store.events().len(), 1);
        assert_eq!(ws.store.events()[0].id, good_id);
        assert_eq!(ws.warnings().len(), 1);
        assert!(ws.warnings()[0].contains("tree_events"));
        assert!(ws.warnings()[0].contains("skipped"));
    }

    #[test]
    fn test_sqlite_backend_roundtrip() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        Config {
            author: WHO.to_string(),
            storage: StorageBackend::Sqlite,
        }
        .save(&project)
        .unwrap();

        {
            let mut ws = Workspace::open(project.clone()).unwrap();
            ws.store.create_sector("Coastal", WHO);
            ws.persist_all().unwrap();
        }

        let ws = Workspace::open(project).unwrap();
        assert_eq!(ws.store.sectors().len(), 1);
        assert_eq!(ws.store.sectors()[0].name, "Coastal");
    }
}
