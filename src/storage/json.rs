//! Local JSON storage provider
//!
//! One `<collection>.json` file per collection, each holding a JSON array in
//! the entities' wire shape. Mirrors the original single-blob key-value
//! persistence but keeps collections separately addressable.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use super::{Collection, StorageError, StorageProvider};

#[derive(Debug, Clone)]
pub struct JsonProvider {
    dir: PathBuf,
}

impl JsonProvider {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }
}

impl StorageProvider for JsonProvider {
    fn load(&self, collection: Collection) -> Result<Vec<Value>, StorageError> {
        let path = self.path_for(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        let rows: Vec<Value> =
            serde_json::from_str(&content).map_err(|e| StorageError::Unavailable {
                collection: collection.key(),
                reason: e.to_string(),
            })?;
        Ok(rows)
    }

    fn save(&mut self, collection: Collection, rows: &[Value]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(rows)?;
        fs::write(self.path_for(collection), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_missing_collection_loads_empty() {
        let tmp = tempdir().unwrap();
        let provider = JsonProvider::new(tmp.path().to_path_buf());
        assert!(provider.load(Collection::Sectors).unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let tmp = tempdir().unwrap();
        let mut provider = JsonProvider::new(tmp.path().to_path_buf());

        let rows = vec![
            json!({"id": "SEC-1", "name": "North"}),
            json!({"id": "SEC-2", "name": "South"}),
        ];
        provider.save(Collection::Sectors, &rows).unwrap();

        let loaded = provider.load(Collection::Sectors).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_corrupt_file_reports_unavailable() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("sectors.json"), "not json at all").unwrap();
        let provider = JsonProvider::new(tmp.path().to_path_buf());
        assert!(matches!(
            provider.load(Collection::Sectors),
            Err(StorageError::Unavailable { .. })
        ));
    }
}
