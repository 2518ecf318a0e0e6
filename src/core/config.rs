//! Project configuration (`.o360/config.yaml`)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::project::Project;

/// Which storage provider backs the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per collection under `.o360/data/`
    #[default]
    Json,
    /// A single SQLite database at `.o360/inventory.db`
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Project-local configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operator name recorded in audit entries
    #[serde(default = "default_author")]
    pub author: String,

    /// Storage provider selection
    #[serde(default)]
    pub storage: StorageBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author: default_author(),
            storage: StorageBackend::default(),
        }
    }
}

fn default_author() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "operator".to_string())
}

impl Config {
    /// Load the project config, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load(project: &Project) -> Self {
        std::fs::read_to_string(project.config_path())
            .ok()
            .and_then(|content| serde_yml::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let yaml = serde_yml::to_string(self).map_err(std::io::Error::other)?;
        std::fs::write(project.config_path(), yaml)
    }
}
