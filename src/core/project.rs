//! Project discovery and layout
//!
//! An Orchard360 project is any directory containing a `.o360/` marker
//! directory. `discover()` walks up from the current directory, so commands
//! work from anywhere inside the project tree.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory identifying a project root
pub const MARKER_DIR: &str = ".o360";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not inside an Orchard360 project (no {MARKER_DIR}/ directory found here or in any parent); run 'o360 init' first")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered or freshly initialized project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Walk up from the current directory looking for the marker
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Walk up from the given directory looking for the marker
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut dir = start.to_path_buf();
        loop {
            if dir.join(MARKER_DIR).is_dir() {
                return Ok(Self { root: dir });
            }
            if !dir.pop() {
                return Err(ProjectError::NotFound);
            }
        }
    }

    /// Create the marker and data directories under `path`
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let project = Self {
            root: path.to_path_buf(),
        };
        std::fs::create_dir_all(project.data_dir())?;
        Ok(project)
    }

    /// Whether a project already exists at `path` (not in a parent)
    pub fn exists(path: &Path) -> bool {
        path.join(MARKER_DIR).is_dir()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn marker_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// Where the JSON provider keeps its collection files
    pub fn data_dir(&self) -> PathBuf {
        self.marker_dir().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.marker_dir().join("config.yaml")
    }

    /// Where the SQLite provider keeps its database
    pub fn db_path(&self) -> PathBuf {
        self.marker_dir().join("inventory.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        assert!(project.marker_dir().is_dir());
        assert!(project.data_dir().is_dir());
        assert!(Project::exists(tmp.path()));
    }

    #[test]
    fn test_discover_walks_up() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        let nested = tmp.path().join("orchards/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_fails_outside_project() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound)
        ));
    }
}
