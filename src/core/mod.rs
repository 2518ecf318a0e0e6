//! Core module - store, derived views and session plumbing

pub mod aggregate;
pub mod audit;
pub mod config;
pub mod filter;
pub mod identity;
pub mod project;
pub mod store;
pub mod workspace;

pub use aggregate::{group_by_block, BlockGroup};
pub use audit::AuditTrail;
pub use config::{Config, StorageBackend};
pub use filter::{EventQuery, Scope};
pub use identity::{EntityId, EntityPrefix, IdError};
pub use project::{Project, ProjectError};
pub use store::{IntegrityError, InventoryStore, MergeStats, ValidationError};
pub use workspace::Workspace;
