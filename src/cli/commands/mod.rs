//! Command implementations

pub mod block;
pub mod completions;
pub mod event;
pub mod export;
pub mod import;
pub mod init;
pub mod log;
pub mod orchard;
pub mod sector;
pub mod stats;
