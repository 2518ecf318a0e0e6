//! Orchard360: orchard inventory toolkit
//!
//! Tracks orchard inventory across a four-level hierarchy (sector → orchard →
//! block → tree-change event) stored as plain collections, with derived
//! per-block views, an append-only audit trail and CSV interchange.

pub mod cli;
pub mod codec;
pub mod core;
pub mod entities;
pub mod storage;
