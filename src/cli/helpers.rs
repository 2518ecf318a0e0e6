//! Shared helper functions for CLI commands

use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::core::identity::EntityId;
use crate::core::project::Project;
use crate::core::store::InventoryStore;
use crate::core::workspace::Workspace;
use crate::entities::{Block, Orchard, Sector, TreeEvent};

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    format_short_id_str(id.as_str())
}

/// Same behavior as format_short_id but works with &str
pub fn format_short_id_str(id: &str) -> String {
    if id.len() > 16 {
        format!("{}...", &id[..13])
    } else {
        id.to_string()
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Discover the project and open a workspace, surfacing load warnings
pub fn open_workspace() -> Result<Workspace> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let workspace = Workspace::open(project).map_err(|e| miette::miette!("{}", e))?;
    for warning in workspace.warnings() {
        eprintln!("{} {}", style("warning:").yellow().bold(), warning);
    }
    Ok(workspace)
}

/// Resolve a sector by exact id or unique name (case-insensitive)
pub fn find_sector(store: &InventoryStore, query: &str) -> Result<Sector> {
    if let Ok(id) = EntityId::parse(query) {
        if let Some(sector) = store.sector(&id) {
            return Ok(sector.clone());
        }
    }
    let matches: Vec<&Sector> = store
        .sectors()
        .iter()
        .filter(|s| s.name.eq_ignore_ascii_case(query))
        .collect();
    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(miette::miette!("no sector matching '{}'", query)),
        many => Err(miette::miette!(
            "'{}' is ambiguous: {} sectors share that name; use an id",
            query,
            many.len()
        )),
    }
}

/// Resolve an orchard by exact id or unique name (case-insensitive)
pub fn find_orchard(store: &InventoryStore, query: &str) -> Result<Orchard> {
    if let Ok(id) = EntityId::parse(query) {
        if let Some(orchard) = store.orchard(&id) {
            return Ok(orchard.clone());
        }
    }
    let matches: Vec<&Orchard> = store
        .orchards()
        .iter()
        .filter(|o| o.name.eq_ignore_ascii_case(query))
        .collect();
    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(miette::miette!("no orchard matching '{}'", query)),
        many => Err(miette::miette!(
            "'{}' is ambiguous: {} orchards share that name; use an id",
            query,
            many.len()
        )),
    }
}

/// Resolve a block by exact id or unique name (case-insensitive)
pub fn find_block(store: &InventoryStore, query: &str) -> Result<Block> {
    if let Ok(id) = EntityId::parse(query) {
        if let Some(block) = store.block(&id) {
            return Ok(block.clone());
        }
    }
    let matches: Vec<&Block> = store
        .blocks()
        .iter()
        .filter(|b| b.name.eq_ignore_ascii_case(query))
        .collect();
    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(miette::miette!("no block matching '{}'", query)),
        many => Err(miette::miette!(
            "'{}' is ambiguous: {} blocks share that name; use an id",
            query,
            many.len()
        )),
    }
}

/// Resolve an event by id (events have no human name to match on)
pub fn find_event(store: &InventoryStore, query: &str) -> Result<TreeEvent> {
    let id = EntityId::parse(query).map_err(|e| miette::miette!("{}", e))?;
    store
        .event(&id)
        .cloned()
        .ok_or_else(|| miette::miette!("no event with id '{}'", query))
}

/// Ask for delete confirmation unless `--yes` was given
pub fn confirm_delete(what: &str, name: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(format!("Delete {} '{}'?", what, name))
        .default(false)
        .interact()
        .into_diagnostic()
}
