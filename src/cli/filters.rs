//! Unified filter flags for event-oriented commands
//!
//! `event list`, `stats` and `export` all narrow the event set the same way:
//! scope (sector/orchard/block), status, free text. The flags here translate
//! into a core `EventQuery`, so the CLI and the library agree on semantics.

use clap::ValueEnum;
use miette::Result;

use crate::cli::helpers;
use crate::core::filter::{EventQuery, Scope};
use crate::core::store::InventoryStore;
use crate::entities::EventStatus;

/// Status filter for event list commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// New Planting only
    NewPlanting,
    /// Replanting only
    Replanting,
    /// Kneecapped only
    Kneecapped,
    /// Grafted only
    Grafted,
    /// Removed only
    Removed,
    /// All statuses - default
    #[default]
    All,
}

impl StatusFilter {
    /// The concrete status this filter selects, or `None` for "all"
    pub fn to_status(&self) -> Option<EventStatus> {
        match self {
            StatusFilter::NewPlanting => Some(EventStatus::NewPlanting),
            StatusFilter::Replanting => Some(EventStatus::Replanting),
            StatusFilter::Kneecapped => Some(EventStatus::Kneecapped),
            StatusFilter::Grafted => Some(EventStatus::Grafted),
            StatusFilter::Removed => Some(EventStatus::Removed),
            StatusFilter::All => None,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::NewPlanting => write!(f, "new-planting"),
            StatusFilter::Replanting => write!(f, "replanting"),
            StatusFilter::Kneecapped => write!(f, "kneecapped"),
            StatusFilter::Grafted => write!(f, "grafted"),
            StatusFilter::Removed => write!(f, "removed"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// Shared narrowing flags
#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    /// Narrow to one sector (id or name)
    #[arg(long)]
    pub sector: Option<String>,

    /// Narrow to one orchard (id or name)
    #[arg(long)]
    pub orchard: Option<String>,

    /// Narrow to one block (id or name)
    #[arg(long)]
    pub block: Option<String>,

    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Free-text search over names, variety, structure, status and notes
    #[arg(long, short = 'q')]
    pub search: Option<String>,
}

impl FilterArgs {
    /// Resolve names to ids and build the query
    ///
    /// Scope selections cascade: the block flag, if given, is applied last so
    /// it is never cleared by the broader selections.
    pub fn to_query(&self, store: &InventoryStore) -> Result<EventQuery> {
        let mut scope = Scope::all();
        if let Some(ref sector) = self.sector {
            let sector = helpers::find_sector(store, sector)?;
            scope = scope.select_sector(Some(sector.id));
        }
        if let Some(ref orchard) = self.orchard {
            let orchard = helpers::find_orchard(store, orchard)?;
            scope = scope.select_orchard(Some(orchard.id));
        }
        if let Some(ref block) = self.block {
            let block = helpers::find_block(store, block)?;
            scope = scope.select_block(Some(block.id));
        }

        Ok(EventQuery::default()
            .with_scope(scope)
            .with_status(self.status.to_status())
            .with_text(self.search.clone().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_maps_to_no_status() {
        assert_eq!(StatusFilter::All.to_status(), None);
        assert_eq!(
            StatusFilter::Kneecapped.to_status(),
            Some(EventStatus::Kneecapped)
        );
    }
}
