//! `o360 export` command - Denormalized CSV export

use chrono::Utc;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::{helpers, FilterArgs};
use crate::codec::export::{export_filename, to_csv};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output path; "-" writes to stdout (default: timestamped file)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let workspace = helpers::open_workspace()?;
    let query = args.filter.to_query(&workspace.store)?;
    let mut events = query.apply(workspace.store.events(), &workspace.store);
    events.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));

    let csv = to_csv(&events, &workspace.store).map_err(|e| miette::miette!("{}", e))?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_filename(Utc::now())));
    if path.as_os_str() == "-" {
        print!("{}", csv);
        return Ok(());
    }

    std::fs::write(&path, &csv).into_diagnostic()?;
    println!(
        "{} Exported {} events to {}",
        style("✓").green().bold(),
        events.len(),
        style(path.display()).cyan()
    );
    Ok(())
}
