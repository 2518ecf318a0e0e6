//! `o360 import` command - Merge events from a CSV file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers;
use crate::codec::import::parse_csv;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import (current export format or legacy flat format)
    pub file: PathBuf,
}

pub fn run(args: ImportArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file).into_diagnostic()?;
    let records = parse_csv(&text).map_err(|e| miette::miette!("{}", e))?;

    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let stats = workspace.store.merge_imported(records, &author);
    workspace.persist_all().map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Imported {}: {} new, {} replaced",
        style("✓").green().bold(),
        style(args.file.display()).cyan(),
        stats.inserted,
        stats.replaced
    );
    Ok(())
}
