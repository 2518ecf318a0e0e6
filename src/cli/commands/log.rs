//! `o360 log` command - View the audit trail
//!
//! Shows the append-only record of mutations, most recent first.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{helpers, GlobalOpts, OutputFormat};
use crate::entities::AuditTarget;

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Limit number of entries
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Filter by entity kind (sector, orchard, block, tree)
    #[arg(long, short = 't')]
    pub entity: Option<String>,

    /// Filter by operator name (substring match)
    #[arg(long, short = 'w')]
    pub who: Option<String>,
}

pub fn run(args: LogArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = helpers::open_workspace()?;

    let entries: Vec<_> = workspace
        .store
        .audit()
        .entries()
        .iter()
        .filter(|e| {
            args.entity
                .as_deref()
                .is_none_or(|kind| entity_matches(&e.entity, kind))
        })
        .filter(|e| {
            args.who
                .as_deref()
                .is_none_or(|who| e.who.to_lowercase().contains(&who.to_lowercase()))
        })
        .take(args.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();

    match global.format.resolve(true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&entries).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if entries.is_empty() {
                println!("No audit entries found.");
                return Ok(());
            }
            println!(
                "{:<17} {:<12} {:<8} {:<18} MESSAGE",
                "DATE", "WHO", "KIND", "ENTITY"
            );
            for entry in &entries {
                println!(
                    "{:<17} {:<12} {:<8} {:<18} {}",
                    style(entry.at.format("%Y-%m-%d %H:%M")).dim(),
                    helpers::truncate_str(&entry.who, 12),
                    entry.entity,
                    style(helpers::format_short_id(&entry.entity_id)).cyan(),
                    entry.message
                );
            }
            println!("\n{} audit entries.", entries.len());
        }
    }
    Ok(())
}

fn entity_matches(entity: &AuditTarget, kind: &str) -> bool {
    entity.to_string().eq_ignore_ascii_case(kind)
}
