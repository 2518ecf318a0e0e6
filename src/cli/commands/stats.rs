//! `o360 stats` command - Per-block rollups

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{helpers, FilterArgs, GlobalOpts, OutputFormat};
use crate::core::aggregate::group_by_block;
use crate::entities::display_number;

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = helpers::open_workspace()?;
    let query = args.filter.to_query(&workspace.store)?;
    let events = query.apply(workspace.store.events(), &workspace.store);
    let groups = group_by_block(&events, &workspace.store);

    match global.format.resolve(true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&groups).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&groups).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if groups.is_empty() {
                println!("No events to summarize.");
                return Ok(());
            }
            println!(
                "{:<10} {:<15} {:<8} {:<15} {:>7} {:>8} LATEST",
                "SECTOR", "ORCHARD", "BLOCK", "VARIETY", "EVENTS", "TREES"
            );
            for group in &groups {
                println!(
                    "{:<10} {:<15} {:<8} {:<15} {:>7} {:>8} {}",
                    helpers::truncate_str(workspace.store.sector_name(&group.sector_id), 10),
                    helpers::truncate_str(workspace.store.orchard_name(&group.orchard_id), 15),
                    style(&group.block.name).yellow(),
                    helpers::truncate_str(&group.block.variety, 15),
                    group.events.len(),
                    display_number(group.total_quantity),
                    style(group.latest_update.format("%Y-%m-%d %H:%M")).dim()
                );
            }

            let total: f64 = groups.iter().map(|g| g.total_quantity).sum();
            let event_count: usize = groups.iter().map(|g| g.events.len()).sum();
            println!(
                "\n{} blocks, {} events, {} trees total.",
                groups.len(),
                event_count,
                style(display_number(total)).bold()
            );
        }
    }
    Ok(())
}
