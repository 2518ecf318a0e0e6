//! `o360 block` command - Block management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{helpers, GlobalOpts, OutputFormat};
use crate::entities::display_number;
use crate::storage::Collection;

#[derive(Subcommand, Debug)]
pub enum BlockCommands {
    /// List blocks
    List(ListArgs),

    /// Create a new block within an orchard
    New(NewArgs),

    /// Show a block's details
    Show(ShowArgs),

    /// Update a block's fields
    Set(SetArgs),

    /// Delete a block (refused while it still has events)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only blocks in this orchard (id or name)
    #[arg(long)]
    pub orchard: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Block name, e.g. "B3"
    pub name: String,

    /// Owning orchard (id or name)
    #[arg(long)]
    pub orchard: String,

    /// Planted variety, e.g. "Jazz"
    #[arg(long)]
    pub variety: Option<String>,

    /// Planting structure, e.g. "Tall spindle"
    #[arg(long)]
    pub structure: Option<String>,

    /// Number of planted rows
    #[arg(long)]
    pub rows: Option<u32>,

    /// Planted area in hectares
    #[arg(long)]
    pub hectares: Option<f64>,

    /// GPS latitude (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// GPS longitude (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Health score in [0, 100]
    #[arg(long)]
    pub health: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Block id or name
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Block id or name
    pub id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New variety
    #[arg(long)]
    pub variety: Option<String>,

    /// New planting structure
    #[arg(long)]
    pub structure: Option<String>,

    /// New row count
    #[arg(long)]
    pub rows: Option<u32>,

    /// New planted area in hectares
    #[arg(long)]
    pub hectares: Option<f64>,

    /// New GPS latitude (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// New GPS longitude (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// New health score in [0, 100]
    #[arg(long)]
    pub health: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Block id or name
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: BlockCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BlockCommands::List(args) => run_list(args, global),
        BlockCommands::New(args) => run_new(args, global),
        BlockCommands::Show(args) => run_show(args, global),
        BlockCommands::Set(args) => run_set(args),
        BlockCommands::Delete(args) => run_delete(args),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = helpers::open_workspace()?;
    let orchard_filter = args
        .orchard
        .as_deref()
        .map(|o| helpers::find_orchard(&workspace.store, o))
        .transpose()?;

    let blocks: Vec<_> = workspace
        .store
        .blocks()
        .iter()
        .filter(|b| {
            orchard_filter
                .as_ref()
                .is_none_or(|orchard| b.orchard_id == orchard.id)
        })
        .cloned()
        .collect();

    match global.format.resolve(true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&blocks).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&blocks).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for block in &blocks {
                println!("{}", block.id);
            }
        }
        _ => {
            if blocks.is_empty() {
                println!("No blocks found.");
                return Ok(());
            }
            println!(
                "{:<18} {:<10} {:<20} {:<15} {:<18} {:>5} {:>8}",
                "ID", "NAME", "ORCHARD", "VARIETY", "STRUCTURE", "ROWS", "HA"
            );
            for block in &blocks {
                println!(
                    "{:<18} {:<10} {:<20} {:<15} {:<18} {:>5} {:>8}",
                    style(helpers::format_short_id(&block.id)).cyan(),
                    block.name,
                    helpers::truncate_str(workspace.store.orchard_name(&block.orchard_id), 20),
                    helpers::truncate_str(&block.variety, 15),
                    helpers::truncate_str(&block.structure_type, 18),
                    block.row_count,
                    display_number(block.hectares)
                );
            }
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let orchard = helpers::find_orchard(&workspace.store, &args.orchard)?;

    let block = crate::entities::Block::new(orchard.id.clone(), &args.name)
        .with_variety(args.variety.unwrap_or_default())
        .with_structure(args.structure.unwrap_or_default())
        .with_layout(args.rows.unwrap_or(0), args.hectares.unwrap_or(0.0))
        .with_gps(args.lat.zip(args.lon))
        .with_health(args.health);
    let id = block.id.clone();
    workspace.store.save_block(block, &author);
    workspace
        .persist(&[Collection::Blocks, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    if global.format == OutputFormat::Id {
        println!("{}", id);
    } else {
        println!(
            "{} Created block {} in {} ({})",
            style("✓").green().bold(),
            style(&args.name).yellow(),
            style(&orchard.name).yellow(),
            style(&id).cyan()
        );
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = helpers::open_workspace()?;
    let block = helpers::find_block(&workspace.store, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&block).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&block).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", block.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&block.id).cyan());
            println!("{}: {}", style("Name").bold(), style(&block.name).yellow());
            println!(
                "{}: {}",
                style("Orchard").bold(),
                workspace.store.orchard_name(&block.orchard_id)
            );
            println!("{}: {}", style("Variety").bold(), block.variety);
            println!("{}: {}", style("Structure").bold(), block.structure_type);
            println!(
                "{}: {} rows over {} ha",
                style("Layout").bold(),
                block.row_count,
                display_number(block.hectares)
            );
            if let Some((lat, lon)) = block.gps() {
                println!("{}: {}, {}", style("GPS").bold(), lat, lon);
            }
            if let Some(health) = block.health {
                println!("{}: {}", style("Health").bold(), display_number(health));
            }
            println!("{}", style("─".repeat(60)).dim());
        }
    }
    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let mut block = helpers::find_block(&workspace.store, &args.id)?;

    if let Some(name) = args.name {
        block.name = name;
    }
    if let Some(variety) = args.variety {
        block.variety = variety;
    }
    if let Some(structure) = args.structure {
        block.structure_type = structure;
    }
    if let Some(rows) = args.rows {
        block.row_count = rows;
    }
    if let Some(hectares) = args.hectares {
        block.hectares = hectares;
    }
    if let Some(gps) = args.lat.zip(args.lon) {
        block = block.with_gps(Some(gps));
    }
    if args.health.is_some() {
        block = block.with_health(args.health);
    }

    let name = block.name.clone();
    workspace.store.save_block(block, &author);
    workspace
        .persist(&[Collection::Blocks, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Updated block {}",
        style("✓").green().bold(),
        style(name).yellow()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let block = helpers::find_block(&workspace.store, &args.id)?;

    if !helpers::confirm_delete("block", &block.name, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = workspace
        .store
        .delete_block(&block.id, &author)
        .map_err(|e| miette::miette!("{}", e))?;
    workspace
        .persist(&[Collection::Blocks, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    if removed {
        println!(
            "{} Deleted block {}",
            style("✓").green().bold(),
            style(&block.name).yellow()
        );
    } else {
        println!("Nothing to delete.");
    }
    Ok(())
}
