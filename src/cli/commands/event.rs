//! `o360 event` command - Tree-change event entry and listing

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{helpers, FilterArgs, GlobalOpts, OutputFormat};
use crate::entities::{display_number, EventStatus, TreeEvent};
use crate::storage::Collection;

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// List events, newest first
    List(ListArgs),

    /// Record a new event against a block
    Add(AddArgs),

    /// Update an existing event
    Update(UpdateArgs),

    /// Delete an event
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Target block (id or name); sector and orchard are derived from it
    #[arg(long)]
    pub block: String,

    /// Number of trees affected
    #[arg(long, short = 'q')]
    pub quantity: f64,

    /// Change kind
    #[arg(long, short = 's', default_value = "new-planting")]
    pub status: EventStatus,

    /// Estimated TCE value
    #[arg(long)]
    pub tce: Option<f64>,

    /// Rootstock, e.g. "M9"
    #[arg(long)]
    pub rootstock: Option<String>,

    /// Tree age in years
    #[arg(long)]
    pub age: Option<f64>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Event id
    pub id: String,

    /// New quantity
    #[arg(long, short = 'q')]
    pub quantity: Option<f64>,

    /// New status
    #[arg(long, short = 's')]
    pub status: Option<EventStatus>,

    /// New TCE value
    #[arg(long)]
    pub tce: Option<f64>,

    /// New rootstock
    #[arg(long)]
    pub rootstock: Option<String>,

    /// New age in years
    #[arg(long)]
    pub age: Option<f64>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Event id
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: EventCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EventCommands::List(args) => run_list(args, global),
        EventCommands::Add(args) => run_add(args, global),
        EventCommands::Update(args) => run_update(args),
        EventCommands::Delete(args) => run_delete(args),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = helpers::open_workspace()?;
    let query = args.filter.to_query(&workspace.store)?;
    let mut events = query.apply(workspace.store.events(), &workspace.store);
    events.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    if let Some(limit) = args.limit {
        events.truncate(limit);
    }

    match global.format.resolve(true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&events).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&events).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for event in &events {
                println!("{}", event.id);
            }
        }
        _ => {
            if events.is_empty() {
                println!("No events found.");
                return Ok(());
            }
            println!(
                "{:<18} {:<10} {:<15} {:<8} {:>6} {:<13} UPDATED",
                "ID", "SECTOR", "ORCHARD", "BLOCK", "QTY", "STATUS"
            );
            for event in &events {
                println!(
                    "{:<18} {:<10} {:<15} {:<8} {:>6} {:<13} {}",
                    style(helpers::format_short_id(&event.id)).cyan(),
                    helpers::truncate_str(workspace.store.sector_name(&event.sector_id), 10),
                    helpers::truncate_str(workspace.store.orchard_name(&event.orchard_id), 15),
                    helpers::truncate_str(workspace.store.block_name(&event.block_id), 8),
                    event.quantity.map(display_number).unwrap_or_default(),
                    event.status,
                    style(event.last_updated.format("%Y-%m-%d %H:%M")).dim()
                );
            }
            println!("\n{} events.", events.len());
        }
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();

    let block = helpers::find_block(&workspace.store, &args.block)?;
    let orchard = workspace
        .store
        .orchard(&block.orchard_id)
        .cloned()
        .ok_or_else(|| {
            miette::miette!("block '{}' belongs to an orchard that no longer exists", block.name)
        })?;

    let mut event = TreeEvent::new(orchard.sector_id, orchard.id, block.id)
        .with_quantity(args.quantity)
        .with_status(args.status);
    event.tce = args.tce;
    event.rootstock = args.rootstock;
    event.age = args.age;
    event.notes = args.notes;

    let saved = workspace
        .store
        .upsert_event(event, &author)
        .map_err(|e| miette::miette!("{}", e))?;
    workspace
        .persist(&[Collection::TreeEvents, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    if global.format == OutputFormat::Id {
        println!("{}", saved.id);
    } else {
        println!(
            "{} Recorded {} x{} on block {} ({})",
            style("✓").green().bold(),
            style(saved.status).yellow(),
            display_number(args.quantity),
            style(&block.name).yellow(),
            style(&saved.id).cyan()
        );
    }
    Ok(())
}

fn run_update(args: UpdateArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let mut event = helpers::find_event(&workspace.store, &args.id)?;

    if let Some(quantity) = args.quantity {
        event.quantity = Some(quantity);
    }
    if let Some(status) = args.status {
        event.status = status;
    }
    if args.tce.is_some() {
        event.tce = args.tce;
    }
    if args.rootstock.is_some() {
        event.rootstock = args.rootstock;
    }
    if args.age.is_some() {
        event.age = args.age;
    }
    if args.notes.is_some() {
        event.notes = args.notes;
    }

    let saved = workspace
        .store
        .upsert_event(event, &author)
        .map_err(|e| miette::miette!("{}", e))?;
    workspace
        .persist(&[Collection::TreeEvents, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Updated event {}",
        style("✓").green().bold(),
        style(&saved.id).cyan()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let event = helpers::find_event(&workspace.store, &args.id)?;

    if !helpers::confirm_delete("event", event.id.as_str(), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    workspace.store.delete_event(&event.id, &author);
    workspace
        .persist(&[Collection::TreeEvents, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Deleted event {}",
        style("✓").green().bold(),
        style(&event.id).cyan()
    );
    Ok(())
}
