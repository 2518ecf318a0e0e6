//! `o360 orchard` command - Orchard management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{helpers, GlobalOpts, OutputFormat};
use crate::storage::Collection;

#[derive(Subcommand, Debug)]
pub enum OrchardCommands {
    /// List orchards
    List(ListArgs),

    /// Create a new orchard within a sector
    New(NewArgs),

    /// Rename an orchard
    Rename(RenameArgs),

    /// Delete an orchard (refused while it still has blocks)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only orchards in this sector (id or name)
    #[arg(long)]
    pub sector: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Orchard name
    pub name: String,

    /// Owning sector (id or name)
    #[arg(long)]
    pub sector: String,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// Orchard id or name
    pub id: String,

    /// New name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Orchard id or name
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: OrchardCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrchardCommands::List(args) => run_list(args, global),
        OrchardCommands::New(args) => run_new(args, global),
        OrchardCommands::Rename(args) => run_rename(args),
        OrchardCommands::Delete(args) => run_delete(args),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = helpers::open_workspace()?;
    let sector_filter = args
        .sector
        .as_deref()
        .map(|s| helpers::find_sector(&workspace.store, s))
        .transpose()?;

    let orchards: Vec<_> = workspace
        .store
        .orchards()
        .iter()
        .filter(|o| {
            sector_filter
                .as_ref()
                .is_none_or(|sector| o.sector_id == sector.id)
        })
        .cloned()
        .collect();

    match global.format.resolve(true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&orchards).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&orchards).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for orchard in &orchards {
                println!("{}", orchard.id);
            }
        }
        _ => {
            if orchards.is_empty() {
                println!("No orchards found.");
                return Ok(());
            }
            println!("{:<18} {:<25} {:<15} BLOCKS", "ID", "NAME", "SECTOR");
            for orchard in &orchards {
                let blocks = workspace
                    .store
                    .blocks()
                    .iter()
                    .filter(|b| b.orchard_id == orchard.id)
                    .count();
                println!(
                    "{:<18} {:<25} {:<15} {}",
                    style(helpers::format_short_id(&orchard.id)).cyan(),
                    orchard.name,
                    workspace.store.sector_name(&orchard.sector_id),
                    blocks
                );
            }
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let sector = helpers::find_sector(&workspace.store, &args.sector)?;
    let id = workspace
        .store
        .create_orchard(sector.id, &args.name, &author);
    workspace
        .persist(&[Collection::Orchards, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    if global.format == OutputFormat::Id {
        println!("{}", id);
    } else {
        println!(
            "{} Created orchard {} in {} ({})",
            style("✓").green().bold(),
            style(&args.name).yellow(),
            style(&sector.name).yellow(),
            style(&id).cyan()
        );
    }
    Ok(())
}

fn run_rename(args: RenameArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let mut orchard = helpers::find_orchard(&workspace.store, &args.id)?;
    let old_name = orchard.name.clone();
    orchard.name = args.name.clone();
    workspace.store.save_orchard(orchard, &author);
    workspace
        .persist(&[Collection::Orchards, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Renamed orchard {} → {}",
        style("✓").green().bold(),
        style(old_name).dim(),
        style(&args.name).yellow()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let orchard = helpers::find_orchard(&workspace.store, &args.id)?;

    if !helpers::confirm_delete("orchard", &orchard.name, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = workspace
        .store
        .delete_orchard(&orchard.id, &author)
        .map_err(|e| miette::miette!("{}", e))?;
    workspace
        .persist(&[Collection::Orchards, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    if removed {
        println!(
            "{} Deleted orchard {}",
            style("✓").green().bold(),
            style(&orchard.name).yellow()
        );
    } else {
        println!("Nothing to delete.");
    }
    Ok(())
}
