//! `o360 sector` command - Sector management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{helpers, GlobalOpts, OutputFormat};
use crate::storage::Collection;

#[derive(Subcommand, Debug)]
pub enum SectorCommands {
    /// List sectors
    List,

    /// Create a new sector
    New(NewArgs),

    /// Rename a sector
    Rename(RenameArgs),

    /// Delete a sector (refused while it still has orchards)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Sector name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// Sector id or name
    pub id: String,

    /// New name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Sector id or name
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: SectorCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SectorCommands::List => run_list(global),
        SectorCommands::New(args) => run_new(args, global),
        SectorCommands::Rename(args) => run_rename(args),
        SectorCommands::Delete(args) => run_delete(args),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let workspace = helpers::open_workspace()?;
    let sectors = workspace.store.sectors();

    match global.format.resolve(true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(sectors).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&sectors).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for sector in sectors {
                println!("{}", sector.id);
            }
        }
        _ => {
            if sectors.is_empty() {
                println!("No sectors found.");
                return Ok(());
            }
            println!("{:<18} {:<25} ORCHARDS", "ID", "NAME");
            for sector in sectors {
                let orchards = workspace
                    .store
                    .orchards()
                    .iter()
                    .filter(|o| o.sector_id == sector.id)
                    .count();
                println!(
                    "{:<18} {:<25} {}",
                    style(helpers::format_short_id(&sector.id)).cyan(),
                    sector.name,
                    orchards
                );
            }
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let id = workspace.store.create_sector(&args.name, &author);
    workspace
        .persist(&[Collection::Sectors, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    if global.format == OutputFormat::Id {
        println!("{}", id);
    } else {
        println!(
            "{} Created sector {} ({})",
            style("✓").green().bold(),
            style(&args.name).yellow(),
            style(&id).cyan()
        );
    }
    Ok(())
}

fn run_rename(args: RenameArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let mut sector = helpers::find_sector(&workspace.store, &args.id)?;
    let old_name = sector.name.clone();
    sector.name = args.name.clone();
    workspace.store.save_sector(sector, &author);
    workspace
        .persist(&[Collection::Sectors, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Renamed sector {} → {}",
        style("✓").green().bold(),
        style(old_name).dim(),
        style(&args.name).yellow()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs) -> Result<()> {
    let mut workspace = helpers::open_workspace()?;
    let author = workspace.author().to_string();
    let sector = helpers::find_sector(&workspace.store, &args.id)?;

    if !helpers::confirm_delete("sector", &sector.name, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = workspace
        .store
        .delete_sector(&sector.id, &author)
        .map_err(|e| miette::miette!("{}", e))?;
    workspace
        .persist(&[Collection::Sectors, Collection::AuditLog])
        .map_err(|e| miette::miette!("{}", e))?;

    if removed {
        println!(
            "{} Deleted sector {}",
            style("✓").green().bold(),
            style(&sector.name).yellow()
        );
    } else {
        println!("Nothing to delete.");
    }
    Ok(())
}
