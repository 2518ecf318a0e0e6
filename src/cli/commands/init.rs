//! `o360 init` command - Initialize a new inventory project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::config::{Config, StorageBackend};
use crate::core::project::Project;
use crate::core::store::InventoryStore;
use crate::core::workspace::Workspace;
use crate::entities::{Block, EventStatus, TreeEvent};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Reinitialize even if a project already exists here
    #[arg(long)]
    pub force: bool,

    /// Seed the project with the Hawke's Bay demo inventory
    #[arg(long)]
    pub seed: bool,

    /// Storage backend for the new project
    #[arg(long, default_value = "json")]
    pub storage: StorageBackend,
}

pub fn run(args: InitArgs) -> Result<()> {
    if Project::exists(&args.path) && !args.force {
        return Err(miette::miette!(
            "a project already exists at {} (use --force to reinitialize)",
            args.path.display()
        ));
    }

    let project = Project::init(&args.path).map_err(|e| miette::miette!("{}", e))?;
    let config = Config {
        storage: args.storage,
        ..Config::default()
    };
    config.save(&project).into_diagnostic()?;

    if args.seed {
        let mut workspace = Workspace::open(project.clone()).map_err(|e| miette::miette!("{}", e))?;
        seed_store(&mut workspace.store, &config.author)?;
        workspace.persist_all().map_err(|e| miette::miette!("{}", e))?;
    }

    println!(
        "{} Initialized project at {}",
        style("✓").green().bold(),
        style(project.root().display()).cyan()
    );
    println!("  Storage: {}", style(args.storage).yellow());
    if args.seed {
        println!("  Seeded demo sectors, orchards, blocks and events");
    }

    Ok(())
}

/// Demo inventory: two sectors across three Hawke's Bay orchards
fn seed_store(store: &mut InventoryStore, who: &str) -> Result<()> {
    let north = store.create_sector("North", who);
    let south = store.create_sector("South", who);

    let tutaekuri = store.create_orchard(north.clone(), "Tutaekuri", who);
    let puketapu = store.create_orchard(north.clone(), "Puketapu", who);
    let clive = store.create_orchard(south.clone(), "Clive", who);

    let b3 = Block::new(tutaekuri.clone(), "B3")
        .with_variety("Jazz")
        .with_structure("Tall spindle")
        .with_layout(12, 1.8)
        .with_gps(Some((-39.5903, 176.8506)))
        .with_health(Some(86.0));
    let a2 = Block::new(puketapu.clone(), "A2")
        .with_variety("Pink Lady")
        .with_structure("2D cordon")
        .with_layout(8, 1.1);
    let q1 = Block::new(clive.clone(), "Q1")
        .with_variety("Envy")
        .with_structure("V-trellis")
        .with_layout(10, 1.4);
    let (b3_id, a2_id, q1_id) = (b3.id.clone(), a2.id.clone(), q1.id.clone());
    store.save_block(b3, who);
    store.save_block(a2, who);
    store.save_block(q1, who);

    let events = [
        TreeEvent::new(north.clone(), tutaekuri.clone(), b3_id.clone())
            .with_quantity(18.0)
            .with_status(EventStatus::Kneecapped)
            .with_notes("Slight mite pressure on row 4"),
        TreeEvent::new(north.clone(), tutaekuri, b3_id)
            .with_quantity(19.0)
            .with_status(EventStatus::Grafted),
        TreeEvent::new(north, puketapu, a2_id)
            .with_quantity(42.0)
            .with_status(EventStatus::NewPlanting),
        TreeEvent::new(south, clive, q1_id)
            .with_quantity(7.0)
            .with_status(EventStatus::Removed)
            .with_notes("Wind damage along the shelter belt"),
    ];
    for event in events {
        store
            .upsert_event(event, who)
            .map_err(|e| miette::miette!("{}", e))?;
    }

    Ok(())
}
