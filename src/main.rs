use clap::Parser;
use miette::Result;
use o360::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => o360::cli::commands::init::run(args),
        Commands::Sector(cmd) => o360::cli::commands::sector::run(cmd, &cli.global),
        Commands::Orchard(cmd) => o360::cli::commands::orchard::run(cmd, &cli.global),
        Commands::Block(cmd) => o360::cli::commands::block::run(cmd, &cli.global),
        Commands::Event(cmd) => o360::cli::commands::event::run(cmd, &cli.global),
        Commands::Stats(args) => o360::cli::commands::stats::run(args, &cli.global),
        Commands::Export(args) => o360::cli::commands::export::run(args),
        Commands::Import(args) => o360::cli::commands::import::run(args),
        Commands::Log(args) => o360::cli::commands::log::run(args, &cli.global),
        Commands::Completions(args) => o360::cli::commands::completions::run(args),
    }
}
