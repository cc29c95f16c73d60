//! featurekit CLI entry point.
//!
//! Binary name: `fkit`
//!
//! Parses CLI arguments, loads the engine config, then dispatches to the
//! appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,featurekit=debug",
        _ => "trace",
    };

    if cli.otel {
        featurekit_observe::tracing_setup::init_tracing(true, filter)
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let result = run(cli).await;
    featurekit_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Neither needs the engine config
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "fkit", &mut std::io::stdout());
            return Ok(());
        }
        Commands::FormatSchema => return cli::format_schema::handle_format_schema(),
        _ => {}
    }

    let state = AppState::init(cli.dir.clone()).await?;

    match cli.command {
        Commands::Inspect { file, class } => {
            cli::inspect::handle_inspect(&state, &file, &class, cli.json).await?;
        }

        Commands::Schema { file, class } => {
            cli::schema::handle_schema(&state, &file, &class, cli.json).await?;
        }

        Commands::Compose { file, class } => {
            cli::compose::handle_compose(&state, &file, &class, cli.json).await?;
        }

        Commands::Check { file } => {
            cli::check::handle_check(&state, &file, cli.json, cli.quiet).await?;
        }

        Commands::Completions { .. } | Commands::FormatSchema => unreachable!("handled above"),
    }

    Ok(())
}
