//! Ronflex CLI - Evoked Response Analysis
//!
//! Command-line interface for the Ronflex sweep analysis pipeline.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ronflex::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Ronflex v{}", env!("CARGO_PKG_VERSION"));

    handle_command(cli.command)
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Analyse {
            path,
            output,
            config,
            on_error,
            format,
            plot,
            jobs,
        } => {
            if let Some(jobs) = jobs {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build_global()
                    .context("failed to configure worker threads")?;
            }
            let report =
                commands::analyse(&path, &output, config.as_deref(), on_error, &format, plot)
                    .with_context(|| format!("analysis of {} failed", path.display()))?;
            commands::check_policy(&report, on_error)?;
            Ok(())
        }
        Commands::Inspect { path, config } => commands::inspect(&path, config.as_deref())
            .with_context(|| format!("cannot inspect {}", path.display())),
        Commands::DefaultConfig => Ok(commands::default_config()?),
    }
}
