//! mnemo - Hybrid conversation memory CLI
//!
#![doc = "mnemo - Hybrid conversation memory CLI"]
#![doc = "Main entry point for the mnemo memory engine."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mnemo::cli::{Cli, Commands};
use mnemo::commands;
use mnemo::config::Config;
use mnemo::memory::metrics::init_metrics_exporter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Install the metrics exporter (no-op without the prometheus feature)
    init_metrics_exporter();

    // Execute command
    match cli.command {
        Commands::Save {
            session,
            message,
            response,
            tags,
        } => {
            commands::save::run_save(
                &config,
                session.as_deref(),
                &message,
                &response,
                tags.as_deref(),
            )
            .await?;
            Ok(())
        }
        Commands::History {
            session,
            limit,
            no_summary,
            json,
        } => {
            commands::history::run_history(&config, &session, limit, !no_summary, json)?;
            Ok(())
        }
        Commands::Stats { session, json } => {
            commands::stats::run_stats(&config, &session, json)?;
            Ok(())
        }
        Commands::Sessions => {
            commands::sessions::run_sessions(&config)?;
            Ok(())
        }
        Commands::Clear { session, yes } => {
            commands::clear::run_clear(&config, &session, yes)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "mnemo=debug" } else { "mnemo=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
