//! Chatdrop - chat with an AI model about the files you drop in
//!
#![doc = "Chatdrop - file-aware chat CLI"]
#![doc = "Main entry point for the Chatdrop application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatdrop::cli::{Cli, Commands};
use chatdrop::commands;
use chatdrop::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path().display().to_string());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { files } => {
            tracing::info!("Starting interactive chat mode");
            if !files.is_empty() {
                tracing::debug!("Attaching {} file(s) before the first message", files.len());
            }
            commands::chat::run_chat(config, files).await?;
            Ok(())
        }
        Commands::Extract { files, json } => {
            tracing::info!("Starting extract command");
            commands::extract::run_extract(config, files, json).await?;
            Ok(())
        }
        Commands::Auth { key } => {
            tracing::info!("Starting authentication");
            commands::auth::run_auth(key).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so `extract --json` output stays parseable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chatdrop=debug"
    } else {
        "chatdrop=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
