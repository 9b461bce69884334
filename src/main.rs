//! moments - publish chat messages as GitHub issues
//!
//! Telegram bot binary for the moments relay.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

/// Log directives used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "moments=info,moments_relay=info";

#[derive(Parser)]
#[command(name = "moments")]
#[command(about = "Relay Telegram messages into GitHub issues")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: cli::BotArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (default)
    Run,

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test the GitHub and Telegram credentials
    Test,
    /// Show authentication setup instructions
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env may carry RUST_LOG, so it is read before the subscriber exists
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("no .env file"),
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Run) => cli::run_bot(&cli.args).await?,
        Some(Commands::Auth { action }) => match action {
            AuthAction::Test => cli::run_auth_test(&cli.args).await?,
            AuthAction::Setup => cli::run_auth_setup(),
        },
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
