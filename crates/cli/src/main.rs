//! `voicedesk`: drive a call panel from the terminal

mod config;
mod render;
mod repl;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use voicedesk_client_core::sdk::mock::MockSdk;
use voicedesk_client_core::CallPanelBuilder;

use crate::config::CliConfig;
use crate::repl::Repl;

#[derive(Parser)]
#[command(name = "voicedesk", version, about = "Voice call control panel")]
struct Cli {
    /// Configuration file (defaults to <config dir>/voicedesk/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `voicedesk_client_core=debug`
    #[arg(long, global = true, env = "VOICEDESK_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the panel interactively against the in-memory SDK
    Repl {
        /// Access token used by `init` when none is typed
        #[arg(long, env = "VOICEDESK_TOKEN")]
        token: Option<String>,

        /// Display name announced to remote parties
        #[arg(long)]
        display_name: Option<String>,

        /// Refuse to initialize when audio permission is denied
        #[arg(long)]
        require_audio_permission: bool,
    },
    /// Print an access token accepted by the in-memory SDK
    Token {
        /// Communication user id carried by the token
        #[arg(default_value = "8:acs:demo-user")]
        user_id: String,

        /// Lifetime of the token in minutes
        #[arg(long, default_value_t = 60)]
        ttl_minutes: i64,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Token for the in-memory SDK, valid for `ttl_minutes`.
fn demo_token(user_id: &str, ttl_minutes: i64) -> Result<String> {
    let ttl = chrono::Duration::try_minutes(ttl_minutes)
        .ok_or_else(|| anyhow!("--ttl-minutes {} is out of range", ttl_minutes))?;
    Ok(MockSdk::try_issue_token(user_id, ttl)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref().or(config.log_level.as_deref()));

    match cli.command {
        Commands::Repl {
            token,
            display_name,
            require_audio_permission,
        } => {
            let sdk = MockSdk::new();
            let mut builder = CallPanelBuilder::new().sdk(sdk.clone()).config(config.client);
            if let Some(name) = display_name {
                builder = builder.display_name(name);
            }
            if require_audio_permission {
                builder = builder.require_audio_permission(true);
            }
            let panel = builder.build()?;

            Repl::new(panel, sdk, token.or(config.token)).run().await
        }
        Commands::Token { user_id, ttl_minutes } => {
            println!("{}", demo_token(&user_id, ttl_minutes)?);
            Ok(())
        }
    }
}
