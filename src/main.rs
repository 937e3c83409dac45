//! chat-probe - manual backend probes for the chat app
//!
//! Writes test messages through the Firestore REST API and fires push
//! notifications through FCM or OneSignal, printing each step's result.

mod api;
mod auth;
mod config;
mod error;
mod models;
mod probe;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ProbeClient;
use crate::config::Config;
use crate::probe::message::PushVia;
use crate::probe::ProbeReport;

#[derive(Parser)]
#[command(name = "chat-probe")]
#[command(about = "Probe the chat backend: Firestore writes and push notifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the per-user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Exit non-zero when a probe step fails
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an FCM push to the recipient's device
    Fcm {
        /// Notification body
        #[arg(short, long, default_value = probe::fcm::DEFAULT_BODY)]
        body: String,
    },

    /// Write a chat message as the sender and notify the recipient
    Message {
        /// Message text
        #[arg(long, default_value = probe::message::DEFAULT_CONTENT)]
        content: String,

        /// Push provider for the notification
        #[arg(short, long, value_enum, default_value = "onesignal")]
        push: PushVia,
    },

    /// Look up the recipient's FCM token
    Token,

    /// Look up the recipient's OneSignal player ID
    Player,

    /// Store an FCM OAuth2 access token
    Login {
        /// Access token (e.g. from `gcloud auth print-access-token`)
        #[arg(long)]
        fcm_token: String,

        /// Token lifetime in seconds
        #[arg(long)]
        expires_in: Option<u64>,
    },

    /// Clear the stored FCM access token
    Logout,

    /// Show the loaded configuration
    Status,

    /// Write a config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = Config::resolve_path(cli.config)?;
    tracing::debug!("Using config {}", config_path.display());

    match cli.command {
        Commands::Login {
            fcm_token,
            expires_in,
        } => {
            auth::login(&config_path, &fcm_token, expires_in)?;
        }
        Commands::Logout => {
            auth::logout(&config_path)?;
        }
        Commands::Status => {
            auth::status(&config_path)?;
        }
        Commands::Init { force } => {
            config::init(&config_path, force)?;
        }
        Commands::Token => {
            let client = client(&config_path)?;
            let recipient = client.config().recipient_id.clone();
            let token = api::firestore::fetch_fcm_token(&client, &recipient)
                .await
                .context("FCM token lookup failed")?;
            println!("{}", token);
        }
        Commands::Player => {
            let client = client(&config_path)?;
            let recipient = client.config().recipient_id.clone();
            let player = api::onesignal::find_player(&client, &recipient)
                .await
                .context("OneSignal player lookup failed")?;
            println!("{}", player);
        }
        Commands::Fcm { body } => {
            let client = client(&config_path)?;
            probe::fcm::preflight(client.config())?;
            let report = probe::fcm::run(&client, &body).await;
            finish(report, cli.strict)?;
        }
        Commands::Message { content, push } => {
            let client = client(&config_path)?;
            probe::message::preflight(client.config(), push)?;
            tracing::info!("Sending probe message (push: {:?})...", push);
            let report = probe::message::run(&client, &content, push, chrono::Utc::now()).await;
            finish(report, cli.strict)?;
        }
    }

    Ok(())
}

fn client(config_path: &std::path::Path) -> Result<ProbeClient> {
    let config = Config::load_from(config_path)?;
    ProbeClient::new(config).context("Failed to build HTTP client")
}

/// Probe failures are printed as they happen; only `--strict` turns them
/// into a non-zero exit.
fn finish(report: ProbeReport, strict: bool) -> Result<()> {
    let failed: Vec<String> = report.failed().map(|s| s.to_string()).collect();
    if !failed.is_empty() {
        tracing::debug!("Failed steps: {}", failed.join(", "));
    }
    if strict && !report.succeeded() {
        anyhow::bail!("probe did not complete successfully");
    }
    Ok(())
}
