// Brain Nucleus CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: `heartbeat` always exits zero so a host scheduler
// never treats a hub outage as a task failure.
// Design Decision: Credentials come from BRAIN_* environment variables
// (optionally via .env), matching the library's from_env loader.

use clap::{Parser, Subcommand};
use nucleus_client::contracts::{EventOptions, Severity};
use nucleus_client::{capabilities, heartbeat, ClientConfig, EventClient, CLIENT_VERSION};

#[derive(Parser)]
#[command(name = "nucleus")]
#[command(about = "Brain Nucleus client - send events and heartbeats to the hub")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a heartbeat and sync custom events, then run the capability check
    Heartbeat {
        /// Force sync of custom events even if this configuration already synced
        #[arg(long)]
        sync_events: bool,

        /// Custom event description, repeatable (format: event.type=Description)
        #[arg(long = "event", value_name = "TYPE=DESCRIPTION")]
        events: Vec<String>,
    },

    /// Send a single event to the hub
    Send {
        /// Event type (e.g. "user.signup")
        event_type: String,

        /// Payload as a JSON object
        payload: String,

        /// Event severity
        #[arg(long, value_parser = ["debug", "info", "warning", "error", "critical"])]
        severity: Option<String>,

        /// Grouping fingerprint
        #[arg(long)]
        fingerprint: Option<String>,

        /// Human-readable message
        #[arg(long)]
        message: Option<String>,
    },

    /// Show the client version and check the hub for updates
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Heartbeat { sync_events, events } => run_heartbeat(sync_events, events).await,
        Commands::Send {
            event_type,
            payload,
            severity,
            fingerprint,
            message,
        } => run_send(event_type, payload, severity, fingerprint, message).await,
        Commands::Version => run_version().await,
    }
}

async fn run_heartbeat(sync_events: bool, events: Vec<String>) -> anyhow::Result<()> {
    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            // Warn and skip: a misconfigured host must not fail its scheduler
            tracing::warn!(error = %err, "Brain configuration missing, skipping heartbeat");
            return Ok(());
        }
    };
    for declaration in events {
        match declaration.split_once('=') {
            Some((event_type, description)) => {
                config = config.with_event(event_type.trim(), description.trim());
            }
            None => anyhow::bail!("invalid --event '{declaration}', expected TYPE=DESCRIPTION"),
        }
    }

    let client = EventClient::best_effort(&config);
    let report = heartbeat::run(&client, &config, sync_events).await;
    if report.heartbeat_sent {
        println!("heartbeat sent");
    } else {
        println!("heartbeat failed (see logs)");
    }
    if report.events_total > 0 {
        if report.sync_skipped {
            println!("custom events already synced (use --sync-events to force)");
        } else {
            println!(
                "custom events synced: {}/{}",
                report.events_synced, report.events_total
            );
        }
    }

    let check = capabilities::check_and_register(&client, &config).await;
    if !check.missing_required.is_empty() {
        println!("missing required capabilities: {}", check.missing_required.join(", "));
    }
    if check.registered > 0 {
        println!("capabilities registered: {}", check.registered);
    }

    Ok(())
}

async fn run_send(
    event_type: String,
    payload: String,
    severity: Option<String>,
    fingerprint: Option<String>,
    message: Option<String>,
) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    let client = EventClient::new(&config)?;

    let payload: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&payload)
        .map_err(|e| anyhow::anyhow!("payload must be a JSON object: {e}"))?;

    let mut options = EventOptions::new();
    if let Some(severity) = severity {
        let severity: Severity = serde_json::from_value(serde_json::Value::String(severity))?;
        options = options.severity(severity);
    }
    if let Some(fingerprint) = fingerprint {
        options = options.fingerprint(fingerprint);
    }
    if let Some(message) = message {
        options = options.message(message);
    }

    let ack = client.send(&event_type, payload, Some(options)).await?;
    println!("event accepted: id={} status={}", ack.id, ack.status);
    Ok(())
}

async fn run_version() -> anyhow::Result<()> {
    println!("client version: {CLIENT_VERSION}");

    match ClientConfig::from_env() {
        Ok(config) => {
            let client = EventClient::new(&config)?;
            match client.check_version().await {
                Ok(info) => {
                    println!("latest version: {}", info.latest_version);
                    if info.update_required {
                        println!("update required");
                    }
                }
                Err(err) => println!("version check failed: {err}"),
            }
        }
        Err(_) => println!("hub not configured, skipping remote version check"),
    }
    Ok(())
}
