// Heartbeat and custom event sync
//
// Designed to run from a host scheduler (cron, a task runner, the CLI).
// Nothing here returns an error: a transient hub outage must never break
// the scheduled task, so failures are logged and summarized in the
// report instead.

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::events::EventClient;
use crate::transport::CLIENT_VERSION;

/// Event type used for heartbeat pings
pub const HEARTBEAT_EVENT: &str = "health.ping";

const EVENT_SYNC_TTL: Duration = Duration::from_secs(24 * 3600);

/// Outcome summary of one heartbeat run
#[derive(Debug, Clone, Default)]
pub struct HeartbeatReport {
    pub heartbeat_sent: bool,
    /// Custom events declared in configuration
    pub events_total: usize,
    /// Custom events accepted by the hub in this run
    pub events_synced: usize,
    /// True when the sync was skipped because this config hash already ran
    pub sync_skipped: bool,
}

/// Send a heartbeat and sync custom event descriptions.
///
/// The sync runs at most once per configuration hash within 24 hours;
/// `force_sync` bypasses the marker. Always returns a report, never an
/// error.
pub async fn run(client: &EventClient, config: &ClientConfig, force_sync: bool) -> HeartbeatReport {
    let mut report = HeartbeatReport::default();

    if !config.is_configured() {
        warn!("Brain configuration missing, skipping heartbeat");
        return report;
    }

    match client.send(HEARTBEAT_EVENT, heartbeat_payload(config), None).await {
        Ok(ack) => {
            info!(id = ack.id, "heartbeat sent");
            report.heartbeat_sent = true;
        }
        Err(_) => {
            // send already logged the failure with context
        }
    }

    sync_custom_events(client, config, force_sync, &mut report).await;
    report
}

fn heartbeat_payload(config: &ClientConfig) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("site".to_string(), json!(config.site_name));
    payload.insert("environment".to_string(), json!(config.environment));
    if let Some(url) = &config.site_url {
        payload.insert("url".to_string(), json!(url));
    }
    payload.insert(
        "metadata".to_string(),
        json!({
            "client_version": CLIENT_VERSION,
            "hostname": hostname(),
        }),
    );
    payload
}

async fn sync_custom_events(
    client: &EventClient,
    config: &ClientConfig,
    force_sync: bool,
    report: &mut HeartbeatReport,
) {
    if config.events.is_empty() {
        return;
    }
    report.events_total = config.events.len();

    let marker_key = format!("brain_events_synced_{}", config_hash(&config.events));
    let store = client.cache_store();

    if !force_sync && store.get(&marker_key).await.is_some() {
        debug!("custom events already synced for this configuration");
        report.sync_skipped = true;
        return;
    }

    for (event_type, description) in &config.events {
        if client.register_event(event_type, description).await.is_ok() {
            report.events_synced += 1;
        }
    }

    store.put(&marker_key, Value::Bool(true), EVENT_SYNC_TTL).await;
    info!(
        synced = report.events_synced,
        total = report.events_total,
        "custom events synced"
    );
}

fn config_hash(events: &BTreeMap<String, String>) -> String {
    let serialized = serde_json::to_vec(events).unwrap_or_default();
    hex::encode(Sha256::digest(serialized))
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}
