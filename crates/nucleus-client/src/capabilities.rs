// Capability check and auto-registration
//
// The startup-time counterpart to the heartbeat: compare the hub's
// required data types against the local registry, warn about gaps, and
// register the configured capability list when auto-registration is on.
// Like the heartbeat this never returns an error; it must not abort the
// host application's startup.

use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::events::EventClient;

/// Outcome summary of one capability check
#[derive(Debug, Clone, Default)]
pub struct CapabilityCheckReport {
    /// Hub-required data types the registry lacks as `active`
    pub missing_required: Vec<String>,
    /// Capabilities the hub accepted during auto-registration
    pub registered: u32,
}

/// Check required capabilities against the local registry and
/// auto-register the configured list.
pub async fn check_and_register(
    client: &EventClient,
    config: &ClientConfig,
) -> CapabilityCheckReport {
    let mut report = CapabilityCheckReport::default();

    if !config.is_configured() {
        warn!("Brain configuration missing, skipping capability check");
        return report;
    }

    let hub_config = match client.get_config().await {
        Ok(hub_config) => hub_config,
        Err(_) => {
            // get_config already logged the failure
            warn!("hub config not available for capability check");
            return report;
        }
    };

    for data_type in hub_config.required_types() {
        if !client.registry().has_capability(&data_type.name).await {
            report.missing_required.push(data_type.name.clone());
        }
    }
    if !report.missing_required.is_empty() {
        warn!(missing = ?report.missing_required, "missing required capabilities");
    }

    if config.auto_register && !config.capabilities.is_empty() {
        match client.register_capabilities(config.capabilities.clone()).await {
            Ok(outcome) => {
                report.registered = outcome.registered;
                info!(registered = outcome.registered, "capabilities auto-registered");
            }
            Err(_) => {
                // register_capabilities already logged the failure
            }
        }
    }

    report
}
