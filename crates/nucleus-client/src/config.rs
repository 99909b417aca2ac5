// Client configuration
//
// ClientConfig is host-framework-agnostic: construct it directly, with
// the builder-style `with_*` methods, or from BRAIN_* environment
// variables. Missing base URL or API key is only a hard error on the
// fail-fast construction path (`EventClient::new`); `best_effort` accepts
// an incomplete config and degrades to warn-and-skip.

use nucleus_contracts::CapabilityEntry;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default TTL for hub config and schema cache entries
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Brain Nucleus client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the hub, no trailing slash
    pub base_url: String,
    /// API key for event, config and capability calls
    pub api_key: String,
    /// Service secret for gateway proxy calls
    pub service_secret: Option<String>,
    /// Name this client reports in heartbeats
    pub site_name: String,
    /// Deployment environment reported in heartbeats
    pub environment: String,
    /// Public URL of the hosting site, reported in heartbeats
    pub site_url: Option<String>,
    /// TTL for cached hub config and schemas
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Heartbeat interval in minutes, for the host scheduler to consume
    pub heartbeat_interval_minutes: u32,
    /// Register the declared capabilities during the capability check
    pub auto_register: bool,
    /// Capabilities this client declares
    pub capabilities: Vec<CapabilityEntry>,
    /// Custom event descriptions synced to the hub (event type -> description)
    pub events: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            service_secret: None,
            site_name: "unknown".to_string(),
            environment: "production".to_string(),
            site_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_TIMEOUT,
            heartbeat_interval_minutes: 5,
            auto_register: true,
            capabilities: Vec::new(),
            events: BTreeMap::new(),
        }
    }

    /// Read configuration from BRAIN_* environment variables.
    ///
    /// BRAIN_BASE_URL and BRAIN_API_KEY are required; BRAIN_SERVICE_SECRET,
    /// BRAIN_SITE_NAME, BRAIN_ENVIRONMENT and BRAIN_SITE_URL are optional.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BRAIN_BASE_URL")
            .map_err(|_| ClientError::configuration_missing("BRAIN_BASE_URL not set"))?;
        let api_key = std::env::var("BRAIN_API_KEY")
            .map_err(|_| ClientError::configuration_missing("BRAIN_API_KEY not set"))?;

        let mut config = Self::new(base_url, api_key);
        if let Ok(secret) = std::env::var("BRAIN_SERVICE_SECRET") {
            config.service_secret = Some(secret);
        }
        if let Ok(site_name) = std::env::var("BRAIN_SITE_NAME") {
            config.site_name = site_name;
        }
        if let Ok(environment) = std::env::var("BRAIN_ENVIRONMENT") {
            config.environment = environment;
        }
        if let Ok(site_url) = std::env::var("BRAIN_SITE_URL") {
            config.site_url = Some(site_url);
        }
        Ok(config)
    }

    /// True when both the base URL and API key are present
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    pub fn with_service_secret(mut self, secret: impl Into<String>) -> Self {
        self.service_secret = Some(secret.into());
        self
    }

    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = name.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_heartbeat_interval(mut self, minutes: u32) -> Self {
        self.heartbeat_interval_minutes = minutes;
        self
    }

    pub fn with_auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    /// Declare a capability this client can produce
    pub fn with_capability(mut self, capability: CapabilityEntry) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Declare a custom event type with its description
    pub fn with_event(
        mut self,
        event_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.events.insert(event_type.into(), description.into());
        self
    }
}
