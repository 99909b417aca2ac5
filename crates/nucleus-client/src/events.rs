// Event client
//
// The main entry point for talking to the hub: event dispatch, hub
// config and schema discovery (cached), capability registration and
// typed data submission. Three construction paths exist:
//
// - `new` fails fast when the base URL or API key is missing
// - `best_effort` always constructs; an unconfigured client warns and
//   skips every operation instead of breaking the host
// - `standalone` is the lightweight variant with a 5 second timeout for
//   callers without their own configuration layer
//
// # Example
//
// ```ignore
// use nucleus_client::{ClientConfig, EventClient};
// use serde_json::json;
//
// let client = EventClient::new(&ClientConfig::from_env()?)?;
// let mut payload = serde_json::Map::new();
// payload.insert("email".into(), json!("user@example.com"));
// let ack = client.send("user.signup", payload, None).await?;
// ```

use reqwest::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use nucleus_contracts::{
    CapabilityEntry, DataTypeSchema, EventAck, EventEnvelope, EventOptions, HubConfig,
    RegisterCapabilitiesRequest, RegistrationOutcome, VersionInfo,
};

use crate::cache::{CacheStore, InMemoryCacheStore, SharedCache};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::registry::CapabilityRegistry;
use crate::task::{TaskSubmitter, TokioSpawner};
use crate::transport::{Auth, Payload, Transport, CLIENT_VERSION};
use crate::validate::{schema_unknown, validate_against, ValidationErrors};

/// Request timeout for the standalone variant
pub const STANDALONE_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the hub's event, config, schema and capability endpoints
#[derive(Clone)]
pub struct EventClient {
    base_url: String,
    api_key: String,
    transport: Transport,
    cache: Arc<SharedCache>,
    registry: Arc<CapabilityRegistry>,
    submitter: Arc<dyn TaskSubmitter>,
    cache_ttl: Duration,
    timeout: Duration,
    configured: bool,
}

impl EventClient {
    /// Build a client from configuration, failing fast when the base URL
    /// or API key is missing.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(ClientError::configuration_missing(
                "base URL and API key are required (BRAIN_BASE_URL / BRAIN_API_KEY)",
            ));
        }
        Ok(Self::build(config))
    }

    /// Build a client that never fails construction.
    ///
    /// When the configuration is incomplete the client is constructed
    /// disabled: every operation logs a warning and returns
    /// `ConfigurationMissing` instead of reaching the network.
    pub fn best_effort(config: &ClientConfig) -> Self {
        if !config.is_configured() {
            warn!("Brain client not configured, operations will be skipped");
        }
        Self::build(config)
    }

    /// Lightweight variant for hosts without a configuration layer,
    /// capped at a 5 second request timeout.
    pub fn standalone(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let config = ClientConfig::new(base_url, api_key).with_request_timeout(STANDALONE_TIMEOUT);
        Self::new(&config)
    }

    fn build(config: &ClientConfig) -> Self {
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            transport: Transport::new(),
            cache: Arc::new(SharedCache::new(Arc::clone(&store))),
            registry: Arc::new(CapabilityRegistry::new(store)),
            submitter: Arc::new(TokioSpawner),
            cache_ttl: config.cache_ttl,
            timeout: config.request_timeout,
            configured: config.is_configured(),
        }
    }

    /// Replace the backing cache store (e.g. with a distributed one).
    /// The capability registry moves to the new store as well.
    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Arc::new(SharedCache::new(Arc::clone(&store)));
        self.registry = Arc::new(CapabilityRegistry::new(store));
        self
    }

    /// Replace the fire-and-forget runner used by `send_async`
    pub fn with_task_submitter(mut self, submitter: Arc<dyn TaskSubmitter>) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Client version reported to the hub
    pub fn version(&self) -> &'static str {
        CLIENT_VERSION
    }

    /// The durable capability registry backed by this client's cache store
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// The backing cache store
    pub fn cache_store(&self) -> Arc<dyn CacheStore> {
        self.cache.store()
    }

    fn auth(&self) -> Auth {
        Auth::ApiKey(self.api_key.clone())
    }

    fn config_cache_key(&self) -> String {
        format!("brain_config_{}", self.api_key)
    }

    fn ensure_configured(&self, operation: &str) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            warn!(operation, "Brain client not configured, skipping");
            Err(ClientError::configuration_missing(
                "base URL and API key are required",
            ))
        }
    }

    /// Send an event to the hub.
    ///
    /// The wire body contains `event_type` and `payload` plus only the
    /// optional fields actually supplied. A native `occurred_at`
    /// timestamp is normalized to RFC 3339; a preformatted string passes
    /// through unchanged. No retries: a single failed attempt is the
    /// result.
    pub async fn send(
        &self,
        event_type: &str,
        payload: Map<String, Value>,
        options: Option<EventOptions>,
    ) -> Result<EventAck> {
        self.ensure_configured("send")?;
        if event_type.trim().is_empty() {
            let err = ClientError::invalid_input("event_type must not be empty");
            error!(error = %err, "event send rejected");
            return Err(err);
        }

        let envelope =
            EventEnvelope::new(event_type, payload).with_options(options.unwrap_or_default());
        let body = serde_json::to_value(&envelope)
            .map_err(|e| ClientError::invalid_input(e.to_string()))?;
        let url = format!("{}/api/v1/events", self.base_url);

        match self
            .transport
            .request(Method::POST, &url, &self.auth(), Payload::Json(&body), self.timeout)
            .await
        {
            Ok(value) => serde_json::from_value(value).map_err(|e| ClientError::decode(e.to_string())),
            Err(err) => {
                error!(event_type, error = %err, "event send failed");
                Err(err.into())
            }
        }
    }

    /// Fire-and-forget variant of `send`.
    ///
    /// The send runs on the configured task submitter; the caller never
    /// observes success or failure. Failures are logged inside `send`.
    pub fn send_async(
        &self,
        event_type: impl Into<String>,
        payload: Map<String, Value>,
        options: Option<EventOptions>,
    ) {
        let client = self.clone();
        let event_type = event_type.into();
        self.submitter.submit(Box::pin(async move {
            let _ = client.send(&event_type, payload, options).await;
        }));
    }

    /// Check the hub for client version updates
    pub async fn check_version(&self) -> Result<VersionInfo> {
        self.ensure_configured("check_version")?;
        let url = format!("{}/api/v1/client/version", self.base_url);

        match self
            .transport
            .request(Method::GET, &url, &Auth::None, Payload::None, self.timeout)
            .await
        {
            Ok(value) => serde_json::from_value(value).map_err(|e| ClientError::decode(e.to_string())),
            Err(err) => {
                warn!(error = %err, "version check failed");
                Err(err.into())
            }
        }
    }

    /// Fetch the hub's data-type catalog, cached for the configured TTL.
    ///
    /// At most one upstream fetch happens per TTL window; concurrent
    /// misses coalesce to a single request. Failed fetches are not
    /// cached.
    pub async fn get_config(&self) -> Result<HubConfig> {
        self.ensure_configured("get_config")?;
        let key = self.config_cache_key();
        let url = format!("{}/api/v1/client/config", self.base_url);
        let auth = self.auth();

        let value = self
            .cache
            .remember(&key, self.cache_ttl, || async {
                self.transport
                    .request(Method::GET, &url, &auth, Payload::None, self.timeout)
                    .await
            })
            .await
            .map_err(|err| {
                warn!(error = %err, "hub config fetch failed");
                ClientError::from(err)
            })?;

        serde_json::from_value(value).map_err(|e| ClientError::decode(e.to_string()))
    }

    /// Fetch the JSON Schema for a data type, cached per type with the
    /// configured TTL.
    pub async fn get_schema(&self, data_type: &str) -> Result<DataTypeSchema> {
        self.ensure_configured("get_schema")?;
        let key = format!("brain_schema_{data_type}");
        let url = format!("{}/api/v1/data-types/{data_type}/schema", self.base_url);

        let value = self
            .cache
            .remember(&key, self.cache_ttl, || async {
                self.transport
                    .request(Method::GET, &url, &Auth::None, Payload::None, self.timeout)
                    .await
            })
            .await
            .map_err(|err| {
                warn!(data_type, error = %err, "schema fetch failed");
                ClientError::from(err)
            })?;

        serde_json::from_value(value).map_err(|e| ClientError::decode(e.to_string()))
    }

    /// Register this client's capabilities with the hub.
    ///
    /// On success the cached hub config is invalidated (capability state
    /// may have changed what the hub reports) and the returned results
    /// are merged into the local registry.
    pub async fn register_capabilities(
        &self,
        capabilities: Vec<CapabilityEntry>,
    ) -> Result<RegistrationOutcome> {
        self.ensure_configured("register_capabilities")?;
        let url = format!("{}/api/v1/client/capabilities", self.base_url);
        let body = serde_json::to_value(RegisterCapabilitiesRequest { capabilities })
            .map_err(|e| ClientError::invalid_input(e.to_string()))?;

        match self
            .transport
            .request(Method::POST, &url, &self.auth(), Payload::Json(&body), self.timeout)
            .await
        {
            Ok(value) => {
                self.cache.forget(&self.config_cache_key()).await;
                let outcome: RegistrationOutcome =
                    serde_json::from_value(value).map_err(|e| ClientError::decode(e.to_string()))?;
                self.registry.register(outcome.results.clone()).await;
                Ok(outcome)
            }
            Err(err) => {
                error!(error = %err, "capability registration failed");
                Err(err.into())
            }
        }
    }

    /// Register a custom event type with its description
    pub async fn register_event(&self, event_type: &str, description: &str) -> Result<Value> {
        self.ensure_configured("register_event")?;
        if event_type.trim().is_empty() {
            return Err(ClientError::invalid_input("event_type must not be empty"));
        }
        let url = format!("{}/api/v1/client/events/register", self.base_url);
        let body = json!({
            "event_type": event_type,
            "description": description,
        });

        match self
            .transport
            .request(Method::POST, &url, &self.auth(), Payload::Json(&body), self.timeout)
            .await
        {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(event_type, error = %err, "custom event registration failed");
                Err(err.into())
            }
        }
    }

    /// Validate a data mapping against the cached schema for a data type.
    ///
    /// An empty map means valid. When no schema is available the map
    /// holds the single `_schema` marker; this is advisory and never
    /// blocks a send.
    pub async fn validate(&self, data_type: &str, data: &Map<String, Value>) -> ValidationErrors {
        match self.get_schema(data_type).await {
            Ok(schema) => validate_against(&schema, data),
            Err(_) => schema_unknown(),
        }
    }

    /// Send typed data to the endpoint the hub registered for its type.
    ///
    /// Local validation runs first when a schema is available, but only
    /// logs: the data is sent regardless so server-side validation stays
    /// authoritative. Fails with `EndpointNotFound` when the hub config
    /// has no endpoint for the type.
    pub async fn send_data(&self, data_type: &str, data: Map<String, Value>) -> Result<Value> {
        self.ensure_configured("send_data")?;

        if let Ok(schema) = self.get_schema(data_type).await {
            let errors = validate_against(&schema, &data);
            if !errors.is_empty() {
                warn!(data_type, ?errors, "local validation failed, sending anyway");
            }
        }

        let config = self.get_config().await?;
        let endpoint = config.endpoint_for(data_type).ok_or_else(|| {
            error!(data_type, "no endpoint registered for data type");
            ClientError::endpoint_not_found(data_type)
        })?;

        let url = format!("{}{}", self.base_url, endpoint);
        let body = Value::Object(data);

        match self
            .transport
            .request(Method::POST, &url, &self.auth(), Payload::Json(&body), self.timeout)
            .await
        {
            Ok(value) => Ok(value),
            Err(err) => {
                error!(data_type, error = %err, "data send failed");
                Err(err.into())
            }
        }
    }
}

impl std::fmt::Debug for EventClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("configured", &self.configured)
            .finish()
    }
}
