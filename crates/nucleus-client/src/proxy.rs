// Service gateway client
//
// Forwards calls to other registered services through the hub's proxy
// at `<base>/api/v1/proxy/<service>/<path>`, authenticated with the
// service secret. GET requests serialize the body mapping as query
// parameters; every other verb sends it as a JSON body.
//
// # Example
//
// ```ignore
// use nucleus_client::ServiceClient;
//
// let client = ServiceClient::with_credentials("https://brain.example.com", "brn_svc_xxx");
// let health = client.get("domain-monitor", "api/health", Default::default()).await?;
// ```

use reqwest::Method;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

use crate::config::{ClientConfig, DEFAULT_TIMEOUT};
use crate::error::{ClientError, Result};
use crate::transport::{Auth, Payload, Transport};

/// Client for proxying requests to other services through the hub
#[derive(Clone)]
pub struct ServiceClient {
    base_url: String,
    service_secret: String,
    transport: Transport,
    timeout: Duration,
}

impl ServiceClient {
    /// Build from configuration; requires the service secret
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let secret = config
            .service_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ClientError::configuration_missing("service secret (BRAIN_SERVICE_SECRET)")
            })?;
        if config.base_url.is_empty() {
            return Err(ClientError::configuration_missing("base URL (BRAIN_BASE_URL)"));
        }
        Ok(Self::with_credentials(&config.base_url, secret))
    }

    /// Build directly from a base URL and service secret
    pub fn with_credentials(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_secret: secret.into(),
            transport: Transport::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout applied to all subsequent calls
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    pub async fn get(
        &self,
        target_service: &str,
        path: &str,
        query: Map<String, Value>,
    ) -> Result<Value> {
        self.call(Method::GET, target_service, path, query).await
    }

    pub async fn post(
        &self,
        target_service: &str,
        path: &str,
        body: Map<String, Value>,
    ) -> Result<Value> {
        self.call(Method::POST, target_service, path, body).await
    }

    pub async fn put(
        &self,
        target_service: &str,
        path: &str,
        body: Map<String, Value>,
    ) -> Result<Value> {
        self.call(Method::PUT, target_service, path, body).await
    }

    pub async fn patch(
        &self,
        target_service: &str,
        path: &str,
        body: Map<String, Value>,
    ) -> Result<Value> {
        self.call(Method::PATCH, target_service, path, body).await
    }

    pub async fn delete(
        &self,
        target_service: &str,
        path: &str,
        body: Map<String, Value>,
    ) -> Result<Value> {
        self.call(Method::DELETE, target_service, path, body).await
    }

    /// Make a proxied request to another service through the hub
    pub async fn call(
        &self,
        method: Method,
        target_service: &str,
        path: &str,
        body: Map<String, Value>,
    ) -> Result<Value> {
        let url = format!(
            "{}/api/v1/proxy/{}/{}",
            self.base_url,
            target_service,
            path.trim_start_matches('/')
        );
        let auth = Auth::ServiceSecret(self.service_secret.clone());

        let result = if method == Method::GET {
            self.transport
                .request(method.clone(), &url, &auth, Payload::Query(&body), self.timeout)
                .await
        } else {
            let json_body = Value::Object(body);
            self.transport
                .request(
                    method.clone(),
                    &url,
                    &auth,
                    Payload::Json(&json_body),
                    self.timeout,
                )
                .await
        };

        result.map_err(|err| {
            warn!(
                target = target_service,
                path,
                method = %method,
                error = %err,
                "proxy request failed"
            );
            err.into()
        })
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("base_url", &self.base_url)
            .field("service_secret", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
