// HTTP transport for all hub traffic
//
// One request method covers every endpoint: auth header selection, the
// client-version header, JSON body or query-parameter placement, and the
// status-to-error mapping live here. Transport itself does not log;
// callers own the operation context (event type, target service, data
// type) and log at their level.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::TransportError;

/// Client version reported to the hub on every call
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) const API_KEY_HEADER: &str = "X-Brain-Key";
pub(crate) const SERVICE_SECRET_HEADER: &str = "X-Brain-Service-Secret";
pub(crate) const CLIENT_VERSION_HEADER: &str = "X-Brain-Client-Version";

/// Which credential a request carries.
///
/// Event, config, schema and capability calls use the API key; gateway
/// proxy calls use the service secret; the public version and schema
/// endpoints take no credential.
#[derive(Clone)]
pub enum Auth {
    ApiKey(String),
    ServiceSecret(String),
    None,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::ApiKey(_) => f.write_str("Auth::ApiKey([REDACTED])"),
            Auth::ServiceSecret(_) => f.write_str("Auth::ServiceSecret([REDACTED])"),
            Auth::None => f.write_str("Auth::None"),
        }
    }
}

/// Request body placement
pub enum Payload<'a> {
    None,
    /// JSON request body
    Json(&'a Value),
    /// Mapping serialized as query parameters (GET requests)
    Query(&'a Map<String, Value>),
}

/// Thin wrapper over a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Issue one HTTP exchange against the hub.
    ///
    /// Success is a status in [200, 300) with the body parsed as JSON; an
    /// empty 2xx body decodes to JSON null. Every failure mode maps to a
    /// `TransportError` variant.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        auth: &Auth,
        payload: Payload<'_>,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let mut request = self
            .http
            .request(method, url)
            .header(CLIENT_VERSION_HEADER, CLIENT_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(timeout);

        request = match auth {
            Auth::ApiKey(key) => request.header(API_KEY_HEADER, key),
            Auth::ServiceSecret(secret) => request.header(SERVICE_SECRET_HEADER, secret),
            Auth::None => request,
        };

        request = match payload {
            Payload::None => request,
            Payload::Json(body) => request.json(body),
            Payload::Query(params) => request.query(&query_pairs(params)),
        };

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Render a JSON mapping as query parameters.
///
/// Scalars are rendered plainly; arrays and objects fall back to compact
/// JSON text so no information is dropped.
pub(crate) fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}
