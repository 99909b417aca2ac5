// Error types for the Brain Nucleus client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures at the HTTP boundary.
///
/// Transport never propagates a panic or a raw reqwest error past its
/// boundary; every failure mode collapses into one of these variants.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The hub answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Connection-level failure (DNS, TLS, refused, reset)
    #[error("network failure: {0}")]
    Network(String),

    /// The per-request timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// A 2xx response whose body is not valid JSON for the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Errors surfaced by public client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Caller-supplied data was malformed before any network call
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The underlying HTTP exchange failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The hub config has no endpoint for the requested data type
    #[error("no endpoint registered for data type '{0}'")]
    EndpointNotFound(String),

    /// The client was built without a base URL or credentials
    #[error("client configuration missing: {0}")]
    ConfigurationMissing(String),
}

impl ClientError {
    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ClientError::InvalidInput(msg.into())
    }

    /// Create an endpoint-not-found error
    pub fn endpoint_not_found(data_type: impl Into<String>) -> Self {
        ClientError::EndpointNotFound(data_type.into())
    }

    /// Create a configuration-missing error
    pub fn configuration_missing(what: impl Into<String>) -> Self {
        ClientError::ConfigurationMissing(what.into())
    }

    /// Create a decode error for a response that parsed as JSON but not
    /// into the expected shape
    pub fn decode(msg: impl Into<String>) -> Self {
        ClientError::Transport(TransportError::Decode(msg.into()))
    }

    /// True when the failure was a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(TransportError::Timeout))
    }
}
