// Brain Nucleus client
//
// This crate is the client side of the Brain Nucleus event hub: it sends
// structured events, proxies calls to other registered services through
// the hub's gateway, discovers and caches data-type schemas, and keeps a
// durable registry of the capabilities this client has declared.
//
// Construct one client per process configuration and pass it around;
// there is no global instance. Every operation is a single authenticated
// HTTP exchange with an explicit timeout and no retry policy.

pub mod cache;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod events;
pub mod heartbeat;
pub mod proxy;
pub mod registry;
pub mod task;
pub mod transport;
pub mod validate;

pub use cache::{CacheStore, InMemoryCacheStore, SharedCache};
pub use capabilities::CapabilityCheckReport;
pub use config::ClientConfig;
pub use error::{ClientError, Result, TransportError};
pub use events::EventClient;
pub use heartbeat::HeartbeatReport;
pub use proxy::ServiceClient;
pub use registry::CapabilityRegistry;
pub use task::{TaskSubmitter, TokioSpawner};
pub use transport::CLIENT_VERSION;
pub use validate::{ValidationErrors, SCHEMA_UNKNOWN_KEY};

// Re-export the wire types and the HTTP method type for callers
pub use nucleus_contracts as contracts;
pub use reqwest::Method;
