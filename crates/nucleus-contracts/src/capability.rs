// Capability types
//
// A capability declares that this client can produce a named structured
// data type. Entries are keyed by `data_type` and carry a lifecycle
// status; only `active` counts as a usable capability.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a declared capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityStatus {
    Pending,
    Ready,
    Active,
}

/// A single capability declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityEntry {
    /// Data type name, unique per client (e.g. "seo_snapshot")
    pub data_type: String,
    pub version: String,
    pub status: CapabilityStatus,
}

impl CapabilityEntry {
    pub fn new(data_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            version: version.into(),
            status: CapabilityStatus::Ready,
        }
    }

    pub fn with_status(mut self, status: CapabilityStatus) -> Self {
        self.status = status;
        self
    }
}

/// Body for `POST /api/v1/client/capabilities`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCapabilitiesRequest {
    pub capabilities: Vec<CapabilityEntry>,
}

/// Hub response to a capability registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    /// Number of capabilities the hub accepted
    pub registered: u32,
    /// Per-capability state as the hub now sees it
    #[serde(default)]
    pub results: Vec<CapabilityEntry>,
}
