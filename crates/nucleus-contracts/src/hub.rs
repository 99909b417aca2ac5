// Hub-side catalog types
//
// `GET /api/v1/client/config` advertises which structured data types the
// hub accepts from this client and where to post them.

use serde::{Deserialize, Serialize};

/// One entry of the hub's data-type catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTypeDescriptor {
    pub name: String,
    /// Path to POST data of this type to, relative to the base URL
    pub endpoint: String,
    /// True when the hub considers this data type mandatory for the client
    #[serde(default)]
    pub required: bool,
}

/// Response of `GET /api/v1/client/config`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub data_types: Vec<DataTypeDescriptor>,
}

impl HubConfig {
    /// Resolve the POST endpoint for a data type, if the hub knows it
    pub fn endpoint_for(&self, data_type: &str) -> Option<&str> {
        self.data_types
            .iter()
            .find(|dt| dt.name == data_type)
            .map(|dt| dt.endpoint.as_str())
    }

    /// Data types the hub marks as mandatory for this client
    pub fn required_types(&self) -> impl Iterator<Item = &DataTypeDescriptor> {
        self.data_types.iter().filter(|dt| dt.required)
    }
}

/// Response of `GET /api/v1/client/version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub latest_version: String,
    pub current_version: String,
    pub update_required: bool,
}
