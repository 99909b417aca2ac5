// Data-type schema as served by `GET /api/v1/data-types/{name}/schema`
//
// The hub ships a JSON-Schema-like shape that the client only inspects
// shallowly: a required-fields list plus per-property type and maxLength
// rules. Anything deeper is ignored and left to server-side validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property types the local validator understands.
///
/// `Other` captures any JSON Schema type the client does not check
/// locally (object, null, vendor extensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Array,
    Boolean,
    #[serde(other)]
    Other,
}

/// Per-field rules inside `schema.properties`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyType>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// The JSON-Schema-like body of a data-type schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaBody {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// Full schema record for one data type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTypeSchema {
    pub data_type: String,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub schema: Option<SchemaBody>,
}
