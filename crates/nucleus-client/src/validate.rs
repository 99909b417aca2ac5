// Local payload validation
//
// Advisory checks against a cached data-type schema: required fields,
// shallow type rules, maxLength for strings. Validation never blocks a
// send; callers log the error map and submit anyway so server-side
// validation stays authoritative.

use nucleus_contracts::{DataTypeSchema, PropertyType};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Synthetic error key meaning "schema unknown, cannot validate locally"
pub const SCHEMA_UNKNOWN_KEY: &str = "_schema";

/// Field name -> error message; empty means valid
pub type ValidationErrors = BTreeMap<String, String>;

/// The advisory result when no schema is available
pub fn schema_unknown() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.insert(
        SCHEMA_UNKNOWN_KEY.to_string(),
        "Schema not found for data type".to_string(),
    );
    errors
}

/// Validate a data mapping against a data-type schema.
///
/// Checks, in order: every name in `required_fields` is a present key;
/// every name in `schema.required` is a present key; each present,
/// non-null value matches its declared property type. Properties without
/// a declared type (or with a type the client does not understand) are
/// not checked.
pub fn validate_against(schema: &DataTypeSchema, data: &Map<String, Value>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for field in &schema.required_fields {
        if !data.contains_key(field) {
            errors.insert(field.clone(), format!("The {field} field is required."));
        }
    }

    let Some(body) = &schema.schema else {
        return errors;
    };

    for field in &body.required {
        if !data.contains_key(field) {
            errors
                .entry(field.clone())
                .or_insert_with(|| format!("The {field} field is required."));
        }
    }

    for (field, spec) in &body.properties {
        let Some(value) = data.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let Some(kind) = spec.kind else {
            continue;
        };

        match kind {
            PropertyType::String => match value.as_str() {
                None => {
                    errors
                        .entry(field.clone())
                        .or_insert_with(|| format!("The {field} field must be a string."));
                }
                Some(s) => {
                    if let Some(max) = spec.max_length {
                        if s.chars().count() > max {
                            errors.entry(field.clone()).or_insert_with(|| {
                                format!(
                                    "The {field} field must not be greater than {max} characters."
                                )
                            });
                        }
                    }
                }
            },
            PropertyType::Integer | PropertyType::Number => {
                if !value.is_number() {
                    errors
                        .entry(field.clone())
                        .or_insert_with(|| format!("The {field} field must be a number."));
                }
            }
            PropertyType::Array => {
                if !value.is_array() {
                    errors
                        .entry(field.clone())
                        .or_insert_with(|| format!("The {field} field must be an array."));
                }
            }
            PropertyType::Boolean => {
                if !value.is_boolean() {
                    errors
                        .entry(field.clone())
                        .or_insert_with(|| format!("The {field} field must be a boolean."));
                }
            }
            PropertyType::Other => {}
        }
    }

    errors
}
