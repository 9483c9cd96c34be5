#![deny(missing_docs)]

//! # Schema Map Integrity
//!
//! Checks the output invariants of the normalizer. A failure here is a contract breach,
//! never a user error, so it is returned as a fatal [`IntegrityError`].

use crate::error::{AppError, AppResult, IntegrityError};
use crate::oas::ref_utils::REF_KEY;
use crate::oas::schemas::models::SchemaMap;
use serde_json::Value;
use std::collections::HashSet;

/// Validates every invariant of `map`:
/// - every entry has a non-empty name equal to its key, and names are unique;
/// - the serialized form carries no reference marker;
/// - every by-name reference points to an existing entry.
pub fn validate_schema_map(map: &SchemaMap) -> AppResult<()> {
    let mut seen = HashSet::new();
    for (key, schema) in map.entries() {
        if schema.name.is_empty() || key.is_empty() {
            return Err(IntegrityError::EmptyName.into());
        }
        if key != &schema.name {
            return Err(IntegrityError::KeyMismatch {
                key: key.clone(),
                name: schema.name.clone(),
            }
            .into());
        }
        if !seen.insert(schema.name.as_str()) {
            return Err(IntegrityError::DuplicateName {
                name: schema.name.clone(),
            }
            .into());
        }

        let serialized = serde_json::to_value(schema).map_err(|e| {
            AppError::General(format!("Failed to serialize schema '{}': {}", key, e))
        })?;
        if let Some(reference) = find_reference(&serialized) {
            return Err(IntegrityError::ResidualReference {
                name: key.clone(),
                reference,
            }
            .into());
        }

        for target in schema.referenced_names() {
            if !map.contains(target) {
                return Err(IntegrityError::DanglingName {
                    owner: key.clone(),
                    target: target.to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Returns the first reference marker found anywhere in `value`.
pub(crate) fn find_reference(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get(REF_KEY) {
                return Some(match reference {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            }
            map.values().find_map(find_reference)
        }
        Value::Array(items) => items.iter().find_map(find_reference),
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => None,
    }
}
