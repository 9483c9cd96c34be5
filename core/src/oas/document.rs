#![deny(missing_docs)]

//! # OpenAPI Document Parsing
//!
//! Turns raw YAML or JSON text into the tagged document tree consumed by the resolver.

use crate::error::{AppError, AppResult};
use serde_json::Value;

/// Parses YAML or JSON text into a document tree.
///
/// YAML is a superset of JSON, so a single YAML parse accepts both formats.
/// Key order is preserved.
pub fn parse_document(content: &str) -> AppResult<Value> {
    serde_yaml::from_str(content)
        .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI document: {}", e)))
}

/// Returns the declared `openapi` version string, if any.
pub fn openapi_version(document: &Value) -> Option<&str> {
    document.get("openapi").and_then(Value::as_str)
}
