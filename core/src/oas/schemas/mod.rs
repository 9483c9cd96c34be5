#![deny(missing_docs)]

//! # Schema Normalization
//!
//! Turns the schemas of a resolved document into a flat, uniquely named [`SchemaMap`].
//!
//! Defines logic to:
//! - Seed one entry per declared `components/schemas` entry, under its declared name.
//! - Name and normalize anonymous request/response body schemas.
//! - Flatten `allOf` into single objects and split `oneOf`/`anyOf` into option entries.
//! - Hoist nested structures into their own entries, bounded by nesting depth.
//! - Check the output invariants before handing the map out.

pub mod inline;
pub mod integrity;
pub mod models;
pub mod naming;
pub mod normalizer;

use crate::error::AppResult;
use crate::oas::schemas::inline::collect_inline_bodies;
use crate::oas::schemas::integrity::validate_schema_map;
use crate::oas::schemas::normalizer::Normalizer;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub use models::{
    Composition, CompositionKind, Constraints, NormalizedSchema, PropertySchema, PropertyType,
    SchemaKind, SchemaMap,
};
pub use normalizer::{NormalizerOptions, MAX_NESTING_DEPTH};

/// Extracts the schema map of a resolved document with default options.
///
/// Fails with an integrity error if the produced map would break any invariant.
pub fn extract(document: &Value) -> AppResult<SchemaMap> {
    extract_with_options(document, NormalizerOptions::default())
}

/// Extracts the schema map of a resolved document.
///
/// 1. Every declared component schema is normalized under its declared name.
/// 2. Every anonymous structured body schema gets a synthesized, collision-free name.
pub fn extract_with_options(document: &Value, options: NormalizerOptions) -> AppResult<SchemaMap> {
    let components = document
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object);

    let empty = Map::new();
    let mut normalizer = Normalizer::new(options, components.unwrap_or(&empty))?;

    if let Some(schemas) = components {
        for (name, schema) in schemas {
            debug!(schema = %name, "normalizing component schema");
            normalizer.normalize(schema, name.clone(), 0)?;
        }
    }

    for body in collect_inline_bodies(document, components) {
        let name = normalizer.allocate(&body.base_name);
        debug!(schema = %name, "normalizing inline body schema");
        normalizer.normalize(body.schema, name, 0)?;
    }

    let map = normalizer.finish();
    validate_schema_map(&map)?;
    info!(entries = map.len(), "schema extraction finished");
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::document::parse_document;
    use crate::oas::resolver::resolve;

    fn extract_yaml(yaml: &str) -> SchemaMap {
        let resolved = resolve(parse_document(yaml).unwrap(), "openapi.yaml");
        assert!(resolved.is_clean(), "{:?}", resolved.errors);
        extract(&resolved.document).unwrap()
    }

    #[test]
    fn test_inline_bodies_named_after_seeds() {
        let map = extract_yaml(
            r#"
openapi: 3.0.3
paths:
  /users:
    post:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name: {type: string}
      responses:
        '201':
          description: created
          content:
            application/json:
              schema: {$ref: '#/components/schemas/User'}
components:
  schemas:
    User:
      type: object
      properties:
        id: {type: integer, format: int64}
"#,
        );
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["User", "PostUsersRequestSchema"]);
    }

    #[test]
    fn test_inline_name_collision_is_suffixed() {
        let map = extract_yaml(
            r#"
openapi: 3.0.3
paths:
  /items:
    get:
      responses:
        '200':
          content:
            application/json:
              schema:
                type: array
                items: {type: string}
components:
  schemas:
    GetItems200Schema: {type: string}
"#,
        );
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["GetItems200Schema", "GetItems200Schema2"]);
    }

    #[test]
    fn test_document_without_components() {
        let map = extract_yaml("openapi: 3.0.3\npaths: {}\n");
        assert!(map.is_empty());
    }
}
