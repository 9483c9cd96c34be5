#![deny(missing_docs)]

//! # Inline Body Schemas
//!
//! Finds anonymous schemas in operation request and response bodies.
//!
//! After resolution every body schema is inline, so "named" is decided structurally:
//! a body schema equal to a declared component schema (treating leftover recursion
//! references as wildcards) is the component itself and is skipped.

use crate::oas::ref_utils::reference_of;
use crate::oas::schemas::naming::{inline_schema_name, BodySlot};
use crate::oas::schemas::normalizer::{composition, is_array_schema, is_object_schema};
use serde_json::{Map, Value};

/// HTTP methods of a Path Item, in the order they are scanned.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

const PREFERRED_MEDIA_TYPE: &str = "application/json";

/// An anonymous body schema together with its synthesized base name.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineBody<'a> {
    /// `{HttpMethod}{PascalCasePathSegments}{StatusCodeOrRequest}Schema`, before suffixing.
    pub base_name: String,
    /// The body schema.
    pub schema: &'a Value,
}

/// Collects anonymous structured body schemas, in path / method / slot order.
pub fn collect_inline_bodies<'a>(
    document: &'a Value,
    components: Option<&'a Map<String, Value>>,
) -> Vec<InlineBody<'a>> {
    let mut bodies = Vec::new();
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return bodies;
    };

    for (path, item) in paths {
        for method in HTTP_METHODS {
            let Some(operation) = item.get(method) else {
                continue;
            };

            if let Some(schema) = operation.get("requestBody").and_then(body_schema) {
                if is_anonymous(schema, components) {
                    bodies.push(InlineBody {
                        base_name: inline_schema_name(method, path, BodySlot::Request),
                        schema,
                    });
                }
            }

            let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
                continue;
            };
            for (status, response) in responses {
                if let Some(schema) = body_schema(response) {
                    if is_anonymous(schema, components) {
                        bodies.push(InlineBody {
                            base_name: inline_schema_name(method, path, BodySlot::Response(status)),
                            schema,
                        });
                    }
                }
            }
        }
    }
    bodies
}

/// Picks the schema of a request body or response, preferring `application/json`.
fn body_schema(body: &Value) -> Option<&Value> {
    let content = body.get("content")?.as_object()?;
    content
        .get(PREFERRED_MEDIA_TYPE)
        .and_then(|media| media.get("schema"))
        .or_else(|| content.values().find_map(|media| media.get("schema")))
}

fn is_anonymous(schema: &Value, components: Option<&Map<String, Value>>) -> bool {
    if reference_of(schema).is_some() || !is_structured(schema) {
        return false;
    }
    !components.is_some_and(|declared| {
        declared
            .values()
            .any(|component| matches_ignoring_refs(schema, component))
    })
}

/// Primitive bodies need no type of their own.
fn is_structured(schema: &Value) -> bool {
    is_object_schema(schema) || is_array_schema(schema) || composition(schema).is_some()
}

/// Structural equality where a reference node on either side matches anything.
fn matches_ignoring_refs(a: &Value, b: &Value) -> bool {
    if reference_of(a).is_some() || reference_of(b).is_some() {
        return true;
    }
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, value)| {
                    y.get(key)
                        .is_some_and(|other| matches_ignoring_refs(value, other))
                })
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|(left, right)| matches_ignoring_refs(left, right))
        }
        _ => a == b,
    }
}
