#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Replaces every `$ref` node in a raw document with the node it designates.
//!
//! The walk is generic over the tree shape: schemas, parameters, request bodies and
//! responses are all handled by the same code path. Targets are always looked up in
//! the original document, and references nested inside a target are resolved before
//! substitution so chains of any length collapse fully.
//!
//! Failures are collected rather than returned as `Err`: an API author wants every
//! broken reference in one pass, and only the caller knows whether they are fatal.

use crate::error::{AppError, AppResult};
use crate::oas::ref_utils::{
    describe_external_target, lookup_pointer, normalize_ref_to_local, pointer_from_segments,
    pointer_segments, reference_of,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Category of a resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionErrorKind {
    /// The pointer does not designate any node.
    #[display("missing")]
    Missing,
    /// The pointer is already being resolved further up the chain.
    #[display("circular")]
    Circular,
    /// The reference cannot be handled (external file, non-object root).
    #[display("invalid")]
    Invalid,
}

/// A single reference that could not be substituted.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("{kind} reference '{reference}' at {path}: {message}")]
pub struct ResolutionError {
    /// Failure category.
    pub kind: ResolutionErrorKind,
    /// The raw `$ref` string.
    pub reference: String,
    /// JSON Pointer, in original-document coordinates, of the offending node.
    pub path: String,
    /// Human readable explanation.
    pub message: String,
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The document with every resolvable reference substituted.
    pub document: Value,
    /// Number of reference nodes of the input that were substituted.
    ///
    /// References inside a target are expanded along with it but only the node that
    /// was actually rewritten in the output counts.
    pub resolved: usize,
    /// Every failure encountered, in discovery order.
    pub errors: Vec<ResolutionError>,
}

impl Resolution {
    /// True when no reference failed to resolve.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the resolved document, treating any recorded error as fatal.
    pub fn into_document(self) -> AppResult<Value> {
        if self.errors.is_empty() {
            return Ok(self.document);
        }
        let lines: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        Err(AppError::Resolution(format!(
            "{} unresolved reference(s):\n  {}",
            self.errors.len(),
            lines.join("\n  ")
        )))
    }
}

/// Resolves every in-document reference of `document`.
///
/// `base_path` identifies the document itself and is used only to classify references:
/// a reference whose document part names the base document is treated as local, every
/// other file or URL reference is reported as `invalid` and left in place.
///
/// A non-object root yields a single `invalid` error and an empty object document.
pub fn resolve(document: Value, base_path: &str) -> Resolution {
    if !document.is_object() {
        let error = ResolutionError {
            kind: ResolutionErrorKind::Invalid,
            reference: String::new(),
            path: "#".to_string(),
            message: format!("document root must be an object, found {}", type_label(&document)),
        };
        warn!(%error, "reference resolution skipped");
        return Resolution {
            document: Value::Object(Map::new()),
            resolved: 0,
            errors: vec![error],
        };
    }

    let mut working = document.clone();
    let mut resolver = Resolver {
        original: &document,
        base_path,
        resolved: 0,
        errors: Vec::new(),
        seen_errors: HashSet::new(),
        seen_cycles: HashSet::new(),
    };
    let mut location = Vec::new();
    let mut visiting = Vec::new();
    resolver.walk(&mut working, &mut location, &mut visiting);

    info!(
        resolved = resolver.resolved,
        errors = resolver.errors.len(),
        "reference resolution finished"
    );

    Resolution {
        document: working,
        resolved: resolver.resolved,
        errors: resolver.errors,
    }
}

/// Walk state that is shared across the whole pass.
///
/// The in-progress pointer stack (`visiting`) and the current location are threaded
/// through `walk` as parameters instead.
struct Resolver<'a> {
    original: &'a Value,
    base_path: &'a str,
    resolved: usize,
    errors: Vec<ResolutionError>,
    seen_errors: HashSet<(ResolutionErrorKind, String, String)>,
    seen_cycles: HashSet<BTreeSet<String>>,
}

impl Resolver<'_> {
    /// Walks `node`, whose original-document location is `location`.
    fn walk(&mut self, node: &mut Value, location: &mut Vec<String>, visiting: &mut Vec<String>) {
        if let Some(reference) = reference_of(node) {
            let reference = reference.to_string();
            if let Some(replacement) = self.resolve_reference(&reference, location, visiting) {
                *node = replacement;
            }
            return;
        }

        match node {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    location.push(key.clone());
                    self.walk(child, location, visiting);
                    location.pop();
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter_mut().enumerate() {
                    location.push(index.to_string());
                    self.walk(child, location, visiting);
                    location.pop();
                }
            }
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {}
        }
    }

    /// Produces the fully resolved replacement for a reference node, or `None` to leave
    /// the node untouched.
    fn resolve_reference(
        &mut self,
        reference: &str,
        location: &[String],
        visiting: &mut Vec<String>,
    ) -> Option<Value> {
        let path = pointer_from_segments(location);
        let in_output = visiting.is_empty();

        let Some(pointer) = normalize_ref_to_local(reference, self.base_path) else {
            let target = describe_external_target(reference, self.base_path);
            self.record(
                ResolutionErrorKind::Invalid,
                reference,
                path,
                format!("external reference to '{}' is not supported", target),
            );
            return None;
        };

        if let Some(start) = visiting.iter().position(|p| p == &pointer) {
            let cycle: BTreeSet<String> = visiting[start..].iter().cloned().collect();
            if self.seen_cycles.insert(cycle) {
                let chain = visiting[start..].join(" -> ");
                self.record(
                    ResolutionErrorKind::Circular,
                    reference,
                    path,
                    format!("circular reference: {} -> {}", chain, pointer),
                );
            }
            return None;
        }

        let segments = pointer_segments(&pointer);
        let Some(target) = lookup_pointer(self.original, &segments) else {
            self.record(
                ResolutionErrorKind::Missing,
                reference,
                path,
                format!("'{}' does not exist in the document", pointer),
            );
            return None;
        };

        let mut expanded = target.clone();
        let mut target_location = segments;
        visiting.push(pointer);
        self.walk(&mut expanded, &mut target_location, visiting);
        let pointer = visiting.pop().unwrap_or_default();

        // The target's own chain broke further down; keep the original node.
        if reference_of(&expanded).is_some() {
            return None;
        }

        if in_output {
            self.resolved += 1;
        }
        debug!(reference, target = %pointer, at = %path, "substituted reference");
        Some(expanded)
    }

    fn record(&mut self, kind: ResolutionErrorKind, reference: &str, path: String, message: String) {
        if !self
            .seen_errors
            .insert((kind, reference.to_string(), path.clone()))
        {
            return;
        }
        let error = ResolutionError {
            kind,
            reference: reference.to_string(),
            path,
            message,
        };
        warn!(%error, "reference not resolved");
        self.errors.push(error);
    }
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}
