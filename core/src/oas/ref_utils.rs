#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Shared helpers for classifying `$ref` strings and walking JSON Pointers.
//!
//! These utilities never fetch external documents. A reference whose document part
//! names the base document itself is treated as local to its fragment.

use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::path::Path;
use url::Url;

/// The reference key recognised on mapping nodes.
pub const REF_KEY: &str = "$ref";

/// Pointer prefix of declared component schemas.
pub const COMPONENT_SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// Coarse classification of a reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Fragment-only reference (`#/...`).
    Local,
    /// Relative file reference (`other.yaml#/...`).
    Relative,
    /// Absolute URL (`https://host/doc.yaml#/...`).
    Remote,
}

/// A `$ref` split into its document and fragment parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference<'a> {
    /// Classification of the document part.
    pub kind: ReferenceKind,
    /// Document part (empty for local references).
    pub document: &'a str,
    /// Fragment after `#`, if any.
    pub fragment: Option<&'a str>,
}

/// Splits a reference into document and fragment and classifies it.
pub fn parse_reference(ref_str: &str) -> ParsedReference<'_> {
    let (document, fragment) = match ref_str.split_once('#') {
        Some((doc, frag)) => (doc, Some(frag)),
        None => (ref_str, None),
    };

    let kind = if document.is_empty() {
        ReferenceKind::Local
    } else if Url::parse(document).is_ok() {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Relative
    };

    ParsedReference {
        kind,
        document,
        fragment,
    }
}

/// Normalizes a `$ref` to a local JSON Pointer (e.g. `#/components/...`) if it targets the
/// document identified by `base_path`.
///
/// Returns `None` if the reference is external.
pub fn normalize_ref_to_local(ref_str: &str, base_path: &str) -> Option<String> {
    let parsed = parse_reference(ref_str);
    match parsed.kind {
        ReferenceKind::Local => Some(format!("#{}", parsed.fragment.unwrap_or_default())),
        ReferenceKind::Relative | ReferenceKind::Remote => {
            if ref_doc_matches_base(parsed.document, base_path) {
                Some(format!("#{}", parsed.fragment.unwrap_or_default()))
            } else {
                None
            }
        }
    }
}

/// Describes where an external reference would point, relative to `base_path`.
pub fn describe_external_target(ref_str: &str, base_path: &str) -> String {
    let parsed = parse_reference(ref_str);
    match parsed.kind {
        ReferenceKind::Remote | ReferenceKind::Local => ref_str.to_string(),
        ReferenceKind::Relative => {
            let dir = Path::new(base_path).parent().unwrap_or(Path::new(""));
            let joined = dir.join(parsed.document);
            match parsed.fragment {
                Some(frag) => format!("{}#{}", joined.display(), frag),
                None => joined.display().to_string(),
            }
        }
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Encodes a raw key as a JSON Pointer segment.
pub fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Splits a local pointer (`#/a/b`) into decoded segments. `#` yields no segments.
pub fn pointer_segments(pointer: &str) -> Vec<String> {
    let body = pointer.trim_start_matches('#');
    if body.is_empty() {
        return Vec::new();
    }
    body.trim_start_matches('/')
        .split('/')
        .map(decode_pointer_segment)
        .collect()
}

/// Renders decoded segments back into a `#/...` pointer.
pub fn pointer_from_segments(segments: &[String]) -> String {
    let mut out = String::from("#");
    for segment in segments {
        out.push('/');
        out.push_str(&encode_pointer_segment(segment));
    }
    out
}

/// Walks `root` along decoded pointer segments.
pub fn lookup_pointer<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Returns the string value of the node's reference key, if it is a reference node.
pub fn reference_of(node: &Value) -> Option<&str> {
    node.as_object()?.get(REF_KEY)?.as_str()
}

/// Extracts the component name from `#/components/schemas/{name}`.
pub fn component_schema_name(pointer: &str) -> Option<String> {
    let rest = pointer.strip_prefix(COMPONENT_SCHEMAS_PREFIX)?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(decode_pointer_segment(rest))
}

fn ref_doc_matches_base(ref_doc: &str, base_path: &str) -> bool {
    if base_path.is_empty() {
        return false;
    }
    if ref_doc == base_path {
        return true;
    }

    if let (Ok(ref_url), Ok(base_url)) = (Url::parse(ref_doc), Url::parse(base_path)) {
        return ref_url.scheme() == base_url.scheme()
            && ref_url.host() == base_url.host()
            && ref_url.port() == base_url.port()
            && ref_url.path() == base_url.path();
    }

    if ref_doc.contains("://") || base_path.contains("://") {
        return false;
    }

    // Relative reference naming the same file as the base document.
    let base = Path::new(base_path);
    let dir = base.parent().unwrap_or(Path::new(""));
    let candidate = dir.join(ref_doc.trim_start_matches("./"));
    candidate == base || Path::new(ref_doc) == base
}
