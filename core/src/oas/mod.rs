#![deny(missing_docs)]

//! # OpenAPI Processing Module
//!
//! - **document**: Parsing raw YAML/JSON text into a document tree.
//! - **ref_utils**: Reference classification and JSON Pointer helpers.
//! - **resolver**: Substitution of every `$ref` node by its target.
//! - **schemas**: Flattening resolved schemas into a uniquely named map.

pub mod document;
pub mod ref_utils;
pub mod resolver;
pub mod schemas;

pub use document::parse_document;
pub use resolver::{resolve, Resolution, ResolutionError, ResolutionErrorKind};
pub use schemas::{extract, extract_with_options, NormalizerOptions, SchemaMap};
