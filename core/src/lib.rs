#![deny(missing_docs)]

//! # OASFlat Core
//!
//! Reference resolution and schema normalization for OpenAPI 3.0 documents.
//!
//! The pipeline is two pure, single-pass transformations:
//! raw document -> [`resolve`] -> resolved document -> [`extract`] -> [`SchemaMap`].

/// Shared error types.
pub mod error;

/// OpenAPI (OAS) document processing.
pub mod oas;

/// End-to-end pipeline composing both phases.
pub mod pipeline;

pub use error::{AppError, AppResult, IntegrityError};
pub use oas::schemas::{
    Composition, CompositionKind, Constraints, NormalizedSchema, PropertySchema, PropertyType,
    SchemaKind, MAX_NESTING_DEPTH,
};
pub use oas::{
    extract, extract_with_options, parse_document, resolve, NormalizerOptions, Resolution,
    ResolutionError, ResolutionErrorKind, SchemaMap,
};
pub use pipeline::{flatten_document, Flattened, PipelineOptions};
