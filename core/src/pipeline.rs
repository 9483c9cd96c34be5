//! # Pipeline
//!
//! Composes resolution and normalization, applying the caller-side policy on
//! resolution errors.

use crate::error::{AppError, AppResult};
use crate::oas::resolver::{resolve, ResolutionError};
use crate::oas::schemas::{extract_with_options, NormalizerOptions, SchemaMap};
use serde_json::Value;
use tracing::warn;

/// Options for [`flatten_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Normalize even if some references failed to resolve.
    pub allow_unresolved: bool,
    /// Normalizer tuning.
    pub normalizer: NormalizerOptions,
}

/// Output of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    /// The resolved document, for downstream extractors.
    pub document: Value,
    /// Number of substituted references.
    pub resolved: usize,
    /// Resolution errors that were tolerated.
    pub errors: Vec<ResolutionError>,
    /// The flattened schemas.
    pub schemas: SchemaMap,
}

/// Resolves `raw` and extracts its schema map.
///
/// Resolution errors abort the run unless `options.allow_unresolved` is set.
/// Integrity errors from the normalizer always abort.
pub fn flatten_document(
    raw: Value,
    base_path: &str,
    options: PipelineOptions,
) -> AppResult<Flattened> {
    let resolution = resolve(raw, base_path);
    let (document, resolved, errors) = if options.allow_unresolved {
        for error in &resolution.errors {
            warn!(%error, "continuing despite unresolved reference");
        }
        (resolution.document, resolution.resolved, resolution.errors)
    } else {
        let resolved = resolution.resolved;
        (resolution.into_document()?, resolved, Vec::new())
    };

    let schemas = extract_with_options(&document, options.normalizer)?;
    Ok(Flattened {
        document,
        resolved,
        errors,
        schemas,
    })
}

impl Flattened {
    /// Fails if any tolerated resolution error was recorded.
    pub fn ensure_clean(&self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Resolution(format!(
                "{} unresolved reference(s)",
                self.errors.len()
            )))
        }
    }
}
