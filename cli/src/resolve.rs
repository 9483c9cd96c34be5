#![deny(missing_docs)]

//! # Resolve Command
//!
//! Substitutes every in-document `$ref` and writes the resolved document.

use crate::io::{InputArgs, OutputArgs};
use oasflat_core::error::AppResult;
use oasflat_core::resolve;

/// Arguments for the resolve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    #[clap(flatten)]
    pub(crate) input: InputArgs,

    #[clap(flatten)]
    pub(crate) output: OutputArgs,

    /// Write the document even if some references could not be resolved.
    #[clap(long)]
    pub allow_unresolved: bool,
}

/// Executes the resolution.
///
/// The summary and every resolution error go to stderr; the document goes to the output.
pub fn execute(args: &ResolveArgs) -> AppResult<()> {
    let raw = args.input.load()?;
    let resolution = resolve(raw, &args.input.base_path());

    eprintln!("Resolved {} reference(s)", resolution.resolved);
    for error in &resolution.errors {
        eprintln!("  {}", error);
    }

    let document = if args.allow_unresolved {
        resolution.document
    } else {
        resolution.into_document()?
    };
    args.output.write(&document)
}
