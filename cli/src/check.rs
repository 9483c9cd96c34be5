#![deny(missing_docs)]

//! # Check Command
//!
//! Runs both phases and reports every problem without writing any output.

use crate::io::InputArgs;
use oasflat_core::error::{AppError, AppResult};
use oasflat_core::{extract, resolve};

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub(crate) input: InputArgs,
}

/// Executes the check, failing if resolution or normalization reported anything.
pub fn execute(args: &CheckArgs) -> AppResult<()> {
    let raw = args.input.load()?;
    let resolution = resolve(raw, &args.input.base_path());

    for error in &resolution.errors {
        println!("{}", error);
    }

    // Normalize even on resolution errors, so integrity problems surface in the same run.
    let extracted = extract(&resolution.document);
    if let Err(error) = &extracted {
        println!("{}", error);
    }

    match (resolution.errors.len(), extracted) {
        (0, Ok(map)) => {
            println!(
                "OK: {} reference(s) resolved, {} schema(s)",
                resolution.resolved,
                map.len()
            );
            Ok(())
        }
        (0, Err(error)) => Err(error),
        (count, _) => Err(AppError::Resolution(format!(
            "{} unresolved reference(s)",
            count
        ))),
    }
}
