#![deny(missing_docs)]

//! # OASFlat CLI
//!
//! Command Line Interface for OpenAPI reference resolution and schema flattening.
//!
//! Supported Commands:
//! - `resolve`: Substitutes every in-document `$ref` and prints the resolved document.
//! - `flatten`: Resolves, then prints the flat, uniquely named schema map.
//! - `check`: Runs both phases and reports problems only.

use clap::{Parser, Subcommand};
use oasflat_core::AppResult;
use tracing_subscriber::EnvFilter;

mod check;
mod flatten;
mod io;
mod resolve;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI reference resolver and schema flattener")]
struct Cli {
    /// Log debug events (overrides RUST_LOG).
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve every in-document reference.
    Resolve(resolve::ResolveArgs),
    /// Resolve and flatten schemas into a name-keyed map.
    Flatten(flatten::FlattenArgs),
    /// Report resolution and normalization problems.
    Check(check::CheckArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Resolve(args) => resolve::execute(args)?,
        Commands::Flatten(args) => flatten::execute(args)?,
        Commands::Check(args) => check::execute(args)?,
    }

    Ok(())
}
