#![deny(missing_docs)]

//! # Input / Output
//!
//! Shared argument groups plus document loading and result writing for every command.

use oasflat_core::error::{AppError, AppResult};
use oasflat_core::parse_document;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialization format of command output.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Where the OpenAPI document comes from.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the OpenAPI document (YAML or JSON).
    pub input: PathBuf,

    /// Path identifying the document when classifying `$ref`s.
    /// Defaults to the input path.
    #[clap(long, env = "OASFLAT_BASE_PATH")]
    pub base_path: Option<String>,
}

impl InputArgs {
    /// The base path used for reference classification.
    pub fn base_path(&self) -> String {
        self.base_path
            .clone()
            .unwrap_or_else(|| self.input.to_string_lossy().into_owned())
    }

    /// Reads and parses the input document.
    pub fn load(&self) -> AppResult<Value> {
        if !self.input.exists() {
            return Err(AppError::General(format!(
                "Input file not found: {:?}",
                self.input
            )));
        }
        let content = fs::read_to_string(&self.input)
            .map_err(|e| AppError::General(format!("Failed to read input file: {}", e)))?;
        parse_document(&content)
    }
}

/// Where and how results are written.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file. Prints to stdout when omitted.
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Output format. Inferred from the output extension (.yaml/.yml) when omitted.
    #[clap(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl OutputArgs {
    /// The effective format: explicit flag, then output extension, then JSON.
    pub fn format(&self) -> OutputFormat {
        if let Some(format) = self.format {
            return format;
        }
        match self
            .output
            .as_deref()
            .and_then(Path::extension)
            .and_then(|e| e.to_str())
        {
            Some("yaml") | Some("yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }

    /// Serializes `value` and writes it to the output file or stdout.
    pub fn write<T: Serialize>(&self, value: &T) -> AppResult<()> {
        let rendered = render(value, self.format())?;

        if let Some(out_path) = &self.output {
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent).map_err(|e| {
                        AppError::General(format!("Failed to create output directory: {}", e))
                    })?;
                }
            }
            fs::write(out_path, rendered)
                .map_err(|e| AppError::General(format!("Failed to write output file: {}", e)))?;
            eprintln!("Output written to {:?}", out_path);
        } else {
            println!("{}", rendered);
        }
        Ok(())
    }
}

/// Renders `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| AppError::General(format!("YAML serialization failed: {}", e))),
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| AppError::General(format!("JSON serialization failed: {}", e))),
    }
}
