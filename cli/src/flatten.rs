#![deny(missing_docs)]

//! # Flatten Command
//!
//! Runs the full pipeline (resolve + normalize) and writes the schema map.

use crate::io::{InputArgs, OutputArgs};
use oasflat_core::error::AppResult;
use oasflat_core::{flatten_document, NormalizerOptions, PipelineOptions, MAX_NESTING_DEPTH};

/// Arguments for the flatten command.
#[derive(clap::Args, Debug, Clone)]
pub struct FlattenArgs {
    #[clap(flatten)]
    pub(crate) input: InputArgs,

    #[clap(flatten)]
    pub(crate) output: OutputArgs,

    /// Normalize even if some references could not be resolved.
    #[clap(long)]
    pub allow_unresolved: bool,

    /// Nesting depth past which nested structures stay inline.
    #[clap(long, default_value_t = MAX_NESTING_DEPTH)]
    pub max_depth: usize,
}

impl FlattenArgs {
    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            allow_unresolved: self.allow_unresolved,
            normalizer: NormalizerOptions {
                max_depth: self.max_depth,
            },
        }
    }
}

/// Executes the flattening.
pub fn execute(args: &FlattenArgs) -> AppResult<()> {
    let raw = args.input.load()?;
    let flattened = flatten_document(raw, &args.input.base_path(), args.options())?;

    eprintln!(
        "Resolved {} reference(s), extracted {} schema(s)",
        flattened.resolved,
        flattened.schemas.len()
    );
    for error in &flattened.errors {
        eprintln!("  {}", error);
    }

    args.output.write(&flattened.schemas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasflat_core::SchemaMap;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_flatten_to_yaml_round_trips() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("openapi.yaml");
        let output = dir.path().join("schemas.yaml");
        fs::write(
            &input,
            r#"
openapi: 3.0.3
paths:
  /things:
    get:
      responses:
        '200':
          content:
            application/json:
              schema:
                type: array
                items: {$ref: '#/components/schemas/Thing'}
components:
  schemas:
    Thing:
      type: object
      properties:
        kind:
          anyOf:
            - {type: string}
            - {type: integer}
"#,
        )
        .unwrap();

        let args = FlattenArgs {
            input: InputArgs {
                input,
                base_path: None,
            },
            output: OutputArgs {
                output: Some(output.clone()),
                format: None,
            },
            allow_unresolved: false,
            max_depth: MAX_NESTING_DEPTH,
        };
        execute(&args).unwrap();

        let value: serde_json::Value =
            serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let map = SchemaMap::from_json(value).unwrap();
        let names: Vec<&str> = map.names().collect();
        assert_eq!(
            names,
            vec![
                "Thing",
                "ThingKind",
                "ThingKindOption1",
                "ThingKindOption2",
                "GetThings200Schema",
                "GetThings200SchemaItem",
                "GetThings200SchemaItemKind",
                "GetThings200SchemaItemKindOption1",
                "GetThings200SchemaItemKindOption2",
            ]
        );
    }
}
