//! # Param Subcommand
//!
//! `swg param <parameter.yaml> --value <raw>` validates one parameter
//! value the way a request handler would. Non-body values are taken as
//! the literal wire strings (repeat `--value` for `multi` parameters);
//! body values are parsed as JSON or YAML.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use swg_core::{ParameterLocation, ParameterSpec};
use swg_schema::{load_document, parse_inline, ParameterValidator, ValidatorConfig};

use crate::report::Report;

/// Arguments for the param subcommand.
#[derive(Args, Debug)]
pub struct ParamArgs {
    /// Path to the parameter object (JSON or YAML).
    pub spec: PathBuf,

    /// Raw value as received. Omit to validate an absent parameter.
    #[arg(long = "value", conflicts_with = "value_file")]
    pub values: Vec<String>,

    /// Read a body value from a JSON or YAML file.
    #[arg(long)]
    pub value_file: Option<PathBuf>,

    /// Name to validate under. Defaults to the parameter's `name`.
    #[arg(long)]
    pub name: Option<String>,

    /// Swagger document (or bare definitions object) for `#/definitions` refs.
    #[arg(long)]
    pub definitions: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run the param subcommand.
pub fn run(args: &ParamArgs) -> anyhow::Result<Report> {
    let fragment = load_document(&args.spec)
        .with_context(|| format!("loading parameter from {}", args.spec.display()))?;
    let spec = ParameterSpec::from_value(fragment)?;
    let name = args.name.as_deref().unwrap_or(spec.name()).to_string();

    let value = raw_value(args, spec.location())?;

    let schema = crate::schema_validator(args.definitions.as_deref())?;
    let validator = ParameterValidator::new(Arc::new(schema), ValidatorConfig::from_env());
    let check = validator.check_parameter(&spec, &name, value.as_ref())?;

    tracing::info!(name = %name, location = %spec.location(), errors = check.errors.len(), "parameter checked");
    Ok(Report::new(check.value, check.errors, args.json))
}

fn raw_value(args: &ParamArgs, location: ParameterLocation) -> anyhow::Result<Option<Value>> {
    if let Some(path) = &args.value_file {
        return Ok(Some(load_document(path)?));
    }
    let value = match (location, args.values.as_slice()) {
        (_, []) => None,
        (ParameterLocation::Body, [text]) => Some(parse_inline(text)?),
        (_, [text]) => Some(Value::String(text.clone())),
        (_, many) => Some(Value::Array(many.iter().cloned().map(Value::String).collect())),
    };
    Ok(value)
}
