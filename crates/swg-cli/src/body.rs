//! # Body Subcommand
//!
//! `swg body <schema.yaml> <data.json>` validates a whole document in
//! input mode (request bodies) or, with `--output`, output mode
//! (response bodies).

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use swg_schema::{load_document, ValidationMode};

use crate::report::Report;

/// Arguments for the body subcommand.
#[derive(Args, Debug)]
pub struct BodyArgs {
    /// Path to the schema (JSON or YAML).
    pub schema: PathBuf,

    /// Path to the document to validate (JSON or YAML).
    pub data: PathBuf,

    /// Validate as a response body: read-only properties are allowed.
    #[arg(long)]
    pub output: bool,

    /// Swagger document (or bare definitions object) for `#/definitions` refs.
    #[arg(long)]
    pub definitions: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run the body subcommand.
pub fn run(args: &BodyArgs) -> anyhow::Result<Report> {
    let schema = load_document(&args.schema)
        .with_context(|| format!("loading schema from {}", args.schema.display()))?;
    let data = load_document(&args.data)
        .with_context(|| format!("loading data from {}", args.data.display()))?;

    let mode = if args.output {
        ValidationMode::Output
    } else {
        ValidationMode::Input
    };
    let validator = crate::schema_validator(args.definitions.as_deref())?;
    let outcome = validator.check(&data, &schema, mode)?;

    tracing::info!(?mode, errors = outcome.errors.len(), "body checked");
    Ok(Report::new(Some(outcome.data), outcome.errors, args.json))
}
