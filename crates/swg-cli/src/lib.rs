//! # swg-cli — Swagger Validator Command-Line Interface
//!
//! ## Subcommands
//!
//! - `param`: validate one wire-level parameter value (query, path,
//!   header, formData or body) against its parameter object
//! - `body`: validate a document against a schema in input or output mode
//!
//! Both print a [`report::Report`] (plain text, or JSON with `--json`) and
//! exit non-zero when the data is invalid.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `swg-schema`; no validation logic here.

pub mod body;
pub mod param;
pub mod report;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use swg_schema::{load_document, FormatRegistry, GenericValidator, SchemaValidator};

/// Build a write-mode validator with the Swagger formats, attaching the
/// `definitions` found in `definitions_file` when one is given.
///
/// The file may be a whole Swagger document (its top-level `definitions`
/// object is used) or a bare definitions object.
pub fn schema_validator(definitions_file: Option<&Path>) -> anyhow::Result<SchemaValidator> {
    let generic = GenericValidator::new(Arc::new(FormatRegistry::swagger()));
    let validator = SchemaValidator::new(generic);

    let Some(path) = definitions_file else {
        return Ok(validator);
    };
    let document = load_document(path)
        .with_context(|| format!("loading definitions from {}", path.display()))?;
    let definitions = match document.get("definitions") {
        Some(Value::Object(defs)) => Value::Object(defs.clone()),
        _ => document,
    };
    tracing::debug!(path = %path.display(), "attached definitions");
    Ok(validator.with_definitions(definitions))
}
