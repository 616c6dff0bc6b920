//! # Generic JSON Schema Validation
//!
//! Thin adapter over the `jsonschema` crate, the black-box "next layer"
//! that the Swagger-specific write-mode validator delegates to.
//!
//! ## Draft
//!
//! Swagger 2.0 schemas are a dialect of JSON Schema Draft 4
//! (`exclusiveMaximum: true`, `required` as a non-empty array), so every
//! schema is compiled as Draft 4 with format validation switched on and
//! the [`FormatRegistry`] installed.
//!
//! ## Schema Resolution
//!
//! Remote `$ref`s never touch the network. They resolve only against
//! documents registered by URI through [`GenericValidator::with_documents`];
//! anything else fails compilation with [`SchemaError::Compile`].
//!
//! ## Error Mapping
//!
//! `jsonschema` reports a missing property at the *parent* object. It is
//! re-pointed at the property itself (`/<parent>/<name>`, message
//! `Missing property.`) so that a missing parameter is reported at the
//! parameter's own path.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use swg_core::{join_pointer, ErrorKind, ValidationError};
use thiserror::Error;

use crate::formats::FormatRegistry;

/// The schema handed to the validator is itself unusable.
///
/// This is a specification defect, not a data defect: it is reported as
/// `Err` and should be treated as fatal at the integration boundary.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema failed to compile (invalid keyword value, unresolved `$ref`).
    #[error("schema compile error: {reason}")]
    Compile {
        /// Reason reported by the underlying validator.
        reason: String,
    },
}

/// Documents that remote `$ref`s may point at, keyed by absolute URI.
struct RegisteredDocuments(HashMap<String, Value>);

impl Retrieve for RegisteredDocuments {
    fn retrieve(&self, uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        match self.0.get(uri.as_str()) {
            Some(document) => Ok(document.clone()),
            None => Err(format!("unregistered document {}", uri.as_str()).into()),
        }
    }
}

/// Generic JSON Schema validator with the Swagger formats installed.
///
/// Built once; `Send + Sync`, so it can be shared across request
/// handlers behind an `Arc`.
#[derive(Debug)]
pub struct GenericValidator {
    options: ValidationOptions,
    registry: Arc<FormatRegistry>,
}

impl GenericValidator {
    /// Create a validator using `registry` for `format` checks.
    pub fn new(registry: Arc<FormatRegistry>) -> Self {
        Self::with_documents(registry, HashMap::new())
    }

    /// Create a validator that can also resolve `$ref`s into the given
    /// documents, keyed by absolute URI.
    pub fn with_documents(registry: Arc<FormatRegistry>, documents: HashMap<String, Value>) -> Self {
        let mut options = jsonschema::options();
        options
            .with_draft(Draft::Draft4)
            .should_validate_formats(true)
            .with_retriever(RegisteredDocuments(documents));
        registry.install(&mut options);
        Self { options, registry }
    }

    /// The format registry installed in this validator.
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] when the schema is not valid
    /// Draft 4 or references an unregistered document.
    pub fn compile(&self, schema: &Value) -> Result<Validator, SchemaError> {
        self.options.build(schema).map_err(|e| SchemaError::Compile {
            reason: e.to_string(),
        })
    }

    /// Validate `data` against `schema` and return every violation, in
    /// the order the underlying validator reports them.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] only when the schema cannot be compiled.
    /// Invalid data is reported in the `Ok` vector.
    pub fn validate(&self, data: &Value, schema: &Value) -> Result<Vec<ValidationError>, SchemaError> {
        let validator = self.compile(schema)?;
        let errors: Vec<ValidationError> = validator.iter_errors(data).map(to_validation_error).collect();
        Ok(errors)
    }
}

fn to_validation_error(err: jsonschema::ValidationError<'_>) -> ValidationError {
    let path = err.instance_path.as_str().to_string();
    match &err.kind {
        ValidationErrorKind::Required { property } => {
            let name = match property {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            ValidationError::missing_required(join_pointer(&path, &name))
        }
        ValidationErrorKind::Type { .. } => ValidationError::new(ErrorKind::Type, path, err.to_string()),
        ValidationErrorKind::Format { .. } => {
            ValidationError::new(ErrorKind::Format, path, err.to_string())
        }
        _ => ValidationError::new(ErrorKind::Schema, path, err.to_string()),
    }
}
