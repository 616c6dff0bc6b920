//! # swg-schema — Swagger 2.0 Validation Engine
//!
//! Validates request and response data against Swagger 2.0 parameter and
//! schema specifications, delegating the JSON Schema algorithm itself to
//! the `jsonschema` crate.
//!
//! ## Components (leaf first)
//!
//! - [`formats`]: [`FormatRegistry`] with the Swagger formats (`byte`,
//!   `date`, `double`, `float`, `int32`, `int64`).
//! - [`collection`]: [`coerce_by_collection_format`], turning
//!   `"a,b,c"`-style wire values into sequences.
//! - [`generic`]: [`GenericValidator`], the Draft 4 adapter over
//!   `jsonschema`.
//! - [`write`]: [`SchemaValidator`], write-mode validation: read-only
//!   handling in input mode, per-element array coercion, `type: file`.
//! - [`parameter`]: [`ParameterValidator`], the per-parameter entry
//!   point.
//! - [`config`]: [`ValidatorConfig`] and JSON/YAML document loading.
//!
//! ## Crate Policy
//!
//! - Depends only on `swg-core` internally.
//! - Pure: a validation call is a function of (schema, data, mode). The
//!   format registry and validator options are built once and shared
//!   read-only; nothing is cached or mutated across calls.
//! - No network access. Remote `$ref`s resolve only against documents
//!   registered up front.
//! - Invalid data is reported as a `Vec<ValidationError>`; `Err` is kept
//!   for unusable schemas and unreadable documents.

pub mod collection;
pub mod config;
pub mod formats;
pub mod generic;
pub mod parameter;
pub mod write;

pub use collection::{coerce_by_collection_format, CoercionError, CollectionFormat};
pub use config::{load_document, parse_inline, ConfigError, ValidatorConfig};
pub use formats::{FormatPredicate, FormatRegistry};
pub use generic::{GenericValidator, SchemaError};
pub use parameter::{ParameterCheck, ParameterValidator};
pub use write::{Outcome, SchemaValidator, ValidationMode};
