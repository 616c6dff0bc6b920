//! # Error Types
//!
//! Two families of errors live here and they are deliberately kept apart:
//!
//! - [`ValidationError`] describes a defect in the *data* being validated.
//!   Validation passes accumulate these into a `Vec`; they are values, not
//!   `Err` results.
//! - [`SpecError`] describes a defect in the *specification* handed to the
//!   validator (a parameter fragment without a name, an unknown `in`).
//!   These are programmer/integration errors and surface as `Err`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Classification of a single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required parameter or property was not supplied.
    MissingRequired,
    /// Input data supplied a property marked `readOnly`.
    ReadOnly,
    /// The value has the wrong JSON type.
    Type,
    /// The value failed a registered format predicate.
    Format,
    /// A collection-format token could not be read as the declared item type.
    Coercion,
    /// Any other JSON Schema keyword failure (enum, pattern, bounds, ...).
    Schema,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingRequired => "missing_required",
            Self::ReadOnly => "read_only",
            Self::Type => "type",
            Self::Format => "format",
            Self::Coercion => "coercion",
            Self::Schema => "schema",
        };
        f.write_str(s)
    }
}

/// A single validation failure: a JSON pointer into the validated data
/// plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// JSON pointer to the offending value (`""` is the document root).
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// Failure class.
    pub kind: ErrorKind,
}

impl ValidationError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// A required value is absent at `path`.
    pub fn missing_required(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingRequired, path, "Missing property.")
    }

    /// A read-only property was supplied at `path`.
    pub fn read_only(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReadOnly, path, "Read-only.")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// The parameter specification itself is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The parameter fragment is not a JSON object.
    #[error("parameter specification must be an object, got {0}")]
    NotAnObject(&'static str),

    /// The parameter fragment has no string `name`.
    #[error("parameter specification is missing a string 'name'")]
    MissingName,

    /// The parameter fragment has no string `in`.
    #[error("parameter '{0}' is missing a string 'in'")]
    MissingLocation(String),

    /// The `in` value is not one of query, path, header, body, formData.
    #[error("parameter '{name}' has unknown location '{location}'")]
    UnknownLocation {
        /// Parameter name.
        name: String,
        /// The rejected `in` value.
        location: String,
    },
}
