//! # swg-core — Foundational Types for the Swagger Validator
//!
//! Leaf crate of the `swg` workspace. It defines the vocabulary shared by
//! the validation engine (`swg-schema`) and its callers:
//!
//! - [`ValidationError`] / [`ErrorKind`]: the `(path, message)` pairs a
//!   validation pass accumulates. An empty list means valid.
//! - [`pointer`]: JSON pointer construction for error paths.
//! - [`is_true`]: the loose Swagger truthiness rule used for `required`,
//!   `readOnly` and other boolean-ish document fields.
//! - [`ParameterSpec`] / [`ParameterLocation`]: a declared operation
//!   parameter, borrowed read-only from the (external) document model.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `swg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests; static regex patterns are
//!   the only `expect()` sites.
//! - Validation failures are data ([`ValidationError`]), never `Err`.
//!   `Err` is reserved for malformed specification input ([`SpecError`]).

pub mod error;
pub mod parameter;
pub mod pointer;
pub mod truthy;

// Re-export primary types for ergonomic imports.
pub use error::{ErrorKind, SpecError, ValidationError};
pub use parameter::{ParameterLocation, ParameterSpec};
pub use pointer::{escape_token, join_pointer};
pub use truthy::{is_true, is_true_opt, is_true_str};
