//! # Parameter Validator
//!
//! Entry point for one declared operation parameter. Given the
//! parameter's specification, its name and the raw value taken off the
//! wire (or `None` when the request did not carry it), the validator:
//!
//! 1. Short-circuits to "valid" when the value is absent and the
//!    parameter is not required.
//! 2. Builds a single-property wrapper schema,
//!    `{properties: {<name>: <effective>}, required: [<name>]}`, with
//!    `required` present only for required parameters.
//! 3. Dispatches on location:
//!    - `body` with an `x-json-schema` override: straight to the generic
//!      validator, with the attached `definitions` in scope;
//!    - `body` otherwise: write-mode validation in input mode;
//!    - every other location: collection-format and scalar coercion of
//!      the raw value, then write-mode validation in input mode. Absent
//!      values take the same path so missing-required detection is
//!      uniform.
//!
//! A missing required parameter is reported as `Missing property.` at
//! `/<name>`.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use swg_core::{join_pointer, ErrorKind, ParameterLocation, ParameterSpec, ValidationError};

use crate::collection::{coerce_by_collection_format, parse_number, CoercionError};
use crate::config::ValidatorConfig;
use crate::formats::FormatRegistry;
use crate::generic::{GenericValidator, SchemaError};
use crate::write::{SchemaValidator, ValidationMode};

/// Errors for one parameter plus the value as the engine coerced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCheck {
    /// The coerced value; `None` when the parameter was absent.
    pub value: Option<Value>,
    /// Violations in discovery order. Empty means valid.
    pub errors: Vec<ValidationError>,
}

impl ParameterCheck {
    /// Returns true if no violations were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn valid(value: Option<Value>) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }
}

/// Per-parameter validator. Cheap to clone; the schema validator is shared.
#[derive(Debug, Clone)]
pub struct ParameterValidator {
    schema: Arc<SchemaValidator>,
    config: ValidatorConfig,
}

impl ParameterValidator {
    /// Wrap an existing schema validator.
    pub fn new(schema: Arc<SchemaValidator>, config: ValidatorConfig) -> Self {
        Self { schema, config }
    }

    /// A validator with the standard Swagger formats and no registered
    /// documents.
    pub fn swagger(config: ValidatorConfig) -> Self {
        let generic = GenericValidator::new(Arc::new(FormatRegistry::swagger()));
        Self::new(Arc::new(SchemaValidator::new(generic)), config)
    }

    /// The shared write-mode validator.
    pub fn schema_validator(&self) -> &SchemaValidator {
        &self.schema
    }

    /// Active configuration.
    pub fn config(&self) -> ValidatorConfig {
        self.config
    }

    /// Validate one parameter value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] only when the parameter's schema cannot be
    /// compiled. Invalid values are reported in the `Ok` vector.
    pub fn validate_parameter(
        &self,
        spec: &ParameterSpec,
        name: &str,
        value: Option<&Value>,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        Ok(self.check_parameter(spec, name, value)?.errors)
    }

    /// Validate one parameter value and return the coerced value with the
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] only when the parameter's schema cannot be
    /// compiled.
    pub fn check_parameter(
        &self,
        spec: &ParameterSpec,
        name: &str,
        value: Option<&Value>,
    ) -> Result<ParameterCheck, SchemaError> {
        let required = spec.is_required();
        if self.config.debug {
            tracing::debug!(
                name = %name,
                location = %spec.location(),
                required,
                present = value.is_some(),
                "validating parameter"
            );
        }

        if value.is_none() && !required {
            return Ok(ParameterCheck::valid(None));
        }

        let wrapper = wrapper_schema(name, spec.effective_schema(), required);

        let check = match spec.location() {
            ParameterLocation::Body if spec.json_schema_override().is_some() => {
                let data = wrap_value(name, value.cloned());
                let errors = self.schema.validate_generic(&data, &wrapper)?;
                ParameterCheck {
                    value: value.cloned(),
                    errors,
                }
            }
            ParameterLocation::Body => self.check_wrapped(name, &wrapper, value.cloned())?,
            _ => {
                let value = match value {
                    Some(raw) => match self.coerce_raw(spec, raw) {
                        Ok(coerced) => Some(coerced),
                        Err(error) => {
                            return Ok(self.finish(
                                name,
                                ParameterCheck {
                                    value: Some(raw.clone()),
                                    errors: vec![ValidationError::new(
                                        ErrorKind::Coercion,
                                        join_pointer("", name),
                                        error.to_string(),
                                    )],
                                },
                            ));
                        }
                    },
                    None => None,
                };
                self.check_wrapped(name, &wrapper, value)?
            }
        };

        Ok(self.finish(name, check))
    }

    fn check_wrapped(
        &self,
        name: &str,
        wrapper: &Value,
        value: Option<Value>,
    ) -> Result<ParameterCheck, SchemaError> {
        let data = wrap_value(name, value);
        let outcome = self.schema.check(&data, wrapper, ValidationMode::Input)?;
        Ok(ParameterCheck {
            value: outcome.data.get(name).cloned(),
            errors: outcome.errors,
        })
    }

    /// Collection-format coercion for array parameters, then scalar
    /// coercion of the value or its items.
    fn coerce_raw(
        &self,
        spec: &ParameterSpec,
        raw: &Value,
    ) -> Result<Value, CoercionError> {
        if spec.type_name() == "array" {
            let mut items = coerce_by_collection_format(spec.fragment(), raw)?;
            if self.config.coerce_scalars {
                if let Some(item_type) = spec.items().and_then(|i| i.get("type")).and_then(Value::as_str) {
                    for item in &mut items {
                        if let Some(coerced) = coerce_scalar(item_type, item) {
                            *item = coerced;
                        }
                    }
                }
            }
            return Ok(Value::Array(items));
        }

        if self.config.coerce_scalars {
            if let Some(coerced) = coerce_scalar(spec.type_name(), raw) {
                return Ok(coerced);
            }
        }
        Ok(raw.clone())
    }

    fn finish(&self, name: &str, check: ParameterCheck) -> ParameterCheck {
        if self.config.debug {
            if check.is_valid() {
                tracing::debug!(name = %name, "parameter valid");
            } else {
                for error in &check.errors {
                    tracing::debug!(name = %name, path = %error.path, kind = %error.kind, "{}", error.message);
                }
            }
        }
        check
    }
}

/// `{properties: {name: effective}, required: [name]}`; `required` only
/// when the parameter is required.
fn wrapper_schema(name: &str, effective: &Value, required: bool) -> Value {
    let mut properties = Map::new();
    properties.insert(name.to_string(), effective.clone());

    let mut wrapper = Map::new();
    wrapper.insert("properties".to_string(), Value::Object(properties));
    if required {
        wrapper.insert("required".to_string(), json!([name]));
    }
    Value::Object(wrapper)
}

/// `{name: value}`, or `{}` for an absent value.
fn wrap_value(name: &str, value: Option<Value>) -> Value {
    let mut map = Map::new();
    if let Some(value) = value {
        map.insert(name.to_string(), value);
    }
    Value::Object(map)
}

/// Convert a string that cleanly reads as `type_name`. `None` leaves the
/// value untouched.
fn coerce_scalar(type_name: &str, value: &Value) -> Option<Value> {
    let Value::String(text) = value else {
        return None;
    };
    match type_name {
        "integer" => {
            if let Ok(i) = text.parse::<i64>() {
                Some(Value::from(i))
            } else {
                text.parse::<u64>().ok().map(Value::from)
            }
        }
        "number" => parse_number(text).map(Value::Number),
        "boolean" => match text.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}
