//! # Parameter Specifications
//!
//! A [`ParameterSpec`] is one entry of an operation's `parameters` list in
//! a Swagger 2.0 document. The document loader (outside this workspace)
//! resolves `$ref`s and hands over the parameter as a JSON object; this
//! type validates the two fields dispatch depends on (`name`, `in`) and
//! keeps the original fragment, because for non-body parameters the
//! fragment *is* the schema the value is validated against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpecError;
use crate::truthy::is_true;

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    /// `?name=value`
    Query,
    /// `/items/{name}`
    Path,
    /// `Name: value`
    Header,
    /// The request (or response) payload.
    Body,
    /// `application/x-www-form-urlencoded` or `multipart/form-data` field.
    FormData,
}

impl ParameterLocation {
    /// The `in` token as written in a Swagger document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Body => "body",
            Self::FormData => "formData",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Self::Query),
            "path" => Ok(Self::Path),
            "header" => Ok(Self::Header),
            "body" => Ok(Self::Body),
            "formData" => Ok(Self::FormData),
            other => Err(other.to_string()),
        }
    }
}

/// A declared operation parameter.
///
/// Construct with [`ParameterSpec::from_value`] or deserialize directly;
/// both reject fragments without a string `name` or a known `in`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct ParameterSpec {
    name: String,
    location: ParameterLocation,
    fragment: Value,
}

impl ParameterSpec {
    /// Build a specification from a resolved parameter object.
    pub fn from_value(fragment: Value) -> Result<Self, SpecError> {
        let obj = match &fragment {
            Value::Object(obj) => obj,
            other => return Err(SpecError::NotAnObject(json_type_name(other))),
        };

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or(SpecError::MissingName)?
            .to_string();

        let raw_in = obj
            .get("in")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::MissingLocation(name.clone()))?;

        let location = raw_in
            .parse::<ParameterLocation>()
            .map_err(|location| SpecError::UnknownLocation {
                name: name.clone(),
                location,
            })?;

        Ok(Self {
            name,
            location,
            fragment,
        })
    }

    /// Declared parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared `in`.
    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    /// The original parameter object.
    pub fn fragment(&self) -> &Value {
        &self.fragment
    }

    /// Declared `type`, `"object"` when absent.
    pub fn type_name(&self) -> &str {
        self.fragment
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("object")
    }

    /// Loose reading of `required`; absent is `false`.
    pub fn is_required(&self) -> bool {
        self.fragment.get("required").is_some_and(is_true)
    }

    /// Declared `collectionFormat` token, if any.
    pub fn collection_format(&self) -> Option<&str> {
        self.fragment.get("collectionFormat").and_then(Value::as_str)
    }

    /// Declared `items` fragment, if any.
    pub fn items(&self) -> Option<&Value> {
        self.fragment.get("items")
    }

    /// Declared `schema` (body parameters).
    pub fn schema(&self) -> Option<&Value> {
        self.fragment.get("schema").filter(|v| is_true(v))
    }

    /// The `x-json-schema` override, if present.
    pub fn json_schema_override(&self) -> Option<&Value> {
        self.fragment.get("x-json-schema").filter(|v| is_true(v))
    }

    /// Schema the value is validated against: the `x-json-schema`
    /// override, else `schema`, else the parameter object itself.
    pub fn effective_schema(&self) -> &Value {
        self.json_schema_override()
            .or_else(|| self.schema())
            .unwrap_or(&self.fragment)
    }
}

impl TryFrom<Value> for ParameterSpec {
    type Error = SpecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_query_parameter() {
        let p = ParameterSpec::from_value(json!({
            "name": "tags",
            "in": "query",
            "type": "array",
            "collectionFormat": "csv",
            "items": {"type": "string"}
        }))
        .unwrap();
        assert_eq!(p.name(), "tags");
        assert_eq!(p.location(), ParameterLocation::Query);
        assert_eq!(p.type_name(), "array");
        assert_eq!(p.collection_format(), Some("csv"));
        assert!(!p.is_required());
        assert_eq!(p.effective_schema(), p.fragment());
    }

    #[test]
    fn type_defaults_to_object() {
        let p = ParameterSpec::from_value(json!({"name": "x", "in": "header"})).unwrap();
        assert_eq!(p.type_name(), "object");
    }

    #[test]
    fn loose_required() {
        let yes = ParameterSpec::from_value(json!({"name": "a", "in": "path", "required": "yes"}))
            .unwrap();
        let no = ParameterSpec::from_value(json!({"name": "a", "in": "path", "required": "no"}))
            .unwrap();
        assert!(yes.is_required());
        assert!(!no.is_required());
    }

    #[test]
    fn body_uses_schema() {
        let p = ParameterSpec::from_value(json!({
            "name": "pet",
            "in": "body",
            "schema": {"type": "object"}
        }))
        .unwrap();
        assert_eq!(p.effective_schema(), &json!({"type": "object"}));
    }

    #[test]
    fn override_wins_over_schema() {
        let p = ParameterSpec::from_value(json!({
            "name": "pet",
            "in": "body",
            "schema": {"type": "object"},
            "x-json-schema": {"type": "array"}
        }))
        .unwrap();
        assert_eq!(p.effective_schema(), &json!({"type": "array"}));
    }

    #[test]
    fn form_data_location() {
        let p: ParameterSpec =
            serde_json::from_value(json!({"name": "f", "in": "formData", "type": "file"})).unwrap();
        assert_eq!(p.location(), ParameterLocation::FormData);
        assert_eq!(p.location().to_string(), "formData");
    }

    #[test]
    fn rejects_missing_name() {
        let err = ParameterSpec::from_value(json!({"in": "query"})).unwrap_err();
        assert_eq!(err, SpecError::MissingName);
    }

    #[test]
    fn rejects_unknown_location() {
        let err = ParameterSpec::from_value(json!({"name": "c", "in": "cookie"})).unwrap_err();
        assert!(matches!(err, SpecError::UnknownLocation { .. }));
    }

    #[test]
    fn rejects_non_object() {
        let err = ParameterSpec::from_value(json!(["name"])).unwrap_err();
        assert_eq!(err, SpecError::NotAnObject("array"));
    }
}
