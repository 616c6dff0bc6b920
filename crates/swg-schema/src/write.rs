//! # Write-Mode Schema Validation
//!
//! [`SchemaValidator`] layers the Swagger-specific behaviour on top of the
//! [`GenericValidator`]. It holds the generic validator and calls it after
//! two preparation steps:
//!
//! 1. **Schema preparation** (data independent). `type: file` fragments
//!    become the empty schema (only `readOnly` survives), Swagger's boolean `required` flag on
//!    parameter objects is dropped, and in [`ValidationMode::Input`] every
//!    property marked `readOnly` is removed from its object's `required`
//!    list.
//! 2. **Data walk** (schema directed, over a private copy of the data).
//!    Array elements whose `items` declare a `collectionFormat` are
//!    replaced by their coerced sequence; in input mode, read-only
//!    properties present in the data are reported; registered formats on
//!    numeric values are checked. The walk enters every `allOf` member and
//!    the `anyOf`/`oneOf` variants that describe the data.
//!
//! Errors from the walk come first, followed by the generic validator's
//! errors for the prepared data.
//!
//! The mode is an explicit argument threaded through every call. Nothing
//! about a call survives it.

use serde_json::{Map, Value};
use swg_core::{is_true, join_pointer, ErrorKind, ValidationError};

use crate::collection::coerce_by_collection_format;
use crate::formats::{scalar_text, FormatRegistry};
use crate::generic::{GenericValidator, SchemaError};

/// Maximum number of `$ref` hops followed while walking data.
const MAX_REF_HOPS: usize = 32;

/// Which side of the API the data is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Request data: read-only properties must not be supplied and are
    /// never required.
    Input,
    /// Response data: read-only properties are ordinary properties.
    Output,
}

/// Result of a validation pass: the data as the engine coerced it, plus
/// every violation found.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The validated data after collection-format coercion.
    pub data: Value,
    /// Violations in discovery order. Empty means valid.
    pub errors: Vec<ValidationError>,
}

impl Outcome {
    /// Returns true if no violations were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Swagger write-mode validator wrapping a [`GenericValidator`].
#[derive(Debug)]
pub struct SchemaValidator {
    generic: GenericValidator,
    /// Document-level `definitions`, attached to every schema so that
    /// `#/definitions/...` references resolve.
    definitions: Option<Value>,
}

impl SchemaValidator {
    /// Wrap `generic`.
    pub fn new(generic: GenericValidator) -> Self {
        Self {
            generic,
            definitions: None,
        }
    }

    /// Make a document's `definitions` object available to every schema
    /// validated here.
    pub fn with_definitions(mut self, definitions: Value) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// The wrapped generic validator.
    pub fn generic(&self) -> &GenericValidator {
        &self.generic
    }

    /// The installed format registry.
    pub fn registry(&self) -> &FormatRegistry {
        self.generic.registry()
    }

    /// Validate request data ([`ValidationMode::Input`]).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] only when the schema cannot be compiled.
    pub fn validate_input(&self, data: &Value, schema: &Value) -> Result<Vec<ValidationError>, SchemaError> {
        Ok(self.check(data, schema, ValidationMode::Input)?.errors)
    }

    /// Validate response data ([`ValidationMode::Output`]).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] only when the schema cannot be compiled.
    pub fn validate(&self, data: &Value, schema: &Value) -> Result<Vec<ValidationError>, SchemaError> {
        Ok(self.check(data, schema, ValidationMode::Output)?.errors)
    }

    /// Validate `data` against `schema` in `mode`, returning the coerced
    /// data alongside the violations.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] only when the schema cannot be compiled.
    pub fn check(&self, data: &Value, schema: &Value, mode: ValidationMode) -> Result<Outcome, SchemaError> {
        let prepared = prepare_schema(&self.attach_definitions(schema), mode);

        let mut data = data.clone();
        let mut walk = Walk {
            root: &prepared,
            registry: self.registry(),
            mode,
            errors: Vec::new(),
            opaque: Vec::new(),
        };
        walk.visit(&prepared, &mut data, "");
        let Walk {
            mut errors, opaque, ..
        } = walk;

        let generic = self.generic.validate(&data, &prepared)?;
        errors.extend(generic.into_iter().filter(|e| !is_under_any(&e.path, &opaque)));

        tracing::trace!(?mode, errors = errors.len(), "schema validation finished");
        Ok(Outcome { data, errors })
    }

    /// Validate with the generic validator only, with the attached
    /// `definitions` in scope. No write-mode preparation or walk.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] only when the schema cannot be compiled.
    pub fn validate_generic(&self, data: &Value, schema: &Value) -> Result<Vec<ValidationError>, SchemaError> {
        self.generic.validate(data, &self.attach_definitions(schema))
    }

    fn attach_definitions(&self, schema: &Value) -> Value {
        match (&self.definitions, schema) {
            (Some(definitions), Value::Object(map)) if !map.contains_key("definitions") => {
                let mut map = map.clone();
                map.insert("definitions".to_string(), definitions.clone());
                Value::Object(map)
            }
            _ => schema.clone(),
        }
    }
}

/// Normalise a Swagger schema into something the generic validator
/// accepts, applying the input-mode `required` rule.
pub(crate) fn prepare_schema(schema: &Value, mode: ValidationMode) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    if map.get("type").and_then(Value::as_str) == Some("file") {
        // The parent still needs `readOnly` to apply the input-mode rules.
        let mut opaque = Map::new();
        if let Some(flag) = map.get("readOnly") {
            opaque.insert("readOnly".to_string(), flag.clone());
        }
        return Value::Object(opaque);
    }

    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        let prepared = match key.as_str() {
            "properties" | "patternProperties" | "definitions" => match value {
                Value::Object(children) => Value::Object(
                    children
                        .iter()
                        .map(|(name, child)| (name.clone(), prepare_schema(child, mode)))
                        .collect(),
                ),
                other => other.clone(),
            },
            "items" | "allOf" | "anyOf" | "oneOf" => match value {
                Value::Array(list) => Value::Array(list.iter().map(|s| prepare_schema(s, mode)).collect()),
                other => prepare_schema(other, mode),
            },
            "additionalProperties" | "additionalItems" | "not" => prepare_schema(value, mode),
            // Parameter objects carry `required: true`; only the array form is a schema keyword.
            "required" if !value.is_array() => continue,
            _ => value.clone(),
        };
        out.insert(key.clone(), prepared);
    }

    if mode == ValidationMode::Input {
        let read_only: Vec<String> = out
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .filter(|(_, prop)| prop.get("readOnly").is_some_and(is_true))
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default();

        if !read_only.is_empty() {
            if let Some(Value::Array(required)) = out.get_mut("required") {
                required.retain(|name| !name.as_str().is_some_and(|n| read_only.iter().any(|r| r == n)));
            }
        }
    }

    // Draft 4 requires a non-empty `required` array.
    if out.get("required").and_then(Value::as_array).is_some_and(Vec::is_empty) {
        out.remove("required");
    }

    Value::Object(out)
}

/// Schema-directed walk over the data.
struct Walk<'a> {
    root: &'a Value,
    registry: &'a FormatRegistry,
    mode: ValidationMode,
    errors: Vec<ValidationError>,
    /// Paths whose coercion failed; generic errors at or below them are noise.
    opaque: Vec<String>,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, schema: &'a Value, data: &mut Value, path: &str) {
        let Some(schema) = resolve_local_ref(self.root, schema) else {
            return;
        };

        if let Some(all) = schema.get("allOf").and_then(Value::as_array) {
            for sub in all {
                self.visit(sub, data, path);
            }
        }
        for keyword in ["anyOf", "oneOf"] {
            for sub in schema.get(keyword).and_then(Value::as_array).into_iter().flatten() {
                if let Some(variant) = resolve_local_ref(self.root, sub) {
                    if variant_applies(variant, data) {
                        self.visit(variant, data, path);
                    }
                }
            }
        }

        if data.is_number() {
            self.check_numeric_format(schema, data, path);
            return;
        }

        match data {
            Value::Array(items) => self.visit_array(schema, items, path),
            Value::Object(map) => self.visit_object(schema, map, path),
            _ => {}
        }
    }

    fn visit_array(&mut self, schema: &'a Value, items: &mut [Value], path: &str) {
        let Some(items_schema) = schema.get("items") else {
            return;
        };

        if let Value::Array(tuple) = items_schema {
            for (i, (sub, item)) in tuple.iter().zip(items.iter_mut()).enumerate() {
                self.visit(sub, item, &join_pointer(path, &i.to_string()));
            }
            return;
        }

        let Some(items_schema) = resolve_local_ref(self.root, items_schema) else {
            return;
        };
        let coerce = items_schema.get("collectionFormat").is_some_and(is_true);

        for (i, item) in items.iter_mut().enumerate() {
            let item_path = join_pointer(path, &i.to_string());
            if coerce {
                match coerce_by_collection_format(items_schema, item) {
                    Ok(sequence) => *item = Value::Array(sequence),
                    Err(e) => {
                        self.errors
                            .push(ValidationError::new(ErrorKind::Coercion, item_path.clone(), e.to_string()));
                        self.opaque.push(item_path);
                        continue;
                    }
                }
            }
            self.visit(items_schema, item, &item_path);
        }
    }

    fn visit_object(&mut self, schema: &'a Value, map: &mut Map<String, Value>, path: &str) {
        let properties = schema.get("properties").and_then(Value::as_object);

        if self.mode == ValidationMode::Input {
            for (name, prop) in properties.into_iter().flatten() {
                if prop.get("readOnly").is_some_and(is_true) && map.contains_key(name) {
                    self.push_once(ValidationError::read_only(join_pointer(path, name)));
                }
            }
        }

        let additional = schema.get("additionalProperties").filter(|v| v.is_object());
        for (name, value) in map.iter_mut() {
            let sub = properties.and_then(|props| props.get(name)).or(additional);
            if let Some(sub) = sub {
                self.visit(sub, value, &join_pointer(path, name));
            }
        }
    }

    /// Several `anyOf`/`oneOf` variants may describe the same property.
    fn push_once(&mut self, error: ValidationError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    fn check_numeric_format(&mut self, schema: &Value, data: &Value, path: &str) {
        let Some(format) = schema.get("format").and_then(Value::as_str) else {
            return;
        };
        if self.registry.check_value(format, data) == Some(false) {
            let text = scalar_text(data).unwrap_or_default();
            self.push_once(ValidationError::new(
                ErrorKind::Format,
                path,
                format!("{text} is not a \"{format}\""),
            ));
        }
    }
}

/// Follow `#/...` references within `root`. Remote references are left to
/// the generic validator; `None` means the reference does not resolve.
fn resolve_local_ref<'v>(root: &'v Value, schema: &'v Value) -> Option<&'v Value> {
    let mut current = schema;
    for _ in 0..MAX_REF_HOPS {
        match current.get("$ref").and_then(Value::as_str) {
            Some(reference) if reference.starts_with('#') => {
                current = root.pointer(&reference[1..])?;
            }
            Some(_) => return None,
            None => return Some(current),
        }
    }
    None
}

/// Whether an `anyOf`/`oneOf` variant describes `data`: its `type` admits
/// the data's JSON type and, for objects, every name it still requires is
/// present.
fn variant_applies(variant: &Value, data: &Value) -> bool {
    let admits = |name: &str| match name {
        "integer" => data.as_f64().is_some_and(|f| f.fract() == 0.0),
        "number" => data.is_number(),
        "string" => data.is_string(),
        "boolean" => data.is_boolean(),
        "array" => data.is_array(),
        "object" => data.is_object(),
        "null" => data.is_null(),
        _ => false,
    };
    let type_ok = match variant.get("type") {
        Some(Value::String(name)) => admits(name),
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).any(admits),
        _ => true,
    };
    if !type_ok {
        return false;
    }
    match (data, variant.get("required").and_then(Value::as_array)) {
        (Value::Object(map), Some(required)) => required
            .iter()
            .filter_map(Value::as_str)
            .all(|name| map.contains_key(name)),
        _ => true,
    }
}

fn is_under_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        path == prefix || (path.starts_with(prefix.as_str()) && path[prefix.len()..].starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    fn validator() -> SchemaValidator {
        SchemaValidator::new(GenericValidator::new(Arc::new(FormatRegistry::swagger())))
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn validator_is_shareable() {
        assert_send_sync::<SchemaValidator>();
    }

    #[test]
    fn read_only_present_on_input() {
        let schema = json!({"properties": {"id": {"readOnly": true}}});
        let errors = validator().validate_input(&json!({"id": 5}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::read_only("/id")]);
    }

    #[test]
    fn read_only_ignored_on_output() {
        let schema = json!({"properties": {"id": {"readOnly": true}}});
        assert!(validator().validate(&json!({"id": 5}), &schema).unwrap().is_empty());
    }

    #[test]
    fn read_only_never_required_on_input() {
        let schema = json!({"properties": {"id": {"readOnly": true}}, "required": ["id"]});
        assert!(validator().validate_input(&json!({}), &schema).unwrap().is_empty());
    }

    #[test]
    fn read_only_still_required_on_output() {
        let schema = json!({"properties": {"id": {"readOnly": true}}, "required": ["id"]});
        let errors = validator().validate(&json!({}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::missing_required("/id")]);
    }

    #[test]
    fn read_only_loose_truthiness() {
        let schema = json!({"properties": {"a": {"readOnly": "yes"}, "b": {"readOnly": "no"}}});
        let errors = validator().validate_input(&json!({"a": 1, "b": 2}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::read_only("/a")]);
    }

    #[test]
    fn read_only_errors_precede_generic_errors() {
        let schema = json!({
            "properties": {"id": {"readOnly": true}, "name": {"type": "string"}},
            "required": ["id", "name"]
        });
        let errors = validator().validate_input(&json!({"id": 1}), &schema).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], ValidationError::read_only("/id"));
        assert_eq!(errors[1], ValidationError::missing_required("/name"));
    }

    #[test]
    fn nested_read_only_through_items_and_refs() {
        let schema = json!({
            "type": "array",
            "items": {"$ref": "#/definitions/Pet"},
            "definitions": {
                "Pet": {
                    "type": "object",
                    "required": ["id", "name"],
                    "properties": {"id": {"type": "integer", "readOnly": true}, "name": {"type": "string"}}
                }
            }
        });
        let errors = validator()
            .validate_input(&json!([{"name": "rex"}, {"id": 2, "name": "tom"}]), &schema)
            .unwrap();
        assert_eq!(errors, vec![ValidationError::read_only("/1/id")]);
    }

    #[test]
    fn file_type_is_always_valid() {
        let schema = json!({"type": "file"});
        for data in [json!(null), json!("bytes"), json!({"x": [1, 2]}), json!(12)] {
            assert!(validator().validate_input(&data, &schema).unwrap().is_empty());
            assert!(validator().validate(&data, &schema).unwrap().is_empty());
        }
    }

    #[test]
    fn read_only_file_property_on_input() {
        let schema = json!({"properties": {"f": {"type": "file", "readOnly": true}}, "required": ["f"]});
        assert!(validator().validate_input(&json!({}), &schema).unwrap().is_empty());
        let errors = validator().validate_input(&json!({"f": 1}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::read_only("/f")]);
        assert_eq!(
            validator().validate(&json!({}), &schema).unwrap(),
            vec![ValidationError::missing_required("/f")]
        );
    }

    #[test]
    fn read_only_inside_one_of() {
        let schema = json!({"oneOf": [
            {"type": "object", "properties": {"id": {"readOnly": true}}, "required": ["id"]}
        ]});
        let errors = validator().validate_input(&json!({"id": 1}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::read_only("/id")]);
        assert!(validator().validate_input(&json!({}), &schema).unwrap().is_empty());
    }

    #[test]
    fn non_matching_variant_is_not_walked() {
        let schema = json!({"anyOf": [
            {"type": "string"},
            {"type": "object", "properties": {"id": {"readOnly": true}}},
            {"type": "object", "required": ["kind"], "properties": {"id": {"readOnly": true}, "kind": {}}}
        ]});
        let errors = validator().validate_input(&json!({"id": 1}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::read_only("/id")]);
    }

    #[test]
    fn read_only_reported_once_across_variants() {
        let variant = json!({"type": "object", "properties": {"id": {"readOnly": true}}});
        let schema = json!({"anyOf": [variant.clone(), variant]});
        let errors = validator().validate_input(&json!({"id": 1}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::read_only("/id")]);
    }

    #[test]
    fn generic_only_sees_definitions() {
        let v = validator().with_definitions(json!({
            "Pet": {"type": "object", "properties": {"id": {"readOnly": true}}, "required": ["id"]}
        }));
        let schema = json!({"$ref": "#/definitions/Pet"});
        assert!(v.validate_generic(&json!({"id": 1}), &schema).unwrap().is_empty());
        assert_eq!(
            v.validate_generic(&json!({}), &schema).unwrap(),
            vec![ValidationError::missing_required("/id")]
        );
    }

    #[test]
    fn nested_file_property_is_opaque() {
        let schema = json!({"type": "object", "properties": {"upload": {"type": "file"}}});
        assert!(validator().validate_input(&json!({"upload": 42}), &schema).unwrap().is_empty());
    }

    #[test]
    fn array_items_coerced_per_element() {
        let schema = json!({
            "type": "array",
            "items": {"type": "array", "collectionFormat": "csv", "items": {"type": "integer"}}
        });
        let outcome = validator()
            .check(&json!(["1,2", "3"]), &schema, ValidationMode::Input)
            .unwrap();
        assert!(outcome.is_valid(), "{:?}", outcome.errors);
        assert_eq!(outcome.data, json!([[1, 2], [3]]));
    }

    #[test]
    fn array_coercion_failure_reported_once() {
        let schema = json!({
            "type": "array",
            "items": {"type": "array", "collectionFormat": "pipes", "items": {"type": "integer"}}
        });
        let errors = validator().validate_input(&json!(["1|x", "2"]), &schema).unwrap();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].kind, ErrorKind::Coercion);
        assert_eq!(errors[0].path, "/0");
    }

    #[test]
    fn array_without_items_format_is_untouched() {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        let outcome = validator().check(&json!(["a,b"]), &schema, ValidationMode::Output).unwrap();
        assert_eq!(outcome.data, json!(["a,b"]));
        assert!(outcome.is_valid());
    }

    #[test]
    fn numeric_int32_format() {
        let schema = json!({"type": "integer", "format": "int32"});
        assert!(validator().validate(&json!(2_147_483_647), &schema).unwrap().is_empty());
        let errors = validator().validate(&json!(99_999_999_999_i64), &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Format);
        assert_eq!(errors[0].message, "99999999999 is not a \"int32\"");
    }

    #[test]
    fn parameter_required_flag_is_not_a_schema_keyword() {
        let schema = json!({"name": "q", "in": "query", "type": "string", "required": true});
        assert!(validator().validate_input(&json!("x"), &schema).unwrap().is_empty());
    }

    #[test]
    fn definitions_attached_from_document() {
        let v = validator().with_definitions(json!({
            "Tag": {"type": "object", "required": ["label"]}
        }));
        let schema = json!({"$ref": "#/definitions/Tag"});
        let errors = v.validate_input(&json!({}), &schema).unwrap();
        assert_eq!(errors, vec![ValidationError::missing_required("/label")]);
    }

    #[test]
    fn prepare_drops_empty_required_after_read_only_strip() {
        let prepared = prepare_schema(
            &json!({"properties": {"id": {"readOnly": true}}, "required": ["id"]}),
            ValidationMode::Input,
        );
        assert!(prepared.get("required").is_none());
        let output = prepare_schema(
            &json!({"properties": {"id": {"readOnly": true}}, "required": ["id"]}),
            ValidationMode::Output,
        );
        assert_eq!(output["required"], json!(["id"]));
    }

    #[test]
    fn opaque_prefix_matching() {
        let opaque = vec!["/a/1".to_string()];
        assert!(is_under_any("/a/1", &opaque));
        assert!(is_under_any("/a/1/0", &opaque));
        assert!(!is_under_any("/a/10", &opaque));
    }
}
