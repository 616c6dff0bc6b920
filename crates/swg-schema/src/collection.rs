//! # Collection Coercer
//!
//! Swagger 2.0 encodes array-valued query/header/path/form parameters as
//! delimited strings, named by `collectionFormat`:
//!
//! | token | separator |
//! |---|---|
//! | `csv` | `,` |
//! | `ssv` | whitespace run |
//! | `tsv` | tab |
//! | `pipes` | `\|` |
//! | `multi` | none (repeated parameter, already a sequence) |
//!
//! [`coerce_by_collection_format`] turns a raw value into the flat
//! sequence the schema describes. An absent or unknown token is the
//! identity: a scalar is wrapped, a sequence is returned as is.

use serde_json::{Number, Value};
use thiserror::Error;

/// A recognised `collectionFormat` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFormat {
    /// Comma separated.
    Csv,
    /// Space separated.
    Ssv,
    /// Tab separated.
    Tsv,
    /// Pipe separated.
    Pipes,
    /// One parameter instance per value; nothing to split.
    Multi,
}

impl CollectionFormat {
    /// Parse a document token. Unknown tokens are `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "csv" => Some(Self::Csv),
            "ssv" => Some(Self::Ssv),
            "tsv" => Some(Self::Tsv),
            "pipes" => Some(Self::Pipes),
            "multi" => Some(Self::Multi),
            _ => None,
        }
    }

    /// The `collectionFormat` declared on a schema fragment, if recognised.
    pub fn of(schema: &Value) -> Option<Self> {
        schema
            .get("collectionFormat")
            .and_then(Value::as_str)
            .and_then(Self::from_token)
    }

    /// Whether this format splits strings at all.
    pub fn has_separator(&self) -> bool {
        !matches!(self, Self::Multi)
    }

    /// Split `s` on this format's separator, dropping empty pieces.
    pub fn split<'a>(&self, s: &'a str) -> Vec<&'a str> {
        let pieces: Box<dyn Iterator<Item = &'a str>> = match self {
            Self::Csv => Box::new(s.split(',')),
            Self::Ssv => Box::new(s.split_whitespace()),
            Self::Tsv => Box::new(s.split('\t')),
            Self::Pipes => Box::new(s.split('|')),
            Self::Multi => Box::new(std::iter::once(s)),
        };
        pieces.filter(|piece| !piece.is_empty()).collect()
    }
}

/// A token could not be read as the declared numeric item type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// `items.type` is `integer`/`number` but the token is not numeric.
    #[error("Expected {expected} - got \"{token}\".")]
    NotNumeric {
        /// Position of the token in the flattened sequence.
        index: usize,
        /// The offending token.
        token: String,
        /// Declared item type.
        expected: &'static str,
    },
}

impl CoercionError {
    /// Position of the offending token in the coerced sequence.
    pub fn index(&self) -> usize {
        match self {
            Self::NotNumeric { index, .. } => *index,
        }
    }
}

/// Coerce `value` into the sequence described by `schema`'s
/// `collectionFormat` and `items.type`.
///
/// - No recognised separator: `[value]` for a scalar, the elements for a
///   sequence.
/// - Separator: every element is split and the tokens flattened; `null`
///   elements and empty tokens are dropped.
/// - `items.type` of `integer` or `number`: every token is parsed as a
///   number; a token that does not parse is a [`CoercionError`].
pub fn coerce_by_collection_format(
    schema: &Value,
    value: &Value,
) -> Result<Vec<Value>, CoercionError> {
    let format = CollectionFormat::of(schema).filter(CollectionFormat::has_separator);

    let Some(format) = format else {
        return Ok(match value {
            Value::Array(items) => items.clone(),
            scalar => vec![scalar.clone()],
        });
    };

    let elements: &[Value] = match value {
        Value::Array(items) => items,
        scalar => std::slice::from_ref(scalar),
    };

    let mut tokens = Vec::new();
    for element in elements {
        match element {
            Value::Null => {}
            Value::String(s) => {
                tokens.extend(format.split(s).into_iter().map(|t| Value::String(t.to_string())));
            }
            Value::Number(n) => {
                let text = n.to_string();
                tokens.extend(format.split(&text).into_iter().map(|t| Value::String(t.to_string())));
            }
            Value::Bool(b) => tokens.push(Value::String(b.to_string())),
            aggregate => tokens.push(aggregate.clone()),
        }
    }

    match numeric_item_type(schema) {
        Some(expected) => tokens
            .into_iter()
            .enumerate()
            .map(|(index, token)| coerce_token(index, token, expected))
            .collect(),
        None => Ok(tokens),
    }
}

/// `"integer"` or `"number"` when `schema.items.type` asks for numbers.
fn numeric_item_type(schema: &Value) -> Option<&'static str> {
    match schema.pointer("/items/type").and_then(Value::as_str) {
        Some("integer") => Some("integer"),
        Some("number") => Some("number"),
        _ => None,
    }
}

fn coerce_token(index: usize, token: Value, expected: &'static str) -> Result<Value, CoercionError> {
    let Value::String(text) = token else {
        return Ok(token);
    };
    parse_number(&text).map(Value::Number).ok_or(CoercionError::NotNumeric {
        index,
        token: text,
        expected,
    })
}

/// Parse a finite JSON number from text, preferring integers.
pub(crate) fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Some(Number::from(u));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn no_format_wraps_scalar() {
        assert_eq!(coerce_by_collection_format(&json!({}), &json!("abc")).unwrap(), vec![json!("abc")]);
    }

    #[test]
    fn no_format_passes_sequence_through() {
        let out = coerce_by_collection_format(&json!({}), &json!(["a,b", "c"])).unwrap();
        assert_eq!(out, vec![json!("a,b"), json!("c")]);
    }

    #[test]
    fn unknown_token_is_identity() {
        let out = coerce_by_collection_format(&json!({"collectionFormat": "semicolons"}), &json!("a;b"))
            .unwrap();
        assert_eq!(out, vec![json!("a;b")]);
    }

    #[test]
    fn multi_is_identity() {
        let out =
            coerce_by_collection_format(&json!({"collectionFormat": "multi"}), &json!(["1", "2"])).unwrap();
        assert_eq!(out, vec![json!("1"), json!("2")]);
    }

    #[test]
    fn csv_splits() {
        let out = coerce_by_collection_format(&json!({"collectionFormat": "csv"}), &json!("1,2,3")).unwrap();
        assert_eq!(out, vec![json!("1"), json!("2"), json!("3")]);
    }

    #[test]
    fn csv_integer_items() {
        let schema = json!({"collectionFormat": "csv", "items": {"type": "integer"}});
        let out = coerce_by_collection_format(&schema, &json!("1,2,3")).unwrap();
        assert_eq!(out, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn number_items_accept_decimals() {
        let schema = json!({"collectionFormat": "pipes", "items": {"type": "number"}});
        let out = coerce_by_collection_format(&schema, &json!("1.5|-2|3e2")).unwrap();
        assert_eq!(out, vec![json!(1.5), json!(-2), json!(300.0)]);
    }

    #[test]
    fn ssv_splits_on_whitespace_runs() {
        let out = coerce_by_collection_format(&json!({"collectionFormat": "ssv"}), &json!(" a  b\tc ")).unwrap();
        assert_eq!(out, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn tsv_and_pipes() {
        let tsv = coerce_by_collection_format(&json!({"collectionFormat": "tsv"}), &json!("a\tb")).unwrap();
        assert_eq!(tsv, vec![json!("a"), json!("b")]);
        let pipes = coerce_by_collection_format(&json!({"collectionFormat": "pipes"}), &json!("a|b")).unwrap();
        assert_eq!(pipes, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn sequence_elements_are_each_split_and_flattened() {
        let out =
            coerce_by_collection_format(&json!({"collectionFormat": "csv"}), &json!(["a,b", null, "c"])).unwrap();
        assert_eq!(out, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn empty_pieces_dropped() {
        let out = coerce_by_collection_format(&json!({"collectionFormat": "csv"}), &json!(",a,,b,")).unwrap();
        assert_eq!(out, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn non_numeric_token_is_an_error() {
        let schema = json!({"collectionFormat": "csv", "items": {"type": "integer"}});
        let err = coerce_by_collection_format(&schema, &json!("1,x,3")).unwrap_err();
        assert_eq!(err.index(), 1);
        assert_eq!(err.to_string(), "Expected integer - got \"x\".");
    }

    #[test]
    fn numeric_scalar_is_split_as_text() {
        let schema = json!({"collectionFormat": "csv", "items": {"type": "integer"}});
        let out = coerce_by_collection_format(&schema, &json!(7)).unwrap();
        assert_eq!(out, vec![json!(7)]);
    }

    #[test]
    fn format_tokens() {
        assert_eq!(CollectionFormat::from_token("csv"), Some(CollectionFormat::Csv));
        assert_eq!(CollectionFormat::from_token("CSV"), None);
        assert!(!CollectionFormat::Multi.has_separator());
    }

    proptest! {
        /// Without a collectionFormat, any string comes back wrapped and untouched.
        #[test]
        fn identity_without_format(s in ".*") {
            let out = coerce_by_collection_format(&json!({}), &json!(s.clone())).unwrap();
            prop_assert_eq!(out, vec![json!(s)]);
        }

        /// Joining with commas and splitting as csv round-trips non-empty tokens.
        #[test]
        fn csv_recovers_joined_tokens(parts in proptest::collection::vec("[a-z0-9]{1,6}", 1..6)) {
            let joined = parts.join(",");
            let out = coerce_by_collection_format(&json!({"collectionFormat": "csv"}), &json!(joined)).unwrap();
            let expected: Vec<Value> = parts.into_iter().map(Value::String).collect();
            prop_assert_eq!(out, expected);
        }
    }
}
