//! # Loose Truthiness
//!
//! Swagger documents are hand-written and their boolean-ish fields
//! (`required`, `readOnly`, `allowEmptyValue`) show up as real booleans,
//! numbers, and strings like `"yes"`, `"no"`, `"off"`. This module pins
//! down exactly which shapes count as true.
//!
//! | value | result |
//! |---|---|
//! | object / array (even empty) | `true` |
//! | `null` | `false` |
//! | `true` / `false` | itself |
//! | number | `!= 0` |
//! | `""`, `"0"` | `false` |
//! | string starting with `n`, `false` or `off` (any case) | `false` |
//! | any other string | `true` |

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static FALSY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    // `n` covers "no", "nope", "null", "none".
    Regex::new(r"(?i)^(n|false|off)").expect("invalid falsy-word regex")
});

/// Interpret a document value as a boolean.
pub fn is_true(value: &Value) -> bool {
    match value {
        Value::Object(_) | Value::Array(_) => true,
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => is_true_str(s),
    }
}

/// Interpret a bare string as a boolean (used for environment variables).
pub fn is_true_str(s: &str) -> bool {
    !(s.is_empty() || s == "0" || FALSY_WORD.is_match(s))
}

/// [`is_true`] for an optional field; absent is false.
pub fn is_true_opt(value: Option<&Value>) -> bool {
    value.is_some_and(is_true)
}
