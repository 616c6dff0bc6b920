//! # Format Registry
//!
//! Swagger 2.0 adds a handful of `format` names on top of JSON Schema's.
//! [`FormatRegistry::swagger`] builds the standard set once at startup;
//! it is immutable afterwards and shared behind an `Arc`.
//!
//! | format | accepts |
//! |---|---|
//! | `byte` | base64 alphabet, padded |
//! | `date` | `<digits>-<digits>-<digits>` (no calendar check) |
//! | `double`, `float` | anything that looks like a number |
//! | `int32` | integer text that survives an `i32` round trip |
//! | `int64` | integer text that survives an `i64` round trip |
//!
//! String values reach these predicates through the generic validator
//! (the registry is installed into its options). Numeric values are
//! checked by the write-mode walk via [`FormatRegistry::check_value`],
//! because JSON Schema's `format` keyword only looks at strings.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use jsonschema::ValidationOptions;
use regex::Regex;
use serde_json::Value;

/// A named format check over the textual form of a scalar.
pub type FormatPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Width of the host's native integer. `int64` is only enforced when
/// this is at least 64.
const NATIVE_INT_BITS: u32 = usize::BITS;

static BYTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/=]+$").expect("invalid byte regex"));

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-(\d+)-(\d+)$").expect("invalid date regex"));

static INTEGER_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("invalid integer regex"));

static NUMBER_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*[+-]?(?:\d+\.?\d*(?:[eE][+-]?\d+)?|\.\d+(?:[eE][+-]?\d+)?|(?i:inf(?:inity)?|nan))\s*$",
    )
    .expect("invalid number regex")
});

/// Base64 alphabet, `=` padding allowed anywhere.
pub fn is_byte_string(s: &str) -> bool {
    BYTE_RE.is_match(s)
}

/// Loose `YYYY-MM-DD` shape.
pub fn is_date(s: &str) -> bool {
    DATE_RE.is_match(s)
}

/// Integer, decimal, exponent, `inf`/`infinity`/`nan`; surrounding
/// whitespace is tolerated.
pub fn looks_like_number(s: &str) -> bool {
    NUMBER_TEXT_RE.is_match(s)
}

/// Integer text that round-trips through `i32` unchanged.
pub fn is_int32(s: &str) -> bool {
    INTEGER_TEXT_RE.is_match(s) && s.parse::<i32>().is_ok_and(|n| n.to_string() == s)
}

/// Integer text that round-trips through `i64` unchanged. Always true on
/// hosts whose native integer is narrower than 64 bits.
pub fn is_int64(s: &str) -> bool {
    if NATIVE_INT_BITS < 64 {
        return true;
    }
    INTEGER_TEXT_RE.is_match(s) && s.parse::<i64>().is_ok_and(|n| n.to_string() == s)
}

/// Textual form of a scalar as a format predicate sees it.
///
/// Integral floats render without a fractional part (`3.0` → `"3"`).
/// Booleans, `null` and aggregates have no textual form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

/// Immutable map from format name to predicate.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    formats: BTreeMap<String, FormatPredicate>,
}

impl FormatRegistry {
    /// A registry with no formats; the generic validator's built-ins
    /// still apply.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The Swagger 2.0 formats: byte, date, double, float, int32, int64.
    pub fn swagger() -> Self {
        Self::empty()
            .with_format("byte", is_byte_string)
            .with_format("date", is_date)
            .with_format("double", looks_like_number)
            .with_format("float", looks_like_number)
            .with_format("int32", is_int32)
            .with_format("int64", is_int64)
    }

    /// Add (or replace) a predicate. Intended for construction time only.
    pub fn with_format<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Registered format names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.formats.keys().map(String::as_str).collect()
    }

    /// Whether `name` has a predicate here.
    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Run the predicate for `name`. `None` when the format is unknown.
    pub fn check(&self, name: &str, text: &str) -> Option<bool> {
        self.formats.get(name).map(|predicate| predicate(text))
    }

    /// Run the predicate for `name` against a scalar's textual form.
    /// `None` when the format is unknown or the value has no textual form.
    pub fn check_value(&self, name: &str, value: &Value) -> Option<bool> {
        let predicate = self.formats.get(name)?;
        let text = scalar_text(value)?;
        Some(predicate(&text))
    }

    /// Register every predicate with the generic validator's options.
    pub(crate) fn install(&self, options: &mut ValidationOptions) {
        for (name, predicate) in &self.formats {
            let predicate = Arc::clone(predicate);
            options.with_format(name.clone(), move |s: &str| predicate(s));
        }
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}
