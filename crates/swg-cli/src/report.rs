//! Printable validation result.

use serde::Serialize;
use serde_json::Value;
use swg_core::ValidationError;

/// What a subcommand prints.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// True when no errors were found.
    pub valid: bool,
    /// The data after coercion, when there is any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Violations in discovery order.
    pub errors: Vec<ValidationError>,
    #[serde(skip)]
    json: bool,
}

impl Report {
    /// Build a report; `json` selects the output format of [`Report::render`].
    pub fn new(value: Option<Value>, errors: Vec<ValidationError>, json: bool) -> Self {
        Self {
            valid: errors.is_empty(),
            value,
            errors,
            json,
        }
    }

    /// Render for stdout.
    pub fn render(&self) -> anyhow::Result<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(self)?);
        }
        if self.valid {
            let value = match &self.value {
                Some(v) => serde_json::to_string(v)?,
                None => "(absent)".to_string(),
            };
            return Ok(format!("valid: {value}"));
        }
        let lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        Ok(lines.join("\n"))
    }
}
