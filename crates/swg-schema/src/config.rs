//! Validator configuration and document loading.
//!
//! Defaults suit production use. Override via environment variables or
//! explicit construction in tests.

use std::path::Path;

use serde_json::Value;
use swg_core::is_true_str;

/// Engine-wide switches, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Emit per-parameter diagnostics through `tracing`.
    pub debug: bool,
    /// Convert clean numeric/boolean strings of non-body parameters
    /// before validation.
    pub coerce_scalars: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            debug: false,
            coerce_scalars: true,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables (read with the loose truthiness rule):
    /// - `SWG_DEBUG` (default: false)
    /// - `SWG_COERCE_SCALARS` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            debug: env_flag("SWG_DEBUG", defaults.debug),
            coerce_scalars: env_flag("SWG_COERCE_SCALARS", defaults.coerce_scalars),
        }
    }
}

fn env_flag(var: &str, default: bool) -> bool {
    std::env::var(var)
        .map(|raw| is_true_str(&raw))
        .unwrap_or(default)
}

/// A document handed to the loaders could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {reason}")]
    Read {
        /// Path as given.
        path: String,
        /// I/O error text.
        reason: String,
    },

    /// The contents are neither valid JSON nor valid YAML.
    #[error("cannot parse {path}: {reason}")]
    Parse {
        /// Path as given, or `<inline>` for command-line text.
        path: String,
        /// Parser error text.
        reason: String,
    },
}

/// Load a JSON or YAML document as a `serde_json::Value`.
///
/// `.yaml` / `.yml` files are parsed as YAML; anything else as JSON.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => parse_yaml(&content),
        _ => serde_json::from_str(&content).map_err(|e| e.to_string()),
    }
    .map_err(|reason| ConfigError::Parse {
        path: path.display().to_string(),
        reason,
    })
}

/// Parse inline text as JSON, falling back to YAML.
///
/// A bare word such as `abc` is valid YAML and comes back as a string,
/// which is what a command-line value usually means.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the text is neither.
pub fn parse_inline(text: &str) -> Result<Value, ConfigError> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    parse_yaml(text).map_err(|reason| ConfigError::Parse {
        path: "<inline>".to_string(),
        reason,
    })
}

/// YAML 1.2 straight into `serde_json::Value`.
fn parse_yaml(content: &str) -> Result<Value, String> {
    serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))
}
