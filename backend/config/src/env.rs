//! Environment handling for config values.
//!
//! - `${VAR_NAME}` references in string values are resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes
//!   to a literal `${VAR}`.
//! - `CHATGATE_PREFIX`, `CHATGATE_COMMANDS_DIR` and `RUST_LOG` override
//!   the file.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::schema::ChatGateConfig;

/// Matches `${VAR}` and its escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree.
///
/// Returns an error if any referenced env var is not set or is empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        // Primitives pass through unchanged.
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply `CHATGATE_*` / `RUST_LOG` overrides.
pub fn apply_env_overrides_with(
    mut config: ChatGateConfig,
    env: &HashMap<String, String>,
) -> ChatGateConfig {
    if let Some(prefix) = env.get("CHATGATE_PREFIX") {
        config.prefix = prefix.clone();
    }
    if let Some(dir) = env.get("CHATGATE_COMMANDS_DIR").filter(|d| !d.is_empty()) {
        config.commands_dir = PathBuf::from(dir);
    }
    if let Some(level) = env.get("RUST_LOG").filter(|l| !l.is_empty()) {
        config.log_level = level.clone();
    }
    config
}
