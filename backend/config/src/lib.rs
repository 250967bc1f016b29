//! `chatgate-config`: bot configuration management.
//!
//! Provides:
//! - Typed config schema (prefix, catalog location, logging, permissions)
//! - YAML loading
//! - `${ENV_VAR}` substitution and `CHATGATE_*` overrides
//! - Default value application
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides_with, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_file_path, load_config};
pub use schema::ChatGateConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Load, apply env substitution and overrides, apply defaults and validate.
///
/// This is the main entry point for loading a config at runtime. Any
/// validation error fails the load; warnings are only logged.
pub async fn load_and_prepare(path: &Path) -> Result<ChatGateConfig> {
    let raw = load_config(path).await?;
    prepare(raw, &std::env::vars().collect())
}

/// The synchronous half of [`load_and_prepare`], with an explicit environment.
pub fn prepare(raw: Value, env: &HashMap<String, String>) -> Result<ChatGateConfig> {
    // Substitute ${VAR} env vars.
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: ChatGateConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let config = apply_env_overrides_with(config, env);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("invalid config ({} error(s)); first: {first}", report.errors.len());
    }

    Ok(config)
}
