//! Config file lookup and reading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

/// Default config file name, relative to the working directory.
const CONFIG_FILE_NAME: &str = "chatgate.yaml";

/// Resolve the config file path.
/// Priority: explicit path > `CHATGATE_CONFIG` env > `./chatgate.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("CHATGATE_CONFIG") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped value tree.
///
/// Returns an empty object if the file doesn't exist (first run), so every
/// field falls back to its default.
pub async fn load_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}
