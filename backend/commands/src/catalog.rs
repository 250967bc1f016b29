//! Command catalog: discover command manifests on disk and bind each one
//! to a handler.
//!
//! Every `*.yaml` / `*.yml` file under the catalog directory describes one
//! command, named after the file stem:
//!
//! ```yaml
//! # commands/ban.yaml
//! handler: ban          # optional, defaults to the file stem
//! permission: moderator # user | moderator | admin | owner
//! help: "Ban a user. -user <name> [-days <n>] [-reason <text>]"
//! args:
//!   user: { types: [str] }
//!   days: { types: [int], optional: true }
//!   reason: { types: [str], optional: true }
//! ```
//!
//! Any problem is fatal: a bot with half its commands is worse than a bot
//! that refuses to start.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chatgate_core::PermissionLevel;
use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info};

use crate::detection::FLAG_MARKER;
use crate::dispatch::CommandHandler;
use crate::error::RegistryError;
use crate::registry::{CommandDescriptor, Registry};
use crate::types::{ArgSpec, FlagMap};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("command directory {} doesn't exist", .0.display())]
    MissingSource(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid command manifest {}: {message}", .path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("cannot load command `{command}`: no handler named `{handler}`")]
    UnresolvedHandler { command: String, handler: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Handler table
// ---------------------------------------------------------------------------

/// Handlers a manifest may refer to, by name.
#[derive(Default, Clone)]
pub struct HandlerTable {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }
}

// ---------------------------------------------------------------------------
// Manifests
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandManifest {
    handler: Option<String>,
    #[serde(default)]
    permission: PermissionLevel,
    #[serde(default)]
    help: String,
    /// Kept as a raw mapping so declaration order survives.
    #[serde(default)]
    args: serde_yaml::Mapping,
}

pub struct CommandCatalog;

impl CommandCatalog {
    /// Load every manifest under `dir` into descriptors, sorted by path.
    pub async fn load(
        dir: &Path,
        handlers: &HandlerTable,
    ) -> Result<Vec<CommandDescriptor>, CatalogError> {
        info!(dir = %dir.display(), "Loading commands...");

        if !fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            error!(dir = %dir.display(), "Command directory doesn't exist");
            return Err(CatalogError::MissingSource(dir.to_path_buf()));
        }

        let files = manifest_files(dir).await?;
        let mut descriptors = Vec::with_capacity(files.len());
        for path in files {
            info!(path = %path.display(), "Importing command");
            match load_manifest(&path, handlers).await {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Cannot load command");
                    return Err(e);
                }
            }
        }
        Ok(descriptors)
    }

    /// Load `dir` and build the registry in one step.
    pub async fn load_registry(
        dir: &Path,
        handlers: &HandlerTable,
    ) -> Result<Registry, CatalogError> {
        let descriptors = Self::load(dir, handlers).await?;
        let registry = Registry::from_descriptors(descriptors).inspect_err(|e| {
            error!(error = %e, "Cannot build command registry");
        })?;
        info!(count = registry.len(), "Commands loaded");
        Ok(registry)
    }
}

/// Recursively collect manifest files, sorted so load order is stable.
async fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let unreadable = |path: &Path| {
        let path = path.to_path_buf();
        move |source| CatalogError::Unreadable { path, source }
    };

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current).await.map_err(unreadable(&current))?;
        while let Some(entry) = entries.next_entry().await.map_err(unreadable(&current))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(unreadable(&path))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

async fn load_manifest(
    path: &Path,
    handlers: &HandlerTable,
) -> Result<CommandDescriptor, CatalogError> {
    let invalid = |message: String| CatalogError::InvalidManifest {
        path: path.to_path_buf(),
        message,
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !s.contains(char::is_whitespace))
        .ok_or_else(|| invalid("file name is not a valid command name".to_string()))?
        .to_string();

    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Unreadable { path: path.to_path_buf(), source })?;
    let manifest: CommandManifest = if raw.trim().is_empty() {
        CommandManifest::default()
    } else {
        serde_yaml::from_str(&raw).map_err(|e| invalid(e.to_string()))?
    };

    let handler_name = manifest.handler.unwrap_or_else(|| name.clone());
    let handler = handlers.get(&handler_name).ok_or_else(|| CatalogError::UnresolvedHandler {
        command: name.clone(),
        handler: handler_name.clone(),
    })?;

    let mut args = FlagMap::new();
    for (key, value) in manifest.args {
        let flag = key
            .as_str()
            .filter(|k| {
                !k.is_empty() && !k.contains(char::is_whitespace) && !k.contains(FLAG_MARKER)
            })
            .ok_or_else(|| invalid(format!("argument name {key:?} is not a valid flag")))?
            .to_string();
        let spec: ArgSpec =
            serde_yaml::from_value(value).map_err(|e| invalid(format!("-{flag}: {e}")))?;
        if spec.types.is_empty() {
            return Err(invalid(format!("-{flag} accepts no types")));
        }
        args.insert(flag, spec);
    }

    Ok(CommandDescriptor {
        name,
        handler,
        permission: manifest.permission,
        args,
        help: manifest.help,
    })
}
