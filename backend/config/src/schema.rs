//! Typed configuration schema.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chatgate_core::PermissionLevel;
use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BOT_ID, DEFAULT_COMMANDS_DIR, DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_PREFIX,
};

/// Root configuration for the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatGateConfig {
    /// Token that starts every command, e.g. `>>`.
    pub prefix: String,
    /// Directory holding one YAML manifest per command.
    pub commands_dir: PathBuf,
    /// Messages authored by this id are ignored.
    pub bot_id: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// User id → permission level. Users not listed are `user`.
    pub permissions: BTreeMap<String, PermissionLevel>,
}

impl Default for ChatGateConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            commands_dir: PathBuf::from(DEFAULT_COMMANDS_DIR),
            bot_id: DEFAULT_BOT_ID.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            permissions: BTreeMap::new(),
        }
    }
}

impl ChatGateConfig {
    /// Effective permission level for a user id.
    pub fn permission_for(&self, user_id: &str) -> PermissionLevel {
        self.permissions.get(user_id).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_parse_with_partial_fields() {
        let yaml = "prefix: \"!\"\npermissions:\n  alice: admin\n";
        let config: ChatGateConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.prefix, "!");
        assert_eq!(config.commands_dir, PathBuf::from("commands"));
        assert_eq!(config.permission_for("alice"), PermissionLevel::Admin);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let yaml = "prefx: \"!\"\n";
        assert!(serde_yaml::from_str::<ChatGateConfig>(yaml).is_err());
    }
}
