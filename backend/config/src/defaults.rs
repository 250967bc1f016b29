//! Config defaults: fills blank values left by the config file or overrides.

use std::path::PathBuf;

use crate::schema::ChatGateConfig;

pub const DEFAULT_PREFIX: &str = ">>";
pub const DEFAULT_COMMANDS_DIR: &str = "commands";
pub const DEFAULT_BOT_ID: &str = "chatgate";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Apply all defaults to a freshly loaded config.
///
/// The prefix is deliberately left alone: an empty prefix is reported by
/// validation instead of being silently replaced.
pub fn apply_all_defaults(config: ChatGateConfig) -> ChatGateConfig {
    let config = apply_path_defaults(config);
    apply_identity_defaults(config)
}

fn apply_path_defaults(mut config: ChatGateConfig) -> ChatGateConfig {
    if config.commands_dir.as_os_str().is_empty() {
        config.commands_dir = PathBuf::from(DEFAULT_COMMANDS_DIR);
    }
    if config.log_dir.as_os_str().is_empty() {
        config.log_dir = PathBuf::from(DEFAULT_LOG_DIR);
    }
    config
}

fn apply_identity_defaults(mut config: ChatGateConfig) -> ChatGateConfig {
    if config.bot_id.trim().is_empty() {
        config.bot_id = DEFAULT_BOT_ID.to_string();
    }
    if config.log_level.trim().is_empty() {
        config.log_level = DEFAULT_LOG_LEVEL.to_string();
    }
    config
}
