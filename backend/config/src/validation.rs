//! Config validation: checks with user-friendly error messages.

use chatgate_core::PermissionLevel;
use thiserror::Error;

use crate::schema::ChatGateConfig;

/// Flag marker used by the command parser; the prefix must not contain it.
const FLAG_MARKER: char = '-';

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ChatGateConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_prefix(config, &mut report);
    validate_permissions(config, &mut report);
    report
}

fn validate_prefix(config: &ChatGateConfig, report: &mut ValidationReport) {
    let prefix = &config.prefix;
    if prefix.is_empty() {
        report.error("prefix", "Command prefix cannot be empty");
        return;
    }
    if prefix.contains(FLAG_MARKER) {
        report.error(
            "prefix",
            format!("Command prefix cannot contain the flag marker '{FLAG_MARKER}'"),
        );
    }
    if prefix.contains(char::is_whitespace) {
        report.error("prefix", "Command prefix cannot contain whitespace");
    }
}

fn validate_permissions(config: &ChatGateConfig, report: &mut ValidationReport) {
    if config.permissions.is_empty() {
        report.warn("permissions", "No permissions configured; everyone is a plain user");
        return;
    }
    if !config.permissions.values().any(|l| *l == PermissionLevel::Owner) {
        report.warn("permissions", "No owner configured; owner-only commands are unreachable");
    }
    for user in config.permissions.keys() {
        if user.trim().is_empty() {
            report.error("permissions", "User id cannot be empty");
        }
    }
    if let Some(level) = config.permissions.get(&config.bot_id) {
        report.warn(
            format!("permissions.{}", config.bot_id),
            format!("The bot's own id is granted {level}, but its messages are ignored"),
        );
    }
}
