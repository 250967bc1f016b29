use chatgate_core::{Outcome, PermissionLevel};
use thiserror::Error;

use crate::types::{format_types, ArgType};

/// Failures surfaced to the caller while dispatching a command.
///
/// `Display` is the exact text the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Insufficient permissions\nRequired: {0}")]
    InsufficientPermission(PermissionLevel),

    #[error("Missing required arg: {0}")]
    MissingRequiredArgument(String),

    #[error("Command has no -{0} arg")]
    UnknownArgument(String),

    #[error("-{name} has wrong arg type. Accepted types: {}", format_types(.accepted))]
    TypeMismatch { name: String, accepted: Vec<ArgType> },

    #[error("Error executing command: {0}")]
    HandlerError(String),
}

impl From<DispatchError> for Outcome {
    fn from(err: DispatchError) -> Self {
        Outcome::err(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command `{0}` is already registered")]
    DuplicateCommand(String),
}
