use serde::{Deserialize, Serialize};

use crate::types::PermissionLevel;

/// An inbound chat message, as delivered by the platform connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Platform id of the author.
    pub author: String,
    /// Channel (or DM) the message arrived on; replies go back here.
    pub channel: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(
        author: impl Into<String>,
        channel: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            channel: channel.into(),
            content: content.into(),
        }
    }
}

/// Identity and effective permission of whoever sent a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub permission: PermissionLevel,
}

impl Caller {
    pub fn new(id: impl Into<String>, permission: PermissionLevel) -> Self {
        Self { id: id.into(), permission }
    }
}

/// The uniform result of running a command.
///
/// Every handler reports through this, and every gate or validator
/// rejection is turned into an `Err` carrying the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Err { message: String },
}

impl Outcome {
    pub fn ok() -> Self {
        Outcome::Ok
    }

    pub fn err(message: impl Into<String>) -> Self {
        Outcome::Err { message: message.into() }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    /// The error message, if this is an `Err`.
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Ok => None,
            Outcome::Err { message } => Some(message),
        }
    }
}
