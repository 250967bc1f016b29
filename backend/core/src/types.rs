use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a caller is authorized to invoke.
///
/// Levels form a total order: `User < Moderator < Admin < Owner`. A caller
/// may run a command when its level meets or exceeds the command's
/// required level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[default]
    User,
    Moderator,
    Admin,
    Owner,
}

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 4] = [
        PermissionLevel::User,
        PermissionLevel::Moderator,
        PermissionLevel::Admin,
        PermissionLevel::Owner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::User => "user",
            PermissionLevel::Moderator => "moderator",
            PermissionLevel::Admin => "admin",
            PermissionLevel::Owner => "owner",
        }
    }

    /// Returns `true` if this level is allowed to run something requiring `required`.
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown permission level `{0}` (expected user, moderator, admin or owner)")]
pub struct ParsePermissionError(pub String);

impl FromStr for PermissionLevel {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        PermissionLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| ParsePermissionError(s.to_string()))
    }
}
