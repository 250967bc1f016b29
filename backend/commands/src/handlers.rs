/// Built-in command handlers.
///
/// Each handler is a concrete struct implementing `CommandHandler`. The
/// catalog binds them to command names through a `HandlerTable`.
use std::sync::Arc;

use async_trait::async_trait;
use chatgate_core::Outcome;
use rand::Rng;
use tokio::sync::Notify;
use tracing::info;

use crate::dispatch::{CommandContext, CommandHandler};
use crate::types::Params;

const MAX_DICE: i64 = 100;
const MAX_SIDES: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn handle(&self, ctx: &CommandContext, _params: &Params) -> Option<Outcome> {
        ctx.reply("pong").await;
        Some(Outcome::ok())
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

/// `-cmd <name>` shows one command's help; without it, lists every command.
pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, ctx: &CommandContext, params: &Params) -> Option<Outcome> {
        let text = match params.get_str("cmd") {
            Some(name) => ctx.registry.help_for(name),
            None => {
                let mut lines = vec!["Available commands:".to_string()];
                for cmd in ctx.registry.all() {
                    let summary = cmd.help.lines().next().unwrap_or_default();
                    lines.push(format!("• {} ({}): {}", cmd.name, cmd.permission, summary));
                }
                lines.join("\n")
            }
        };
        ctx.reply(&text).await;
        Some(Outcome::ok())
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

pub struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn handle(&self, ctx: &CommandContext, params: &Params) -> Option<Outcome> {
        let text = params.get_str("text").unwrap_or_default();
        if text.is_empty() {
            return Some(Outcome::err("nothing to echo"));
        }
        ctx.reply(text).await;
        Some(Outcome::ok())
    }
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

pub struct RollHandler;

#[async_trait]
impl CommandHandler for RollHandler {
    async fn handle(&self, ctx: &CommandContext, params: &Params) -> Option<Outcome> {
        let sides = params.get_int("sides").unwrap_or(6);
        let count = params.get_int("count").unwrap_or(1);
        if !(1..=MAX_SIDES).contains(&sides) {
            return Some(Outcome::err(format!("-sides must be between 1 and {MAX_SIDES}")));
        }
        if !(1..=MAX_DICE).contains(&count) {
            return Some(Outcome::err(format!("-count must be between 1 and {MAX_DICE}")));
        }

        let rolls: Vec<i64> = {
            let mut rng = rand::thread_rng();
            (0..count).map(|_| rng.gen_range(1..=sides)).collect()
        };
        let total: i64 = rolls.iter().sum();
        let shown: Vec<String> = rolls.iter().map(ToString::to_string).collect();
        ctx.reply(&format!("🎲 {} = {}", shown.join(" + "), total)).await;
        Some(Outcome::ok())
    }
}

// ---------------------------------------------------------------------------
// kick / ban
// ---------------------------------------------------------------------------

/// Moderation notice shared by `kick` and `ban`.
///
/// Acting on the platform (actually removing the user) belongs to the
/// connection layer; this posts the notice the moderators see.
pub struct ModerationHandler {
    pub action: String,
}

impl ModerationHandler {
    pub fn new(action: impl Into<String>) -> Self {
        Self { action: action.into() }
    }
}

#[async_trait]
impl CommandHandler for ModerationHandler {
    async fn handle(&self, ctx: &CommandContext, params: &Params) -> Option<Outcome> {
        let user = params.get_str("user").unwrap_or_default();
        if user.is_empty() {
            return Some(Outcome::err("-user needs a name"));
        }
        if user == ctx.caller.id {
            return Some(Outcome::err(format!("you cannot {} yourself", self.action)));
        }

        let mut notice = format!("🔨 {} {} by {}", user, past_tense(&self.action), ctx.caller.id);
        if let Some(days) = params.get_int("days") {
            notice.push_str(&format!(" for {days} day(s)"));
        }
        if let Some(reason) = params.get_str("reason").filter(|r| !r.is_empty()) {
            notice.push_str(&format!(": {reason}"));
        }

        info!(target_user = user, action = %self.action, "Moderation action");
        ctx.reply(&notice).await;
        Some(Outcome::ok())
    }
}

fn past_tense(action: &str) -> String {
    match action {
        "ban" => "banned".to_string(),
        "kick" => "kicked".to_string(),
        other if other.ends_with('e') => format!("{other}d"),
        other => format!("{other}ed"),
    }
}

// ---------------------------------------------------------------------------
// die
// ---------------------------------------------------------------------------

/// Asks the front-end to shut down.
pub struct DieHandler {
    pub shutdown: Arc<Notify>,
}

#[async_trait]
impl CommandHandler for DieHandler {
    async fn handle(&self, ctx: &CommandContext, _params: &Params) -> Option<Outcome> {
        info!(uid = %ctx.caller.id, "Shutdown requested");
        ctx.reply("owh noe").await;
        self.shutdown.notify_one();
        Some(Outcome::ok())
    }
}
