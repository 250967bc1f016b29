//! Line-oriented bot front-end.
//!
//! Stands in for a chat platform connection: each stdin line
//! `<user_id>: <text>` is one inbound message, and every message is
//! dispatched in its own task.

use std::sync::Arc;

use async_trait::async_trait;
use chatgate_commands::Dispatcher;
use chatgate_config::ChatGateConfig;
use chatgate_core::{ChatMessage, Outcome, ReplySink};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::terminal_output::{format_reply, supports_color};

/// Channel id given to every message read from stdin.
pub const STDIN_CHANNEL: &str = "stdin";

/// Parse `<user_id>: <text>` into a message.
pub fn parse_line(line: &str) -> Option<ChatMessage> {
    let (author, content) = line.split_once(':')?;
    let author = author.trim();
    if author.is_empty() || author.contains(char::is_whitespace) {
        return None;
    }
    let content = content.strip_prefix(' ').unwrap_or(content);
    Some(ChatMessage::new(author, STDIN_CHANNEL, content))
}

/// Writes replies to stdout.
pub struct StdoutSink {
    color: bool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { color: supports_color() }
    }
}

#[async_trait]
impl ReplySink for StdoutSink {
    async fn send(&self, channel: &str, text: &str) {
        println!("{}", format_reply(channel, text, self.color));
    }
}

pub struct Bot {
    dispatcher: Arc<Dispatcher>,
    config: Arc<ChatGateConfig>,
    replies: Arc<dyn ReplySink>,
}

impl Bot {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        config: Arc<ChatGateConfig>,
        replies: Arc<dyn ReplySink>,
    ) -> Self {
        Self { dispatcher, config, replies }
    }

    /// Handle one message end to end. Error outcomes are posted back to the
    /// channel, since that is the only place the user can see them.
    pub async fn on_message(&self, message: &ChatMessage) -> Option<Outcome> {
        // Never react to our own messages.
        if message.author == self.config.bot_id {
            return None;
        }

        let permission = self.config.permission_for(&message.author);
        let outcome = self
            .dispatcher
            .dispatch(message, permission, self.replies.clone())
            .await?;

        if let Outcome::Err { message: text } = &outcome {
            self.replies.send(&message.channel, text).await;
        }
        Some(outcome)
    }

    /// Read messages until EOF or until `shutdown` is notified, then wait
    /// for in-flight dispatches to finish.
    pub async fn run<R>(self: Arc<Self>, input: R, shutdown: Arc<Notify>) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!("Shutdown requested, no longer reading messages");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let Some(message) = parse_line(&line) else {
                        debug!(line = %line, "Ignoring malformed input line");
                        continue;
                    };
                    let bot = self.clone();
                    tasks.spawn(async move { bot.on_message(&message).await });
                }
                // Reap finished dispatches so the set doesn't grow unbounded.
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Dispatch task failed");
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Dispatch task failed");
            }
        }
        Ok(())
    }
}
