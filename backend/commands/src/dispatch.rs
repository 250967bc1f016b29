/// Command dispatch: permission gate → argument validation → handler →
/// normalized outcome.
use std::sync::Arc;

use async_trait::async_trait;
use chatgate_core::{Caller, ChatMessage, Outcome, PermissionLevel, ReplySink};
use tracing::{info, info_span, warn, Instrument};

use crate::detection::detect_command;
use crate::error::DispatchError;
use crate::permission::check_permission;
use crate::registry::{CommandDescriptor, Registry};
use crate::types::{FlagMap, Invocation, ParamValue, Params};
use crate::validation::validate_args;

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
#[derive(Clone)]
pub struct CommandContext {
    pub caller: Caller,
    pub channel: String,
    pub registry: Arc<Registry>,
    replies: Arc<dyn ReplySink>,
}

impl CommandContext {
    pub fn new(
        caller: Caller,
        channel: impl Into<String>,
        registry: Arc<Registry>,
        replies: Arc<dyn ReplySink>,
    ) -> Self {
        Self { caller, channel: channel.into(), registry, replies }
    }

    /// Send a message back to the channel the command came from.
    pub async fn reply(&self, text: &str) {
        self.replies.send(&self.channel, text).await;
    }
}

/// A command implementation.
///
/// Returning `None` breaks the contract; the dispatcher still treats it as
/// success but logs a warning. Anything a handler logs through `tracing`
/// lands in the per-invocation `command` span.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext, params: &Params) -> Option<Outcome>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    registry: Arc<Registry>,
    prefix: String,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, prefix: impl Into<String>) -> Self {
        Self { registry, prefix: prefix.into() }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse `text` into an invocation of a registered command.
    pub fn parse(&self, text: &str) -> Option<Invocation> {
        detect_command(text, &self.prefix, &self.registry)
    }

    /// Handle one inbound message. `None` means the message was not a
    /// command and nothing happened.
    pub async fn dispatch(
        &self,
        message: &ChatMessage,
        permission: PermissionLevel,
        replies: Arc<dyn ReplySink>,
    ) -> Option<Outcome> {
        let invocation = self.parse(&message.content)?;
        let command = self.registry.lookup(&invocation.name)?;
        let ctx = CommandContext::new(
            Caller::new(message.author.clone(), permission),
            message.channel.clone(),
            self.registry.clone(),
            replies,
        );
        Some(execute(command, &ctx, &invocation.params).await)
    }

    /// Help text for a command. No permission check, no parsing.
    pub fn help_for(&self, name: &str) -> String {
        self.registry.help_for(name)
    }
}

/// Run a registered command through the gate, the validator and finally
/// its handler.
async fn execute(
    command: &CommandDescriptor,
    ctx: &CommandContext,
    raw: &FlagMap<ParamValue>,
) -> Outcome {
    info!(uid = %ctx.caller.id, cmd = %command.name, params = %raw, "Executing command");

    if let Err(e) = check_permission(&ctx.caller, command.permission) {
        return e.into();
    }

    let params = match validate_args(command, raw) {
        Ok(params) => params,
        Err(e) => return e.into(),
    };

    let span = info_span!("command", uid = %ctx.caller.id, cmd = %command.name);
    let result = command.handler.handle(ctx, &params).instrument(span).await;

    match result {
        Some(Outcome::Ok) => Outcome::Ok,
        Some(Outcome::Err { message }) => DispatchError::HandlerError(message).into(),
        None => {
            warn!(
                cmd = %command.name,
                "Command returned no outcome; handlers must return Outcome::ok or Outcome::err"
            );
            Outcome::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{ArgSpec, ArgType, ArgValue};

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ReplySink for Recorder {
        async fn send(&self, channel: &str, text: &str) {
            self.sent.lock().unwrap().push((channel.to_string(), text.to_string()));
        }
    }

    /// Records the params it was called with and returns a fixed result.
    struct Probe {
        result: Option<Outcome>,
        seen: Mutex<Option<Params>>,
    }

    impl Probe {
        fn returning(result: Option<Outcome>) -> Arc<Self> {
            Arc::new(Self { result, seen: Mutex::new(None) })
        }
    }

    #[async_trait]
    impl CommandHandler for Probe {
        async fn handle(&self, ctx: &CommandContext, params: &Params) -> Option<Outcome> {
            *self.seen.lock().unwrap() = Some(params.clone());
            ctx.reply("handled").await;
            self.result.clone()
        }
    }

    fn dispatcher(probe: Arc<Probe>, permission: PermissionLevel) -> Dispatcher {
        let ban = CommandDescriptor::new("ban", probe)
            .permission(permission)
            .arg("user", ArgSpec::required([ArgType::STR]))
            .arg("days", ArgSpec::optional([ArgType::INT, ArgType::STR]))
            .help("Ban a user");
        let registry = Registry::from_descriptors([ban]).unwrap();
        Dispatcher::new(Arc::new(registry), ">>")
    }

    fn msg(content: &str) -> ChatMessage {
        ChatMessage::new("alice", "general", content)
    }

    #[tokio::test]
    async fn test_non_command_is_noop() {
        let probe = Probe::returning(Some(Outcome::ok()));
        let d = dispatcher(probe.clone(), PermissionLevel::User);
        let sink = Arc::new(Recorder::default());
        assert!(d.dispatch(&msg("hi all"), PermissionLevel::User, sink.clone()).await.is_none());
        assert!(d.dispatch(&msg(">>kick"), PermissionLevel::User, sink.clone()).await.is_none());
        assert!(probe.seen.lock().unwrap().is_none());
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_passes_typed_params_and_replies() {
        let probe = Probe::returning(Some(Outcome::ok()));
        let d = dispatcher(probe.clone(), PermissionLevel::User);
        let sink = Arc::new(Recorder::default());

        let outcome = d
            .dispatch(&msg(">>ban -user bob -days 3"), PermissionLevel::User, sink.clone())
            .await;
        assert_eq!(outcome, Some(Outcome::Ok));

        let seen = probe.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.get_str("user"), Some("bob"));
        assert_eq!(seen.get("days"), Some(&ArgValue::Int(3)));
        assert_eq!(
            *sink.sent.lock().unwrap(),
            vec![("general".to_string(), "handled".to_string())]
        );
    }

    #[tokio::test]
    async fn test_permission_is_checked_before_arguments() {
        let probe = Probe::returning(Some(Outcome::ok()));
        let d = dispatcher(probe.clone(), PermissionLevel::Admin);
        let outcome = d
            .dispatch(&msg(">>ban -bogus"), PermissionLevel::Moderator, Arc::new(Recorder::default()))
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some("Insufficient permissions\nRequired: admin"));
        assert!(probe.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let probe = Probe::returning(Some(Outcome::ok()));
        let d = dispatcher(probe.clone(), PermissionLevel::User);
        let outcome = d
            .dispatch(&msg(">>ban"), PermissionLevel::User, Arc::new(Recorder::default()))
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some("Missing required arg: user"));
        assert!(probe.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped() {
        let probe = Probe::returning(Some(Outcome::err("user not found")));
        let d = dispatcher(probe, PermissionLevel::User);
        let outcome = d
            .dispatch(&msg(">>ban -user ghost"), PermissionLevel::User, Arc::new(Recorder::default()))
            .await
            .unwrap();
        assert_eq!(outcome.message(), Some("Error executing command: user not found"));
    }

    #[tokio::test]
    async fn test_missing_outcome_is_success() {
        let probe = Probe::returning(None);
        let d = dispatcher(probe, PermissionLevel::User);
        let outcome = d
            .dispatch(&msg(">>ban -user bob"), PermissionLevel::User, Arc::new(Recorder::default()))
            .await;
        assert_eq!(outcome, Some(Outcome::Ok));
    }

    #[test]
    fn test_help_for() {
        let d = dispatcher(Probe::returning(None), PermissionLevel::Owner);
        assert_eq!(d.help_for("ban"), "Ban a user");
        assert_eq!(d.help_for("unban"), "Command not found");
    }
}
