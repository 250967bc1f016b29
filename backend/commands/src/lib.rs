pub mod catalog;
pub mod detection;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod permission;
pub mod registry;
pub mod types;
pub mod validation;

use std::sync::Arc;

use tokio::sync::Notify;

pub use catalog::{CatalogError, CommandCatalog, HandlerTable};
pub use detection::{detect_command, DEFAULT_PREFIX, FLAG_MARKER};
pub use dispatch::{CommandContext, CommandHandler, Dispatcher};
pub use error::{DispatchError, RegistryError};
pub use handlers::{
    DieHandler, EchoHandler, HelpHandler, ModerationHandler, PingHandler, RollHandler,
};
pub use permission::check_permission;
pub use registry::{CommandDescriptor, Registry, HELP_NOT_FOUND};
pub use types::{ArgSpec, ArgType, ArgValue, FlagMap, Invocation, ParamValue, Params, ScalarType};
pub use validation::validate_args;

/// Build a handler table pre-wired with all built-in handlers.
///
/// `shutdown` is notified when an owner runs `die`.
pub fn builtin_handlers(shutdown: Arc<Notify>) -> HandlerTable {
    let mut table = HandlerTable::new();
    table.register("ping", Arc::new(PingHandler));
    table.register("help", Arc::new(HelpHandler));
    table.register("echo", Arc::new(EchoHandler));
    table.register("roll", Arc::new(RollHandler));
    table.register("kick", Arc::new(ModerationHandler::new("kick")));
    table.register("ban", Arc::new(ModerationHandler::new("ban")));
    table.register("die", Arc::new(DieHandler { shutdown }));
    table
}
