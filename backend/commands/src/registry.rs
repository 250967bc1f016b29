/// Command registry: the read-only table of known commands.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chatgate_core::PermissionLevel;

use crate::dispatch::CommandHandler;
use crate::error::RegistryError;
use crate::types::{ArgSpec, FlagMap};

/// Help string returned for names the registry does not know.
pub const HELP_NOT_FOUND: &str = "Command not found";

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Everything the dispatcher needs to know about one command.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub handler: Arc<dyn CommandHandler>,
    pub permission: PermissionLevel,
    /// Flag name → spec, in declaration order.
    pub args: FlagMap<ArgSpec>,
    pub help: String,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            handler,
            permission: PermissionLevel::User,
            args: FlagMap::new(),
            help: String::new(),
        }
    }

    pub fn permission(mut self, level: PermissionLevel) -> Self {
        self.permission = level;
        self
    }

    pub fn arg(mut self, flag: impl Into<String>, spec: ArgSpec) -> Self {
        self.args.insert(flag, spec);
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    /// Flags that must be present before the handler runs.
    pub fn required_args(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter(|(_, spec)| !spec.optional).map(|(name, _)| name)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("permission", &self.permission)
            .field("args", &self.args)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Built once at startup, then shared read-only (behind an `Arc`) with
/// every dispatch.
#[derive(Debug, Default)]
pub struct Registry {
    commands: HashMap<String, CommandDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of descriptors, failing on the first
    /// duplicate name.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = CommandDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if self.commands.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateCommand(descriptor.name));
        }
        self.commands.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// `None` means "not a command", never an error.
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn help_for(&self, name: &str) -> String {
        match self.commands.get(name) {
            Some(cmd) => cmd.help.clone(),
            None => HELP_NOT_FOUND.to_string(),
        }
    }

    /// All commands, sorted by name.
    pub fn all(&self) -> Vec<&CommandDescriptor> {
        let mut all: Vec<_> = self.commands.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
