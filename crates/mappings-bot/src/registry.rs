//! Routes prefix-command messages to mapping command variants.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use mappings_command::{CommandVariant, JsonFiles};
use serenity::prelude::TypeMapKey;
use tracing::info;

use crate::paginator::Paginators;

/// Every registered variant keyed by command name, plus what handlers need
/// to run them.
pub struct CommandRegistry {
    command_prefix: String,
    commands: HashMap<String, CommandVariant>,
    pub data_dir: PathBuf,
    pub persistence: JsonFiles,
    pub paginators: Paginators,
}

impl CommandRegistry {
    /// Register `root` and all of its children.
    pub fn new(command_prefix: impl Into<String>, root: &CommandVariant, data_dir: PathBuf) -> Self {
        let commands = root
            .with_children()
            .into_iter()
            .map(|variant| {
                info!("Registered command {}: {}", variant.name(), variant.describe());
                (variant.name(), variant)
            })
            .collect();

        Self {
            command_prefix: command_prefix.into(),
            commands,
            data_dir,
            persistence: JsonFiles,
            paginators: Paginators::new(),
        }
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<&CommandVariant> {
        self.commands.get(name)
    }

    /// Split a message into a known command and its raw arguments.
    pub fn route<'a>(&self, content: &'a str) -> Option<(&CommandVariant, &'a str)> {
        let rest = content.trim_start().strip_prefix(self.command_prefix.as_str())?;
        let (name, args) = match rest.find(char::is_whitespace) {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        let variant = self.get(&name.to_lowercase())?;
        Some((variant, args.trim()))
    }
}

impl TypeMapKey for CommandRegistry {
    type Value = Arc<CommandRegistry>;
}
