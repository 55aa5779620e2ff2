//! The compiled command set: lookup, menus, and key dispatch.

use crossterm::event::KeyEvent;

use crate::command::CustomCommand;
use crate::config::{Config, ShowMode};
use crate::selection::SelectedItem;

/// All compiled custom commands, in sorted name order.
///
/// Built once from config and immutable afterwards. Dispatch is
/// deterministic: the same config, event, and selection always pick the same
/// command.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CustomCommand>,
}

impl CommandRegistry {
    /// Compile every definition in the config.
    ///
    /// Never fails and never skips a definition: degenerate declarations
    /// compile to commands that cannot fire or do nothing, and are only
    /// warned about here.
    pub fn from_config(config: &Config) -> Self {
        let commands = config
            .custom_commands
            .iter()
            .map(|(name, definition)| {
                if let ShowMode::Unrecognized(raw) = &definition.show {
                    tracing::warn!(
                        command = %name,
                        show = %raw,
                        "unrecognized show mode; the command will do nothing when triggered"
                    );
                }
                CustomCommand::compile(name.clone(), definition)
            })
            .collect();
        Self { commands }
    }

    /// All commands, sorted by name.
    pub fn commands(&self) -> &[CustomCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Look up one command by its declared name.
    pub fn get(&self, name: &str) -> Option<&CustomCommand> {
        self.commands.iter().find(|cmd| cmd.name() == name)
    }

    /// Commands applicable to the current selection, for menu rendering.
    pub fn applicable<'a, 'b>(
        &'a self,
        selected: &'b SelectedItem,
    ) -> impl Iterator<Item = &'a CustomCommand> {
        self.commands
            .iter()
            .filter(move |cmd| cmd.is_applicable(selected))
    }

    /// First applicable command whose trigger matches the event.
    ///
    /// Applicability gates key dispatch exactly as it gates menu listing: an
    /// inapplicable command never fires on its key, which leaves the chord
    /// free for another command bound to it.
    pub fn match_key(&self, event: &KeyEvent, selected: &SelectedItem) -> Option<&CustomCommand> {
        self.commands
            .iter()
            .find(|cmd| cmd.trigger().matches(event) && cmd.is_applicable(selected))
    }

    /// `(keys label, name)` pairs for the applicable set, for help footers.
    pub fn help_entries(&self, selected: &SelectedItem) -> Vec<(String, String)> {
        self.applicable(selected)
            .map(|cmd| {
                (
                    cmd.trigger().keys_label().to_string(),
                    cmd.name().to_string(),
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
