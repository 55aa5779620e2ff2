//! Custom command descriptors: compilation, applicability, resolution,
//! and dispatch.
//!
//! A [`CustomCommand`] is the compiled form of one config declaration. The
//! lifecycle is a straight pipeline:
//!
//! ```text
//! CustomCommandDefinition --compile--> CustomCommand
//!     --is_applicable(selection)--> bool           (menu and key gating)
//!     --resolve(selection)--> ResolvedInvocation   (placeholder substitution)
//!     --dispatch(runner)--> Option<UiMsg>          (one of three show modes)
//! ```
//!
//! Everything up to dispatch is pure and infallible. Unknown show modes,
//! unparseable key specs, and empty argv all compile fine and fall out as
//! no-ops further down, never as errors.

use std::collections::HashMap;

use crate::config::{CustomCommandDefinition, ShowMode};
use crate::exec::CommandRunner;
use crate::keys::KeyTrigger;
use crate::msg::UiMsg;
use crate::selection::SelectedItem;

/// Replaced with the selected revision's change id.
pub const CHANGE_ID_PLACEHOLDER: &str = "$change_id";
/// Replaced with the selected file's repo-relative path.
pub const FILE_PLACEHOLDER: &str = "$file";
/// Replaced with the selected operation's id.
pub const OPERATION_ID_PLACEHOLDER: &str = "$operation_id";

// ---------------------------------------------------------------------------
// CustomCommand: the compiled descriptor
// ---------------------------------------------------------------------------

/// One compiled custom command.
///
/// Immutable after [`compile`](Self::compile). The requirement flags are a
/// pure function of the argument templates: a command "needs" an identifier
/// exactly when some template mentions its placeholder.
#[derive(Debug, Clone)]
pub struct CustomCommand {
    name: String,
    trigger: KeyTrigger,
    args: Vec<String>,
    show: ShowMode,
    needs_change_id: bool,
    needs_file: bool,
    needs_operation_id: bool,
}

impl CustomCommand {
    /// Compile one declaration.
    ///
    /// Derives the requirement flags by scanning every argument template for
    /// literal containment of the corresponding placeholder, and builds the
    /// key trigger with the command name as its help label. There are no
    /// error conditions.
    pub fn compile(name: impl Into<String>, definition: &CustomCommandDefinition) -> Self {
        let name = name.into();
        let contains =
            |placeholder: &str| definition.args.iter().any(|arg| arg.contains(placeholder));
        Self {
            trigger: KeyTrigger::compile(&definition.key, name.as_str()),
            args: definition.args.clone(),
            show: definition.show.clone(),
            needs_change_id: contains(CHANGE_ID_PLACEHOLDER),
            needs_file: contains(FILE_PLACEHOLDER),
            needs_operation_id: contains(OPERATION_ID_PLACEHOLDER),
            name,
        }
    }

    /// Command name as declared in config (also the trigger's help label).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled key trigger.
    pub fn trigger(&self) -> &KeyTrigger {
        &self.trigger
    }

    /// Raw argument templates, kept verbatim.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Display mode.
    pub fn show(&self) -> &ShowMode {
        &self.show
    }

    /// True when no argument template references any placeholder.
    pub fn is_selection_independent(&self) -> bool {
        !self.needs_change_id && !self.needs_file && !self.needs_operation_id
    }

    /// Whether this command should be offered for the current selection.
    ///
    /// A command that references no placeholder is applicable everywhere.
    /// Otherwise the selection variant alone decides: a revision satisfies
    /// `$change_id`, a file satisfies `$file` (and only `$file` -- a command
    /// that wants just `$change_id` is not offered on a file row, even
    /// though resolving it there would supply a change id), an operation
    /// satisfies `$operation_id`, and an empty selection satisfies nothing.
    pub fn is_applicable(&self, selected: &SelectedItem) -> bool {
        if self.is_selection_independent() {
            return true;
        }
        match selected {
            SelectedItem::Revision { .. } => self.needs_change_id,
            SelectedItem::File { .. } => self.needs_file,
            SelectedItem::Operation { .. } => self.needs_operation_id,
            SelectedItem::None => false,
        }
    }

    /// Substitute placeholders against the selection.
    ///
    /// The replacement table depends only on the selection variant and is
    /// applied to every argument with literal replace-all, independent of
    /// the requirement flags and of applicability. Placeholders the
    /// selection cannot supply stay in the output verbatim. Never fails.
    pub fn resolve(&self, selected: &SelectedItem) -> ResolvedInvocation {
        let mut replacements: HashMap<&'static str, &str> = HashMap::new();
        match selected {
            SelectedItem::Revision { change_id } => {
                replacements.insert(CHANGE_ID_PLACEHOLDER, change_id);
            }
            SelectedItem::File { change_id, path } => {
                replacements.insert(CHANGE_ID_PLACEHOLDER, change_id);
                replacements.insert(FILE_PLACEHOLDER, path);
            }
            SelectedItem::Operation { operation_id } => {
                replacements.insert(OPERATION_ID_PLACEHOLDER, operation_id);
            }
            SelectedItem::None => {}
        }

        let args = self
            .args
            .iter()
            .map(|template| {
                let mut arg = template.clone();
                for (placeholder, value) in &replacements {
                    arg = arg.replace(placeholder, value);
                }
                arg
            })
            .collect();

        ResolvedInvocation {
            args,
            show: self.show.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedInvocation: dispatch
// ---------------------------------------------------------------------------

/// A fully substituted invocation, ready to hand to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInvocation {
    args: Vec<String>,
    show: ShowMode,
}

impl ResolvedInvocation {
    /// Substituted argv, passed to `jj` as-is (no shell involved).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Display mode this invocation dispatches under.
    pub fn show(&self) -> &ShowMode {
        &self.show
    }

    /// Hand the invocation to the runner according to its show mode.
    ///
    /// At most one runner call and at most one message:
    /// - silent: background run with a refresh signal, no message;
    /// - diff: synchronous capture, a runner error is discarded, always one
    ///   show-diff message (possibly with empty output), no refresh;
    /// - interactive: foreground run with a refresh signal, no message;
    /// - unrecognized mode: nothing at all.
    pub fn dispatch<R: CommandRunner + ?Sized>(self, runner: &R) -> Option<UiMsg> {
        match self.show {
            ShowMode::Silent => {
                runner.run_in_background(self.args, UiMsg::Refresh);
                None
            }
            ShowMode::Diff => {
                let output = match runner.run_and_capture(self.args) {
                    Ok(output) => output,
                    Err(err) => {
                        tracing::debug!(
                            error = %err,
                            "diff capture failed; opening pager with empty output"
                        );
                        Vec::new()
                    }
                };
                Some(UiMsg::ShowDiff { output })
            }
            ShowMode::Interactive => {
                runner.run_interactive(self.args, UiMsg::Refresh);
                None
            }
            ShowMode::Unrecognized(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
