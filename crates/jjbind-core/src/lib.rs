//! jjbind-core: keystroke-bound custom commands for Jujutsu terminal UIs.
//!
//! Users declare external `jj` commands in TOML, bind them to key chords, and
//! template arguments with placeholders resolved against the selected UI
//! item. This crate is the whole engine: it loads the declarations, compiles
//! them, decides applicability, substitutes placeholders, and dispatches
//! through a pluggable process runner. It renders nothing; the embedding UI
//! owns menus, help footers, and the diff pager.
//!
//! Pipeline:
//!
//! ```text
//! config.toml -> Config -> CommandRegistry -> match_key(event, selection)
//!     -> CustomCommand -> resolve(selection) -> ResolvedInvocation
//!     -> dispatch(runner) -> Option<UiMsg>
//! ```
//!
//! The engine is fail-soft by construction: malformed key specs, unknown show
//! modes, and unresolvable placeholders never error. They degrade to commands
//! that do not fire, do nothing, or pass their argv through verbatim. The
//! only fallible surfaces are config I/O and process execution.

#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod error;
pub mod exec;
pub mod keys;
pub mod msg;
pub mod registry;
pub mod selection;

pub use command::{
    CHANGE_ID_PLACEHOLDER, CustomCommand, FILE_PLACEHOLDER, OPERATION_ID_PLACEHOLDER,
    ResolvedInvocation,
};
pub use config::{
    CONFIG_ENV, Config, CustomCommandDefinition, LintIssue, ShowMode, default_config_path,
    resolve_config_path,
};
pub use error::{ConfigError, Error, ExecError, Result};
pub use exec::{CommandRunner, JJ_BIN_ENV, JjRunner, RecordingRunner, RunnerCall, jj_binary};
pub use keys::{KeyPattern, KeyTrigger, parse_key_token};
pub use msg::UiMsg;
pub use registry::CommandRegistry;
pub use selection::SelectedItem;
