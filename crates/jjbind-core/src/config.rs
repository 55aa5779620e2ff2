//! User configuration: the `[custom_commands]` table.
//!
//! ```toml
//! [custom_commands."show diff"]
//! key = ["U"]
//! args = ["diff", "-r", "$change_id"]
//! show = "diff"
//! ```
//!
//! Loading is strict about I/O and TOML shape but deliberately lax about
//! content: unknown show modes and unparseable key specs load fine and
//! degrade to no-ops in the engine. [`Config::lint`] reports them for the
//! `check` surface without gating anything.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "JJBIND_CONFIG";

// ---------------------------------------------------------------------------
// ShowMode
// ---------------------------------------------------------------------------

/// How a command's execution is presented in the UI.
///
/// Carried through config as a plain string. Values other than the three
/// known modes are preserved verbatim; such a command compiles and can be
/// listed, but dispatching it does nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShowMode {
    /// Run in the background, refresh the UI on completion. Serialized `""`.
    #[default]
    Silent,
    /// Run synchronously, capture stdout, open the diff pager.
    Diff,
    /// Run in the foreground with the terminal handed over.
    Interactive,
    /// Any other value, kept as written.
    Unrecognized(String),
}

impl From<String> for ShowMode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "" => Self::Silent,
            "diff" => Self::Diff,
            "interactive" => Self::Interactive,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<ShowMode> for String {
    fn from(mode: ShowMode) -> Self {
        match mode {
            ShowMode::Silent => Self::new(),
            ShowMode::Diff => "diff".to_string(),
            ShowMode::Interactive => "interactive".to_string(),
            ShowMode::Unrecognized(raw) => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// One raw command declaration, as written by the user.
///
/// Every field defaults: a missing `key` means the command is unbound, a
/// missing `args` means bare `jj`, a missing `show` means silent background
/// execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCommandDefinition {
    /// Key chord specs; alternatives, any one fires the command.
    pub key: Vec<String>,
    /// Argument templates passed to `jj`. No shell is involved.
    pub args: Vec<String>,
    /// Display mode.
    pub show: ShowMode,
}

/// Root config model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Declarations keyed by display name. BTreeMap keeps registry order
    /// deterministic (sorted by name).
    pub custom_commands: BTreeMap<String, CustomCommandDefinition>,
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Load, treating a missing file as an empty config.
    ///
    /// UIs call this at startup: no config file means no custom commands,
    /// not a startup failure.
    pub fn load_or_default(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using empty config");
            Ok(Self::default())
        }
    }

    /// Non-fatal diagnostics for the `check` surface.
    ///
    /// Lint never gates the engine: every definition compiles regardless of
    /// what is reported here.
    pub fn lint(&self) -> Vec<LintIssue> {
        let mut issues = Vec::new();
        for (name, definition) in &self.custom_commands {
            if definition.key.is_empty() {
                issues.push(LintIssue::new(
                    name,
                    "key",
                    "no key specs; the command cannot be triggered",
                ));
            }
            for spec in &definition.key {
                if let Err(reason) = crate::keys::parse_key_token(spec) {
                    issues.push(LintIssue::new(name, "key", reason));
                }
            }
            if definition.args.is_empty() {
                issues.push(LintIssue::new(
                    name,
                    "args",
                    "empty argument list; the command runs bare `jj`",
                ));
            }
            if let ShowMode::Unrecognized(raw) = &definition.show {
                issues.push(LintIssue::new(
                    name,
                    "show",
                    format!(
                        "unrecognized show mode `{raw}`; the command will do nothing \
                         (expected \"\", \"diff\", or \"interactive\")"
                    ),
                ));
            }
        }
        issues
    }
}

/// One lint finding, tied to a command and field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub command: String,
    pub field: String,
    pub message: String,
}

impl LintIssue {
    fn new(command: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Default config location: `<user config dir>/jjbind/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jjbind").join("config.toml"))
}

/// Resolve the config path: explicit argument, then `JJBIND_CONFIG`, then
/// the default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }
    default_config_path()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
