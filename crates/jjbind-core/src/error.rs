//! Error types for jjbind.
//!
//! Two fallible domains, folded into one crate-level [`Error`]: config
//! loading ([`ConfigError`]) and process execution ([`ExecError`]). The
//! engine itself (compile, applicability, resolution, dispatch) is
//! infallible and never constructs these.

use std::io;
use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error for jjbind-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Errors loading or parsing a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML (or has the wrong shape).
    #[error("failed to parse config at {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors running the `jj` binary.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The binary does not exist on PATH (or at the configured override).
    #[error("jj binary `{program}` not found; is Jujutsu installed and on PATH?")]
    JjNotFound { program: String },

    /// The process could not be spawned.
    #[error("failed to launch `{program}`: {message}")]
    LaunchFailed { program: String, message: String },

    /// The process ran and exited non-zero.
    #[error("command failed: {stderr}")]
    CommandFailed { stderr: String },
}

impl ExecError {
    /// Categorize a spawn-time I/O error.
    pub(crate) fn from_spawn(program: &str, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::JjNotFound {
                program: program.to_string(),
            },
            io::ErrorKind::PermissionDenied => Self::LaunchFailed {
                program: program.to_string(),
                message: "permission denied".to_string(),
            },
            _ => Self::LaunchFailed {
                program: program.to_string(),
                message: err.to_string(),
            },
        }
    }
}
