//! Process execution: the runner trait and the production `jj` runner.
//!
//! Dispatch (see [`crate::command`]) needs exactly three primitives, so that
//! is the whole trait. [`JjRunner`] speaks to a real `jj` binary;
//! [`RecordingRunner`] is a drop-in double for tests and embedders that
//! records every call instead of spawning anything.
//!
//! No cancellation or timeout semantics live here; `jj` runs locally and the
//! embedding UI owns the lifecycle of anything long-running.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;

use crate::error::ExecError;
use crate::msg::UiMsg;

/// Environment variable overriding the `jj` binary path.
pub const JJ_BIN_ENV: &str = "JJBIND_JJ_BIN";

/// Resolve the `jj` binary: `JJBIND_JJ_BIN` if set and non-empty, else `jj`
/// from PATH.
pub fn jj_binary() -> String {
    resolve_binary(std::env::var(JJ_BIN_ENV).ok().as_deref())
}

fn resolve_binary(env_override: Option<&str>) -> String {
    match env_override {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "jj".to_string(),
    }
}

// ---------------------------------------------------------------------------
// CommandRunner: the execution boundary
// ---------------------------------------------------------------------------

/// Execution primitives the dispatch layer depends on.
///
/// Implementations decide how processes are spawned and how completion
/// messages reach the UI; dispatch only chooses which primitive to call.
pub trait CommandRunner {
    /// Launch without blocking; deliver `on_done` when the process exits,
    /// regardless of exit status. Overlapping launches are permitted and
    /// complete independently.
    fn run_in_background(&self, args: Vec<String>, on_done: UiMsg);

    /// Run synchronously and return captured stdout. Non-zero exit is an
    /// error carrying the stderr text.
    fn run_and_capture(&self, args: Vec<String>) -> crate::Result<Vec<u8>>;

    /// Run in the foreground with inherited stdio; the process owns the
    /// terminal until it exits, then `on_done` is delivered. Callers suspend
    /// any raw-mode terminal session around this.
    fn run_interactive(&self, args: Vec<String>, on_done: UiMsg);
}

// ---------------------------------------------------------------------------
// JjRunner: production implementation
// ---------------------------------------------------------------------------

/// Runs a real `jj` binary.
///
/// Background runs are spawned on the provided tokio handle and report
/// completion over the message channel; captures and interactive runs block
/// the calling thread. Process failures are logged and still deliver the
/// completion message, so the UI reloads either way.
#[derive(Debug, Clone)]
pub struct JjRunner {
    program: String,
    workdir: Option<PathBuf>,
    messages: UnboundedSender<UiMsg>,
    handle: tokio::runtime::Handle,
}

impl JjRunner {
    /// Build a runner delivering completion messages over `messages` and
    /// spawning background work on `handle`.
    pub fn new(messages: UnboundedSender<UiMsg>, handle: tokio::runtime::Handle) -> Self {
        Self {
            program: jj_binary(),
            workdir: None,
            messages,
            handle,
        }
    }

    /// Override the working directory (defaults to the process cwd).
    #[must_use]
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Override the binary (defaults to `JJBIND_JJ_BIN`, then `jj`).
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn std_command(&self, args: &[String]) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for JjRunner {
    fn run_in_background(&self, args: Vec<String>, on_done: UiMsg) {
        let program = self.program.clone();
        let workdir = self.workdir.clone();
        let messages = self.messages.clone();
        self.handle.spawn(async move {
            let mut cmd = tokio::process::Command::new(&program);
            cmd.args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped());
            if let Some(dir) = &workdir {
                cmd.current_dir(dir);
            }
            match cmd.output().await {
                Ok(output) if output.status.success() => {
                    tracing::debug!(?args, "background command finished");
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    tracing::warn!(
                        ?args,
                        status = ?output.status.code(),
                        %stderr,
                        "background command failed"
                    );
                }
                Err(err) => {
                    let err = ExecError::from_spawn(&program, &err);
                    tracing::warn!(?args, error = %err, "background command did not launch");
                }
            }
            // Completion is reported regardless of outcome.
            let _ = messages.send(on_done);
        });
    }

    fn run_and_capture(&self, args: Vec<String>) -> crate::Result<Vec<u8>> {
        let output = self
            .std_command(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| ExecError::from_spawn(&self.program, &err))?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(ExecError::CommandFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into())
        }
    }

    fn run_interactive(&self, args: Vec<String>, on_done: UiMsg) {
        match self.std_command(&args).status() {
            Ok(status) if status.success() => {
                tracing::debug!(?args, "interactive command finished");
            }
            Ok(status) => {
                tracing::warn!(
                    ?args,
                    status = ?status.code(),
                    "interactive command exited non-zero"
                );
            }
            Err(err) => {
                let err = ExecError::from_spawn(&self.program, &err);
                tracing::warn!(?args, error = %err, "interactive command did not launch");
            }
        }
        let _ = self.messages.send(on_done);
    }
}

// ---------------------------------------------------------------------------
// RecordingRunner: in-memory runner for testing
// ---------------------------------------------------------------------------

/// One recorded runner call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCall {
    Background { args: Vec<String>, on_done: UiMsg },
    Capture { args: Vec<String> },
    Interactive { args: Vec<String>, on_done: UiMsg },
}

/// Test double: records every call, spawns nothing.
///
/// Capture results are served from a queue, front first; with the queue
/// empty, captures return empty output. Completion messages that a real
/// runner would deliver asynchronously are delivered immediately and can be
/// inspected with [`delivered`](Self::delivered).
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<RunnerCall>>,
    delivered: Mutex<Vec<UiMsg>>,
    capture_results: Mutex<VecDeque<crate::Result<Vec<u8>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `run_and_capture` call.
    pub fn push_capture_result(&self, result: crate::Result<Vec<u8>>) {
        lock(&self.capture_results).push_back(result);
    }

    /// Snapshot of recorded calls, in arrival order.
    pub fn calls(&self) -> Vec<RunnerCall> {
        lock(&self.calls).clone()
    }

    /// Snapshot of messages a real runner would have delivered to the UI.
    pub fn delivered(&self) -> Vec<UiMsg> {
        lock(&self.delivered).clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run_in_background(&self, args: Vec<String>, on_done: UiMsg) {
        lock(&self.calls).push(RunnerCall::Background {
            args,
            on_done: on_done.clone(),
        });
        lock(&self.delivered).push(on_done);
    }

    fn run_and_capture(&self, args: Vec<String>) -> crate::Result<Vec<u8>> {
        lock(&self.calls).push(RunnerCall::Capture { args });
        lock(&self.capture_results)
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn run_interactive(&self, args: Vec<String>, on_done: UiMsg) {
        lock(&self.calls).push(RunnerCall::Interactive {
            args,
            on_done: on_done.clone(),
        });
        lock(&self.delivered).push(on_done);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
