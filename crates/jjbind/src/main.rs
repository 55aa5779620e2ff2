//! jjbind CLI: validate, inspect, and dispatch keystroke-bound `jj` commands.
//!
//! # Usage
//!
//! ```bash
//! # Lint the config
//! jjbind check
//!
//! # Show the compiled registry
//! jjbind list
//!
//! # Show what a file row offers, with resolved argv
//! jjbind list --change-id abc123 --file-path src/lib.rs
//!
//! # Dispatch one command against a revision
//! jjbind run "show diff" --change-id abc123
//!
//! # Print the resolved invocation without executing
//! jjbind run "tug bookmark" --change-id abc123 --dry-run
//! ```
//!
//! Exit codes: 0 on success, 1 for findings (lint issues, unknown command
//! name), 2 for environment failures (unreadable or unparseable config).

#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use jjbind_core::{
    CONFIG_ENV, CommandRegistry, Config, CustomCommand, JjRunner, ResolvedInvocation, SelectedItem,
    ShowMode, UiMsg, jj_binary, resolve_config_path,
};

/// Environment variable controlling the stderr log filter.
const LOG_ENV: &str = "JJBIND_LOG";

/// Keystroke-bound custom `jj` commands: lint them, list them, run them.
#[derive(Parser, Debug)]
#[command(name = "jjbind")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file path (default: platform config directory).
    #[arg(long, global = true, value_name = "PATH", env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Output format for structured commands.
    #[arg(long, global = true, value_enum, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the config and report lint findings.
    Check,
    /// Print the compiled command registry.
    List(ListArgs),
    /// Resolve a named command against a selection and dispatch it.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Command name as declared in config.
    name: String,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Print the resolved invocation without executing it.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

/// The UI selection, reconstructed from flags.
#[derive(Args, Debug)]
struct SelectionArgs {
    /// Change id of the selected revision (or of the selected file's
    /// revision).
    #[arg(long, value_name = "ID")]
    change_id: Option<String>,

    /// Path of the selected file within the revision.
    #[arg(long, value_name = "PATH", requires = "change_id")]
    file_path: Option<String>,

    /// Id of the selected operation.
    #[arg(long, value_name = "ID", conflicts_with_all = ["change_id", "file_path"])]
    operation_id: Option<String>,
}

impl SelectionArgs {
    fn to_selected_item(&self) -> SelectedItem {
        match (&self.change_id, &self.file_path, &self.operation_id) {
            (Some(change_id), Some(path), _) => SelectedItem::file(change_id.clone(), path.clone()),
            (Some(change_id), None, _) => SelectedItem::revision(change_id.clone()),
            (None, _, Some(operation_id)) => SelectedItem::operation(operation_id.clone()),
            (None, _, None) => SelectedItem::None,
        }
    }

    fn is_empty(&self) -> bool {
        self.change_id.is_none() && self.file_path.is_none() && self.operation_id.is_none()
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Check => run_check(&cli),
        Commands::List(args) => run_list(&cli, args),
        Commands::Run(args) => run_run(&cli, args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    resolve_config_path(cli.config.as_deref())
        .context("cannot determine a config path; pass --config or set JJBIND_CONFIG")
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn run_check(cli: &Cli) -> anyhow::Result<ExitCode> {
    let path = config_path(cli)?;
    let config = Config::load(&path)?;
    let issues = config.lint();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&issues)?);
        }
        OutputFormat::Plain => {
            println!("Config: {}", path.display());
            println!("Commands: {}", config.custom_commands.len());
            println!("Issues: {}", issues.len());
            for issue in &issues {
                println!("  {}: {}: {}", issue.command, issue.field, issue.message);
            }
        }
    }

    if issues.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

/// One listed command, in either template or resolved form.
#[derive(Debug, Serialize)]
struct CommandEntry {
    name: String,
    keys: String,
    show: String,
    args: Vec<String>,
}

impl CommandEntry {
    fn new(cmd: &CustomCommand, args: Vec<String>) -> Self {
        Self {
            name: cmd.name().to_string(),
            keys: cmd.trigger().keys_label().to_string(),
            show: show_label(cmd.show()).to_string(),
            args,
        }
    }
}

fn show_label(show: &ShowMode) -> &str {
    match show {
        ShowMode::Silent => "silent",
        ShowMode::Diff => "diff",
        ShowMode::Interactive => "interactive",
        ShowMode::Unrecognized(other) => other,
    }
}

fn run_list(cli: &Cli, args: &ListArgs) -> anyhow::Result<ExitCode> {
    let path = config_path(cli)?;
    let config = Config::load_or_default(&path)?;
    let registry = CommandRegistry::from_config(&config);
    let selected = args.selection.to_selected_item();

    // Without selection flags the raw templates are listed; with them the
    // listing narrows to applicable commands and shows substituted argv.
    let entries: Vec<CommandEntry> = if args.selection.is_empty() {
        registry
            .commands()
            .iter()
            .map(|cmd| CommandEntry::new(cmd, cmd.args().to_vec()))
            .collect()
    } else {
        registry
            .applicable(&selected)
            .map(|cmd| CommandEntry::new(cmd, cmd.resolve(&selected).args().to_vec()))
            .collect()
    };

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Plain => {
            if entries.is_empty() {
                if args.selection.is_empty() {
                    println!("no custom commands configured");
                } else {
                    println!("no commands applicable to this selection");
                }
            }
            for entry in &entries {
                let keys = if entry.keys.is_empty() {
                    "(unbound)"
                } else {
                    entry.keys.as_str()
                };
                println!("{}", entry.name);
                println!("  keys: {keys}");
                println!("  show: {}", entry.show);
                println!("  args: {}", entry.args.join(" "));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn run_run(cli: &Cli, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let path = config_path(cli)?;
    let config = Config::load_or_default(&path)?;
    let registry = CommandRegistry::from_config(&config);

    let Some(cmd) = registry.get(&args.name) else {
        eprintln!(
            "Error: no command named \"{}\" in {}",
            args.name,
            path.display()
        );
        eprintln!("Hint: `jjbind list` shows the configured commands");
        return Ok(ExitCode::from(1));
    };

    let selected = args.selection.to_selected_item();
    let resolved = cmd.resolve(&selected);

    if args.dry_run {
        return print_dry_run(cli, cmd, &resolved);
    }

    if let ShowMode::Unrecognized(mode) = resolved.show() {
        eprintln!("show mode \"{mode}\" is not recognized; nothing was executed");
        return Ok(ExitCode::SUCCESS);
    }

    dispatch_resolved(resolved)
}

fn print_dry_run(
    cli: &Cli,
    cmd: &CustomCommand,
    resolved: &ResolvedInvocation,
) -> anyhow::Result<ExitCode> {
    let program = jj_binary();
    match cli.format {
        OutputFormat::Json => {
            let report = json!({
                "name": cmd.name(),
                "program": program,
                "args": resolved.args(),
                "show": show_label(resolved.show()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            println!("name: {}", cmd.name());
            println!("show: {}", show_label(resolved.show()));
            println!("exec: {} {}", program, resolved.args().join(" "));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn dispatch_resolved(resolved: ResolvedInvocation) -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let runner = JjRunner::new(tx, runtime.handle().clone());

    let show = resolved.show().clone();
    tracing::debug!(args = ?resolved.args(), show = show_label(&show), "dispatching");

    match resolved.dispatch(&runner) {
        Some(UiMsg::ShowDiff { output }) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&output)
                .context("failed to write diff output")?;
            stdout.flush().context("failed to flush diff output")?;
        }
        Some(UiMsg::Refresh) | None => {}
    }

    // Background and interactive runs report completion over the channel;
    // wait for it so the child finishes before the CLI exits.
    if matches!(show, ShowMode::Silent | ShowMode::Interactive) {
        let _ = runtime.block_on(rx.recv());
    }

    Ok(ExitCode::SUCCESS)
}
