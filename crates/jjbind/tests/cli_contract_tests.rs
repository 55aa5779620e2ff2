//! CLI contract tests.
//!
//! These treat the `jjbind` binary as a black box and pin its external
//! contract: exit codes, stdout/stderr discipline, JSON shapes, and the
//! absence of ANSI escapes in plain output. No test talks to a real `jj`;
//! the binary is pointed at `/nonexistent/jj` unless a test explicitly
//! substitutes a harmless stand-in like `true` or `echo`.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Fixture used by most list/run tests. Contains one command per show mode
/// plus one with an unrecognized mode.
const CONFIG: &str = r#"
[custom_commands."show diff"]
key = ["U"]
args = ["diff", "-r", "$change_id"]
show = "diff"

[custom_commands."annotate file"]
key = ["U"]
args = ["file", "annotate", "$file"]
show = "diff"

[custom_commands."resolve conflicts"]
key = ["R", "ctrl+r"]
args = ["resolve", "$file"]
show = "interactive"

[custom_commands."tug bookmark"]
key = ["ctrl+t"]
args = ["bookmark", "move", "--to", "$change_id"]
show = ""

[custom_commands."broken popup"]
key = ["p"]
args = ["log"]
show = "popup"
"#;

/// Fixture that trips every lint class once.
const LINTY_CONFIG: &str = r#"
[custom_commands."bad key"]
key = ["ctrl+"]
args = ["log"]

[custom_commands."no args"]
key = ["x"]

[custom_commands."unbound"]
args = ["log"]

[custom_commands."weird show"]
key = ["y"]
args = ["log"]
show = "popup"
"#;

/// Fixture with nothing to report.
const CLEAN_CONFIG: &str = r#"
[custom_commands."show diff"]
key = ["U"]
args = ["diff", "-r", "$change_id"]
show = "diff"

[custom_commands."tug bookmark"]
key = ["ctrl+t"]
args = ["bookmark", "move", "--to", "$change_id"]
"#;

fn setup_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).expect("write config");
    (dir, path)
}

/// Base command with a hermetic environment: config pinned to the fixture,
/// `jj` pinned to a path that cannot exist, logging left at its default.
fn jjbind_cmd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("jjbind").expect("jjbind binary builds");
    cmd.env("JJBIND_CONFIG", config)
        .env("JJBIND_JJ_BIN", "/nonexistent/jj")
        .env_remove("JJBIND_LOG");
    cmd
}

fn assert_no_ansi(output: &str, context: &str) {
    assert!(
        !output.contains('\u{1b}'),
        "{context}: output contains ANSI escapes: {output:?}"
    );
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn contract_check_clean_config_exits_zero() {
    let (_dir, config) = setup_config(CLEAN_CONFIG);
    let assert = jjbind_cmd(&config).arg("check").assert().success();
    let stdout = stdout_of(&assert);
    assert_no_ansi(&stdout, "check plain");
    assert!(stdout.contains("Commands: 2"), "stdout: {stdout}");
    assert!(stdout.contains("Issues: 0"), "stdout: {stdout}");
}

#[test]
fn contract_check_reports_every_lint_class_and_exits_one() {
    let (_dir, config) = setup_config(LINTY_CONFIG);
    let assert = jjbind_cmd(&config).arg("check").assert().code(1);
    let stdout = stdout_of(&assert);
    assert_no_ansi(&stdout, "check plain");
    assert!(stdout.contains("Issues: 4"), "stdout: {stdout}");
    assert!(stdout.contains("bad key: key: unknown key"), "stdout: {stdout}");
    assert!(stdout.contains("no args: args:"), "stdout: {stdout}");
    assert!(stdout.contains("unbound: key: no key specs"), "stdout: {stdout}");
    assert!(
        stdout.contains("weird show: show: unrecognized show mode `popup`"),
        "stdout: {stdout}"
    );
}

#[test]
fn contract_check_json_is_a_parseable_issue_array() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args(["check", "--format", "json"])
        .assert()
        .code(1);
    let stdout = stdout_of(&assert);
    let issues: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let issues = issues.as_array().expect("top-level array");
    assert_eq!(issues.len(), 1, "stdout: {stdout}");
    assert_eq!(issues[0]["command"], "broken popup");
    assert_eq!(issues[0]["field"], "show");
    assert!(
        issues[0]["message"]
            .as_str()
            .is_some_and(|m| m.contains("popup")),
        "stdout: {stdout}"
    );
}

#[test]
fn contract_check_missing_config_exits_two() {
    let dir = TempDir::new().expect("create tempdir");
    let missing = dir.path().join("absent.toml");
    let assert = jjbind_cmd(&missing).arg("check").assert().code(2);
    let stderr = stderr_of(&assert);
    assert!(stderr.contains("failed to read config"), "stderr: {stderr}");
}

#[test]
fn contract_check_invalid_toml_exits_two() {
    let (_dir, config) = setup_config("custom_commands = nope");
    let assert = jjbind_cmd(&config).arg("check").assert().code(2);
    let stderr = stderr_of(&assert);
    assert!(stderr.contains("failed to parse config"), "stderr: {stderr}");
}

#[test]
fn contract_config_flag_overrides_env() {
    let (_broken_dir, broken) = setup_config("custom_commands = nope");
    let (_clean_dir, clean) = setup_config(CLEAN_CONFIG);
    // Env points at the broken file; the flag must win.
    jjbind_cmd(&broken)
        .args(["check", "--config"])
        .arg(&clean)
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn contract_list_plain_shows_all_commands_without_ansi() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config).arg("list").assert().success();
    let stdout = stdout_of(&assert);
    assert_no_ansi(&stdout, "list plain");
    for name in [
        "annotate file",
        "broken popup",
        "resolve conflicts",
        "show diff",
        "tug bookmark",
    ] {
        assert!(stdout.contains(name), "missing {name}: {stdout}");
    }
    assert!(stdout.contains("keys: R/ctrl+r"), "stdout: {stdout}");
    assert!(stdout.contains("show: silent"), "stdout: {stdout}");
    assert!(
        stdout.contains("args: diff -r $change_id"),
        "stdout: {stdout}"
    );
}

#[test]
fn contract_list_json_is_sorted_with_stable_fields() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args(["list", "--format", "json"])
        .assert()
        .success();
    let entries: serde_json::Value =
        serde_json::from_str(&stdout_of(&assert)).expect("valid JSON");
    let entries = entries.as_array().expect("top-level array");
    assert_eq!(entries.len(), 5);
    let names: Vec<&str> = entries
        .iter()
        .map(|e| e["name"].as_str().expect("name string"))
        .collect();
    assert_eq!(
        names,
        [
            "annotate file",
            "broken popup",
            "resolve conflicts",
            "show diff",
            "tug bookmark"
        ]
    );
    for entry in entries {
        assert!(entry["keys"].is_string());
        assert!(entry["show"].is_string());
        assert!(entry["args"].is_array());
    }
}

#[test]
fn contract_list_revision_selection_filters_and_resolves() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args(["list", "--change-id", "xyzq", "--format", "json"])
        .assert()
        .success();
    let entries: serde_json::Value =
        serde_json::from_str(&stdout_of(&assert)).expect("valid JSON");
    let entries = entries.as_array().expect("top-level array");
    let names: Vec<&str> = entries
        .iter()
        .map(|e| e["name"].as_str().expect("name string"))
        .collect();
    // File-only commands are not offered on a revision row.
    assert_eq!(names, ["broken popup", "show diff", "tug bookmark"]);
    let show_diff = &entries[1];
    assert_eq!(show_diff["args"][2], "xyzq");
}

#[test]
fn contract_list_file_selection_excludes_change_id_only_commands() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args([
            "list",
            "--change-id",
            "xyzq",
            "--file-path",
            "src/lib.rs",
            "--format",
            "json",
        ])
        .assert()
        .success();
    let entries: serde_json::Value =
        serde_json::from_str(&stdout_of(&assert)).expect("valid JSON");
    let entries = entries.as_array().expect("top-level array");
    let names: Vec<&str> = entries
        .iter()
        .map(|e| e["name"].as_str().expect("name string"))
        .collect();
    // A file row offers $file commands, not commands that want only
    // $change_id, even though resolving those would supply a change id.
    assert_eq!(names, ["annotate file", "broken popup", "resolve conflicts"]);
    assert_eq!(entries[0]["args"][2], "src/lib.rs");
}

#[test]
fn contract_list_file_path_requires_change_id() {
    let (_dir, config) = setup_config(CONFIG);
    jjbind_cmd(&config)
        .args(["list", "--file-path", "src/lib.rs"])
        .assert()
        .code(2);
}

#[test]
fn contract_list_missing_config_is_empty_and_ok() {
    let dir = TempDir::new().expect("create tempdir");
    let missing = dir.path().join("absent.toml");
    let assert = jjbind_cmd(&missing).arg("list").assert().success();
    assert!(
        stdout_of(&assert).contains("no custom commands configured"),
        "stdout: {}",
        stdout_of(&assert)
    );
}

#[test]
fn contract_logs_stay_off_stdout() {
    let dir = TempDir::new().expect("create tempdir");
    let missing = dir.path().join("absent.toml");
    let assert = jjbind_cmd(&missing)
        .env("JJBIND_LOG", "debug")
        .arg("list")
        .assert()
        .success();
    // Debug logging (including the missing-config note) goes to stderr;
    // stdout carries exactly the listing.
    assert_eq!(stdout_of(&assert), "no custom commands configured\n");
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn contract_run_dry_run_prints_resolved_invocation_without_executing() {
    let (_dir, config) = setup_config(CONFIG);
    // The pinned binary does not exist; exit 0 proves nothing was spawned.
    let assert = jjbind_cmd(&config)
        .args(["run", "show diff", "--change-id", "abc123", "--dry-run"])
        .assert()
        .success();
    let stdout = stdout_of(&assert);
    assert!(stdout.contains("name: show diff"), "stdout: {stdout}");
    assert!(stdout.contains("show: diff"), "stdout: {stdout}");
    assert!(
        stdout.contains("exec: /nonexistent/jj diff -r abc123"),
        "stdout: {stdout}"
    );
}

#[test]
fn contract_run_dry_run_json_reports_program_and_argv() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args([
            "run",
            "tug bookmark",
            "--change-id",
            "abc123",
            "--dry-run",
            "--format",
            "json",
        ])
        .assert()
        .success();
    let report: serde_json::Value =
        serde_json::from_str(&stdout_of(&assert)).expect("valid JSON");
    assert_eq!(report["name"], "tug bookmark");
    assert_eq!(report["program"], "/nonexistent/jj");
    assert_eq!(report["show"], "silent");
    assert_eq!(
        report["args"],
        serde_json::json!(["bookmark", "move", "--to", "abc123"])
    );
}

#[test]
fn contract_run_dry_run_keeps_unsupplied_placeholders_verbatim() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args(["run", "show diff", "--dry-run"])
        .assert()
        .success();
    assert!(
        stdout_of(&assert).contains("diff -r $change_id"),
        "stdout: {}",
        stdout_of(&assert)
    );
}

#[test]
fn contract_run_unknown_name_exits_one_with_hint() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args(["run", "shw diff", "--change-id", "abc123"])
        .assert()
        .code(1);
    let stderr = stderr_of(&assert);
    assert!(
        stderr.contains("no command named \"shw diff\""),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("jjbind list"), "stderr: {stderr}");
}

#[test]
fn contract_run_unrecognized_show_mode_is_inert() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .args(["run", "broken popup"])
        .assert()
        .success();
    assert_eq!(stdout_of(&assert), "", "stdout must stay empty");
    assert!(
        stderr_of(&assert).contains("show mode \"popup\" is not recognized"),
        "stderr: {}",
        stderr_of(&assert)
    );
}

#[test]
fn contract_run_silent_mode_executes_and_exits_zero() {
    let (_dir, config) = setup_config(CONFIG);
    jjbind_cmd(&config)
        .env("JJBIND_JJ_BIN", "true")
        .args(["run", "tug bookmark", "--change-id", "abc123"])
        .assert()
        .success();
}

#[test]
fn contract_run_silent_mode_tolerates_a_failing_binary() {
    let (_dir, config) = setup_config(CONFIG);
    // Process failures are logged, not surfaced; the contract is exit 0.
    jjbind_cmd(&config)
        .env("JJBIND_JJ_BIN", "false")
        .args(["run", "tug bookmark", "--change-id", "abc123"])
        .assert()
        .success();
}

#[test]
fn contract_run_diff_mode_streams_captured_stdout() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config)
        .env("JJBIND_JJ_BIN", "echo")
        .args(["run", "show diff", "--change-id", "abc123"])
        .assert()
        .success();
    assert_eq!(stdout_of(&assert), "diff -r abc123\n");
}

#[test]
fn contract_run_diff_mode_capture_failure_yields_empty_stdout() {
    let (_dir, config) = setup_config(CONFIG);
    // /nonexistent/jj cannot spawn; the engine swallows the error and
    // produces an empty diff.
    let assert = jjbind_cmd(&config)
        .args(["run", "show diff", "--change-id", "abc123"])
        .assert()
        .success();
    assert_eq!(stdout_of(&assert), "");
}

#[test]
fn contract_run_interactive_mode_executes_and_exits_zero() {
    let (_dir, config) = setup_config(CONFIG);
    jjbind_cmd(&config)
        .env("JJBIND_JJ_BIN", "true")
        .args([
            "run",
            "resolve conflicts",
            "--change-id",
            "abc123",
            "--file-path",
            "conflicted.rs",
        ])
        .assert()
        .success();
}

#[test]
fn contract_run_operation_selection_resolves_operation_id() {
    let config_text = r#"
[custom_commands."undo op"]
key = ["u"]
args = ["op", "undo", "$operation_id"]
"#;
    let (_dir, config) = setup_config(config_text);
    let assert = jjbind_cmd(&config)
        .args(["run", "undo op", "--operation-id", "f00f", "--dry-run"])
        .assert()
        .success();
    assert!(
        stdout_of(&assert).contains("op undo f00f"),
        "stdout: {}",
        stdout_of(&assert)
    );
}

// ---------------------------------------------------------------------------
// surface
// ---------------------------------------------------------------------------

#[test]
fn contract_help_lists_the_subcommands() {
    let (_dir, config) = setup_config(CONFIG);
    let assert = jjbind_cmd(&config).arg("--help").assert().success();
    let stdout = stdout_of(&assert);
    for subcommand in ["check", "list", "run"] {
        assert!(stdout.contains(subcommand), "missing {subcommand}: {stdout}");
    }
}

#[test]
fn contract_unknown_subcommand_fails() {
    let (_dir, config) = setup_config(CONFIG);
    jjbind_cmd(&config)
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn contract_conflicting_selection_flags_are_rejected() {
    let (_dir, config) = setup_config(CONFIG);
    jjbind_cmd(&config)
        .args([
            "list",
            "--change-id",
            "abc123",
            "--operation-id",
            "f00f",
        ])
        .assert()
        .code(2);
}
