//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary config dir.

use std::io::Write;
use std::process::{Command, Stdio};

struct Cli {
    dir: tempfile::TempDir,
}

impl Cli {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pomobar"));
        cmd.args(args)
            .env("POMOBAR_CONFIG_DIR", self.dir.path())
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run a CLI command and return (stdout, stderr, code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = self.command(args).output().unwrap();
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code().unwrap_or(-1),
        )
    }

    fn ok(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "{args:?} failed: {stderr}");
        stdout
    }

    fn fails(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert_eq!(code, 1, "{args:?} unexpectedly succeeded");
        assert!(stderr.starts_with("error:"), "stderr was: {stderr}");
        stderr
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.ok(args)).unwrap()
    }
}

#[test]
fn test_status_reports_idle_snapshot() {
    let cli = Cli::new();
    let status = cli.json(&["status"]);
    assert_eq!(status["state"], "idle");
    assert_eq!(status["mode"], "pomodoro");
    assert_eq!(status["operating_mode"], "routine");
    assert_eq!(status["remaining_secs"], 1500.0);
    assert_eq!(status["routine_name"], "Classic");
    assert!(cli.dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let cli = Cli::new();
    assert_eq!(cli.ok(&["config", "set", "timer.pomodoro_min", "50"]).trim(), "ok");
    assert_eq!(cli.ok(&["config", "get", "timer.pomodoro_min"]).trim(), "50.0");

    let status = cli.json(&["status"]);
    assert_eq!(status["remaining_secs"], 3000.0);
}

#[test]
fn test_config_rejects_bad_input() {
    let cli = Cli::new();
    cli.fails(&["config", "get", "timer.nope"]);
    cli.fails(&["config", "set", "timer.nope", "1"]);
    cli.fails(&["config", "set", "timer.pomodoro_min", "-3"]);
    cli.fails(&["config", "set", "timer.operating_mode", "sometimes"]);
    assert_eq!(cli.ok(&["config", "get", "timer.pomodoro_min"]).trim(), "25.0");
}

#[test]
fn test_config_list_and_reset() {
    let cli = Cli::new();
    cli.ok(&["config", "set", "notifications.sound", "Ping"]);
    let config = cli.json(&["config", "list"]);
    assert_eq!(config["notifications"]["sound"], "Ping");

    cli.ok(&["config", "reset"]);
    assert_eq!(cli.ok(&["config", "get", "notifications.sound"]).trim(), "Glass");
}

#[test]
fn test_routine_lifecycle() {
    let cli = Cli::new();
    let id = cli.ok(&["routine", "add", "Deep", "p:50", "s", "--select"]);
    let id = id.trim();

    let status = cli.json(&["status"]);
    assert_eq!(status["routine_name"], "Deep");
    assert_eq!(status["remaining_secs"], 3000.0);
    assert_eq!(status["step_count"], 2);

    cli.ok(&["routine", "rename", id, "Deeper"]);
    cli.ok(&["routine", "steps", "Deeper", "l", "p"]);
    let status = cli.json(&["status"]);
    assert_eq!(status["mode"], "long_break");

    let list = cli.ok(&["routine", "list"]);
    assert!(list.contains("* Deeper"));
    assert!(list.contains("Classic"));

    cli.ok(&["routine", "remove", "deeper"]);
    let status = cli.json(&["status"]);
    assert_eq!(status["routine_name"], "Classic");
}

#[test]
fn test_routine_errors() {
    let cli = Cli::new();
    cli.fails(&["routine", "add", "Bad", "nap"]);
    cli.fails(&["routine", "add", "classic", "p"]);
    cli.fails(&["routine", "select", "Missing"]);
}

#[test]
fn test_modes_lists_catalog() {
    let cli = Cli::new();
    cli.ok(&["config", "set", "timer.short_break_min", "7"]);
    let out = cli.ok(&["modes"]);
    assert_eq!(out.lines().count(), 3);
    assert!(out.contains("pomodoro"));
    assert!(out.contains("07:00"));
    assert!(out.contains("long_break"));
}

#[test]
fn test_stats_show_and_reset() {
    let cli = Cli::new();
    let stats = cli.json(&["stats", "show", "--json"]);
    assert_eq!(stats["pomodoros"], 0);
    cli.ok(&["stats", "reset"]);
    assert!(cli.ok(&["stats", "show"]).contains("Total"));
}

#[test]
fn test_run_skip_persists_counters() {
    let cli = Cli::new();
    let mut child = cli
        .command(&["run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"n\nq\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stats = cli.json(&["stats", "show", "--json"]);
    assert_eq!(stats["pomodoros"], 1);
}

#[test]
fn test_completions() {
    let cli = Cli::new();
    let script = cli.ok(&["completions", "bash"]);
    assert!(script.contains("pomobar"));
}
