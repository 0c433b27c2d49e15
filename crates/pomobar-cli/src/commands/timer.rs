use pomobar_core::{
    Command, Config, SettingsStore, TimerEngine, TimerMode, TimerService, TimerSnapshot,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::warn;

use super::{open_store, CliResult};
use crate::notifier::TerminalNotifier;

/// How often the foreground timer re-reads the config file.
const CONFIG_POLL_INTERVAL: Duration = Duration::from_secs(2);

const HELP: &str = "s start/pause · r reset · R full reset · n skip · 1/2/3 mode · q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Command(Command),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let command = match line.trim() {
        "s" => Command::Toggle,
        "r" => Command::Reset,
        "R" => Command::ResetFullCycle,
        "n" => Command::Skip,
        "1" => Command::SwitchMode {
            mode: TimerMode::Pomodoro,
            reset_index: true,
        },
        "2" => Command::SwitchMode {
            mode: TimerMode::ShortBreak,
            reset_index: true,
        },
        "3" => Command::SwitchMode {
            mode: TimerMode::LongBreak,
            reset_index: true,
        },
        "q" => return Some(Input::Quit),
        _ => return None,
    };
    Some(Input::Command(command))
}

fn status_line(snapshot: &TimerSnapshot, config: &Config) -> String {
    let mut line = snapshot.status_title(config.icon(snapshot.mode), config.appearance.show_countdown);
    line.push_str(&format!("  {}", snapshot.mode.title()));
    if let (Some(step), Some(name)) = (snapshot.step_label(), &snapshot.routine_name) {
        line.push_str(&format!("  [{name} {step}]"));
    }
    if !snapshot.is_running {
        line.push_str("  (paused)");
    }
    if snapshot.full_reset_performed {
        line.push_str("  ↺");
    }
    line.push_str(&format!("  🍅×{}", snapshot.counters.pomodoros));
    line
}

fn render(snapshot: &TimerSnapshot, config: &Config) {
    let mut out = std::io::stdout();
    let _ = write!(out, "\r\x1b[2K{}", status_line(snapshot, config));
    let _ = out.flush();
}

/// Print the timer state a fresh engine would start from.
pub fn status() -> CliResult {
    let store = open_store()?;
    let engine = TimerEngine::new(store.current());
    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}

pub fn run_foreground() -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(foreground(open_store()?));
    // A blocking stdin read cannot be cancelled; don't wait on it.
    runtime.shutdown_background();
    result
}

async fn foreground(store: SettingsStore) -> CliResult {
    let (handle, service) = TimerService::spawn(store.clone(), Arc::new(TerminalNotifier));
    let mut snapshots = handle.subscribe_snapshot();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reload = tokio::time::interval(CONFIG_POLL_INTERVAL);
    reload.set_missed_tick_behavior(MissedTickBehavior::Skip);

    println!("{HELP}");
    render(&handle.snapshot(), &store.current());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::Command(command)) => {
                        let snapshot = handle.send(command).await?;
                        render(&snapshot, &store.current());
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("\nunknown command '{}'. {HELP}", line.trim()),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&snapshot, &store.current());
            }
            _ = reload.tick() => {
                if let Err(e) = store.reload() {
                    warn!(error = %e, "failed to reload settings");
                }
            }
        }
    }

    println!();
    handle.shutdown().await?;
    service.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomobar_core::ManualClock;

    #[test]
    fn line_commands_map_to_service_commands() {
        assert_eq!(parse_input("s"), Some(Input::Command(Command::Toggle)));
        assert_eq!(parse_input(" r "), Some(Input::Command(Command::Reset)));
        assert_eq!(parse_input("R"), Some(Input::Command(Command::ResetFullCycle)));
        assert_eq!(parse_input("n"), Some(Input::Command(Command::Skip)));
        assert_eq!(
            parse_input("3"),
            Some(Input::Command(Command::SwitchMode {
                mode: TimerMode::LongBreak,
                reset_index: true
            }))
        );
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("x"), None);
    }

    #[test]
    fn status_line_shows_countdown_and_position() {
        let config = Config::default();
        let engine = TimerEngine::with_clock(config.clone(), Arc::new(ManualClock::new()));
        let line = status_line(&engine.snapshot(), &config);
        assert!(line.starts_with("🍅 25:00"));
        assert!(line.contains("[Classic 1/8]"));
        assert!(line.contains("(paused)"));
    }

    #[test]
    fn status_line_hides_countdown_when_disabled() {
        let mut config = Config::default();
        config.appearance.show_countdown = false;
        let engine = TimerEngine::with_clock(config.clone(), Arc::new(ManualClock::new()));
        assert!(!status_line(&engine.snapshot(), &config).contains("25:00"));
    }
}
