use pomobar_core::{Alert, Notifier};
use std::io::Write;

/// Rings the terminal bell and prints alerts on their own line.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn play_sound(&self, sound: &str) {
        tracing::debug!(sound, "bell");
        let mut err = std::io::stderr();
        let _ = err.write_all(b"\x07");
        let _ = err.flush();
    }

    fn show_alert(&self, alert: &Alert) {
        println!("\n{}: {}", alert.title, alert.message);
    }
}
