use serde::{Deserialize, Serialize};

use super::counters::Counters;
use super::engine::TimerState;
use super::mode::{OperatingMode, TimerMode};

/// Observable engine state, published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub mode: TimerMode,
    pub operating_mode: OperatingMode,
    pub remaining_secs: f64,
    pub original_secs: f64,
    /// 0.0 .. 1.0 within the loaded interval.
    pub progress: f64,
    pub is_running: bool,
    pub step_index: usize,
    /// Steps in the active routine; 0 outside routine mode.
    pub step_count: usize,
    pub routine_name: Option<String>,
    pub counters: Counters,
    pub full_reset_performed: bool,
}

impl TimerSnapshot {
    /// Remaining time as `MM:SS`, or `H:MM:SS` from an hour up.
    pub fn label(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Text for the status bar item.
    pub fn status_title(&self, icon: &str, show_countdown: bool) -> String {
        if show_countdown {
            format!("{icon} {}", self.label())
        } else {
            icon.to_string()
        }
    }

    /// `2/8` style position, when a routine is active.
    pub fn step_label(&self) -> Option<String> {
        (self.step_count > 0).then(|| format!("{}/{}", self.step_index + 1, self.step_count))
    }
}

/// Whole seconds are rounded up so the display never shows 00:00 early.
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() { secs.max(0.0).ceil() as u64 } else { 0 };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
