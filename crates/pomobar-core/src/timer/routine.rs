use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::mode::TimerMode;
use crate::storage::Config;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutineStep {
    pub mode: TimerMode,
    /// Per-step duration override in minutes. Falls back to the mode's
    /// configured duration when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<f64>,
}

impl RoutineStep {
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            duration_min: None,
        }
    }

    pub fn with_duration_min(mode: TimerMode, minutes: f64) -> Self {
        Self {
            mode,
            duration_min: Some(minutes),
        }
    }

    /// Override in seconds, if one is set and usable.
    pub fn override_secs(&self) -> Option<f64> {
        self.duration_min
            .filter(|m| m.is_finite() && *m > 0.0)
            .map(|m| m * 60.0)
    }
}

impl From<TimerMode> for RoutineStep {
    fn from(mode: TimerMode) -> Self {
        Self::new(mode)
    }
}

/// Fixed id of the built-in Classic routine, so a defaulted `routines`
/// section loads identically every time.
pub const CLASSIC_ROUTINE_ID: Uuid = Uuid::from_u128(0x7c1a_55e2_4d0b_4f6e_9a3c_2b8e_51d0_c1a5);

/// A named, ordered sequence of modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<RoutineStep>,
}

impl Routine {
    pub fn new(name: impl Into<String>, steps: Vec<RoutineStep>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            steps,
        }
    }

    /// Four pomodoros separated by short breaks, closing on a long break.
    pub fn classic() -> Self {
        use TimerMode::*;
        let modes = [
            Pomodoro, ShortBreak, Pomodoro, ShortBreak, Pomodoro, ShortBreak, Pomodoro, LongBreak,
        ];
        Self {
            id: CLASSIC_ROUTINE_ID,
            ..Self::new("Classic", modes.into_iter().map(RoutineStep::new).collect())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&RoutineStep> {
        self.steps.get(index)
    }

    pub fn mode_at(&self, index: usize) -> Option<TimerMode> {
        self.step(index).map(|s| s.mode)
    }

    /// First step's mode, or Pomodoro for an empty routine.
    pub fn first_mode(&self) -> TimerMode {
        self.mode_at(0).unwrap_or(TimerMode::Pomodoro)
    }

    pub fn position_of(&self, mode: TimerMode) -> Option<usize> {
        self.steps.iter().position(|s| s.mode == mode)
    }

    /// Index after `index`, wrapping to the start. `None` when empty.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        if self.steps.is_empty() {
            None
        } else {
            Some((index + 1) % self.steps.len())
        }
    }

    pub fn count_of(&self, mode: TimerMode) -> usize {
        self.steps.iter().filter(|s| s.mode == mode).count()
    }

    /// Length of one pass through the routine under `config`.
    pub fn total_duration_secs(&self, config: &Config) -> f64 {
        self.steps
            .iter()
            .map(|s| s.override_secs().unwrap_or_else(|| config.duration_secs(s.mode)))
            .sum()
    }

    /// Compact one-line rendering, e.g. `🍅 ☕ 🍅 🌴`.
    pub fn summary(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.mode.icon())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
