//! Timer modes and operating modes.
//!
//! The mode catalog is a pure lookup: every [`TimerMode`] carries a fallback
//! duration and display metadata. Configured durations live in
//! [`crate::Config`]; the defaults here are only used when nothing else is set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [
        TimerMode::Pomodoro,
        TimerMode::ShortBreak,
        TimerMode::LongBreak,
    ];

    /// Fallback duration in seconds.
    pub fn default_duration_secs(self) -> f64 {
        match self {
            TimerMode::Pomodoro => 25.0 * 60.0,
            TimerMode::ShortBreak => 5.0 * 60.0,
            TimerMode::LongBreak => 15.0 * 60.0,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "🍅",
            TimerMode::ShortBreak => "☕",
            TimerMode::LongBreak => "🌴",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Pomodoro",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Focused work on a single task",
            TimerMode::ShortBreak => "A quick pause between pomodoros",
            TimerMode::LongBreak => "A longer rest after a full set",
        }
    }

    /// Stable key used in config files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "pomodoro",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Pomodoro)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pomodoro" | "p" | "focus" => Ok(TimerMode::Pomodoro),
            "short_break" | "short" | "s" => Ok(TimerMode::ShortBreak),
            "long_break" | "long" | "l" => Ok(TimerMode::LongBreak),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown timer mode '{other}'"),
            }),
        }
    }
}

/// What the engine does once an interval completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Run the selected mode once; never auto-advance.
    Single,
    /// Repeat the configured cycle mode indefinitely.
    Cycle,
    /// Step through the selected routine, wrapping at the end.
    #[default]
    Routine,
}

impl OperatingMode {
    pub fn key(self) -> &'static str {
        match self {
            OperatingMode::Single => "single",
            OperatingMode::Cycle => "cycle",
            OperatingMode::Routine => "routine",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for OperatingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(OperatingMode::Single),
            "cycle" | "repeat" => Ok(OperatingMode::Cycle),
            "routine" => Ok(OperatingMode::Routine),
            other => Err(ValidationError::InvalidValue {
                field: "operating_mode".into(),
                message: format!("unknown operating mode '{other}'"),
            }),
        }
    }
}
