use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Counters, OperatingMode, TimerMode};

/// Every state change in the engine produces an Event.
/// The presentation layer and the notifier subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        step_index: usize,
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    Tick {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero.
    IntervalCompleted {
        mode: TimerMode,
        step_index: usize,
        at: DateTime<Utc>,
    },
    PlaySound {
        sound: String,
        at: DateTime<Utc>,
    },
    /// Show the in-app completion alert. Scale and duration come straight
    /// from the notification settings.
    ShowAlert {
        mode: TimerMode,
        scale: f64,
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    CounterIncremented {
        mode: TimerMode,
        counters: Counters,
        at: DateTime<Utc>,
    },
    CountersReset {
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    FullReset {
        mode: TimerMode,
        step_index: usize,
        at: DateTime<Utc>,
    },
    /// The transient full-reset flag went back down.
    FullResetCleared {
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: TimerMode,
        step_index: usize,
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    StepSkipped {
        from: TimerMode,
        to: TimerMode,
        step_index: usize,
        at: DateTime<Utc>,
    },
    AutoAdvanced {
        from: TimerMode,
        to: TimerMode,
        step_index: usize,
        at: DateTime<Utc>,
    },
    SettingsReconciled {
        operating_mode: OperatingMode,
        mode: TimerMode,
        step_index: usize,
        duration_secs: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::Tick { at, .. }
            | Event::IntervalCompleted { at, .. }
            | Event::PlaySound { at, .. }
            | Event::ShowAlert { at, .. }
            | Event::CounterIncremented { at, .. }
            | Event::CountersReset { at }
            | Event::TimerReset { at, .. }
            | Event::FullReset { at, .. }
            | Event::FullResetCleared { at }
            | Event::ModeSwitched { at, .. }
            | Event::StepSkipped { at, .. }
            | Event::AutoAdvanced { at, .. }
            | Event::SettingsReconciled { at, .. } => *at,
        }
    }

    /// Whether this event touches the persisted counters.
    pub fn changes_counters(&self) -> bool {
        matches!(
            self,
            Event::CounterIncremented { .. } | Event::CountersReset { .. }
        )
    }
}
