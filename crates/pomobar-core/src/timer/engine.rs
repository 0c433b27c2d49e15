//! Timer engine implementation.
//!
//! The timer engine is a deadline-driven state machine. It does not use
//! internal threads - the caller is responsible for calling `poll()` once
//! `next_deadline()` has passed. The engine keeps at most one tick deadline,
//! plus the deferred work scheduled by a completion: the second chime, the
//! counter/auto-advance step and the full-reset flag clear.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Completed -> (Running | Idle)
//!            \-> Idle (pause / reset / switch)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(config);
//! engine.start();
//! // In a loop, once `engine.next_deadline()` has passed:
//! let events = engine.poll();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::counters::Counters;
use super::mode::{OperatingMode, TimerMode};
use super::routine::Routine;
use super::snapshot::TimerSnapshot;
use crate::events::Event;
use crate::storage::Config;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Gap between the two chimes of a completion.
pub const SECOND_CHIME_DELAY: Duration = Duration::from_millis(500);
/// Time the completion alert gets before counters and position move.
pub const COMPLETION_DELAY: Duration = Duration::from_secs(2);
/// How long the full-reset flag stays raised.
pub const FULL_RESET_FLAG_DURATION: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not counting down: fresh, paused, or reset.
    Idle,
    Running,
    /// Reached zero; the completion step has not run yet.
    Completed,
}

#[derive(Debug, Clone, Copy)]
struct PendingCompletion {
    due: Instant,
    mode: TimerMode,
}

#[derive(Debug, Clone, Copy)]
enum Due {
    Tick,
    SecondChime,
    Completion,
    FlagClear,
}

#[derive(Debug, Default)]
struct Deadlines {
    /// The single tick source.
    tick: Option<Instant>,
    second_chime: Option<(Instant, String)>,
    completion: Option<PendingCompletion>,
    flag_clear: Option<Instant>,
}

impl Deadlines {
    /// Earliest pending deadline. Ties resolve in declaration order.
    fn earliest(&self) -> Option<(Instant, Due)> {
        [
            self.tick.map(|t| (t, Due::Tick)),
            self.second_chime.as_ref().map(|(t, _)| (*t, Due::SecondChime)),
            self.completion.map(|p| (p.due, Due::Completion)),
            self.flag_clear.map(|t| (t, Due::FlagClear)),
        ]
        .into_iter()
        .flatten()
        .fold(None, |best: Option<(Instant, Due)>, item| match best {
            Some(b) if b.0 <= item.0 => Some(b),
            _ => Some(item),
        })
    }
}

/// Core timer engine.
///
/// Owns the countdown, the position within the active routine and the
/// completion counters. Settings arrive through [`TimerEngine::apply_config`].
#[derive(Debug)]
pub struct TimerEngine {
    config: Config,
    clock: Arc<dyn Clock>,
    current_mode: TimerMode,
    /// Seconds left in the loaded interval.
    time_remaining: f64,
    /// Full length of the loaded interval in seconds.
    original_duration: f64,
    is_running: bool,
    step_index: usize,
    counters: Counters,
    full_reset_performed: bool,
    // Shadow copies used to detect structural settings changes.
    previous_operating_mode: OperatingMode,
    previous_routine_id: Option<uuid::Uuid>,
    previous_cycle_mode: TimerMode,
    deadlines: Deadlines,
}

impl TimerEngine {
    /// Create an engine on the system clock.
    ///
    /// Starts idle, positioned at the start of the configured operating mode.
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let operating_mode = config.timer.operating_mode;
        let mut engine = Self {
            counters: config.counters,
            previous_operating_mode: operating_mode,
            previous_routine_id: config.routines.selected,
            previous_cycle_mode: config.timer.cycle_mode,
            config,
            clock,
            current_mode: TimerMode::Pomodoro,
            time_remaining: 0.0,
            original_duration: 0.0,
            is_running: false,
            step_index: 0,
            full_reset_performed: false,
            deadlines: Deadlines::default(),
        };
        let mode = engine.start_mode_for(operating_mode);
        engine.load_interval(mode);
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.is_running {
            TimerState::Running
        } else if self.deadlines.completion.is_some() {
            TimerState::Completed
        } else {
            TimerState::Idle
        }
    }

    pub fn current_mode(&self) -> TimerMode {
        self.current_mode
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    pub fn original_duration(&self) -> f64 {
        self.original_duration
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Raised by a hard reset, lowered again shortly after.
    pub fn full_reset_performed(&self) -> bool {
        self.full_reset_performed
    }

    pub fn operating_mode(&self) -> OperatingMode {
        self.config.timer.operating_mode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The selected routine while in routine operating mode.
    pub fn active_routine(&self) -> Option<&Routine> {
        match self.config.timer.operating_mode {
            OperatingMode::Routine => self.config.selected_routine(),
            _ => None,
        }
    }

    pub fn has_pending_completion(&self) -> bool {
        self.deadlines.completion.is_some()
    }

    /// When `poll()` next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.earliest().map(|(t, _)| t)
    }

    /// 0.0 .. 1.0 progress within the loaded interval.
    pub fn progress(&self) -> f64 {
        if self.original_duration <= 0.0 {
            return 0.0;
        }
        (1.0 - self.time_remaining / self.original_duration).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let routine = self.active_routine();
        TimerSnapshot {
            state: self.state(),
            mode: self.current_mode,
            operating_mode: self.config.timer.operating_mode,
            remaining_secs: self.time_remaining,
            original_secs: self.original_duration,
            progress: self.progress(),
            is_running: self.is_running,
            step_index: self.step_index,
            step_count: routine.map(Routine::len).unwrap_or(0),
            routine_name: routine.map(|r| r.name.clone()),
            counters: self.counters,
            full_reset_performed: self.full_reset_performed,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down. Starting while running replaces the tick
    /// source instead of adding a second one.
    pub fn start(&mut self) -> Option<Event> {
        let now = self.clock.now();
        self.start_at(now)
    }

    /// Idempotent.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.halt();
        debug!(remaining = self.time_remaining, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.time_remaining,
            at: Utc::now(),
        })
    }

    /// Start when idle, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Soft reset: reload the current interval without moving position.
    pub fn reset(&mut self) -> Option<Event> {
        self.halt();
        self.cancel_pending_completion();
        self.load_interval(self.current_mode);
        debug!(mode = ?self.current_mode, step = self.step_index, "soft reset");
        Some(Event::TimerReset {
            mode: self.current_mode,
            remaining_secs: self.time_remaining,
            at: Utc::now(),
        })
    }

    /// Hard reset: rewind to the start of the operating mode's sequence.
    pub fn reset_full_cycle(&mut self) -> Option<Event> {
        let now = self.clock.now();
        self.halt();
        self.cancel_pending_completion();
        self.step_index = 0;
        let mode = match self.config.timer.operating_mode {
            OperatingMode::Single => self.current_mode,
            operating_mode => self.start_mode_for(operating_mode),
        };
        self.load_interval(mode);
        self.full_reset_performed = true;
        self.deadlines.flag_clear = Some(now + FULL_RESET_FLAG_DURATION);
        debug!(mode = ?mode, "full reset");
        Some(Event::FullReset {
            mode,
            step_index: self.step_index,
            at: Utc::now(),
        })
    }

    /// Load `mode` and stop. With `reset_index`, the step index moves to the
    /// first occurrence of `mode` in the active routine (0 if absent).
    pub fn switch_mode(&mut self, mode: TimerMode, reset_index: bool) -> Option<Event> {
        self.halt();
        self.cancel_pending_completion();
        if reset_index {
            self.step_index = self
                .active_routine()
                .and_then(|r| r.position_of(mode))
                .unwrap_or(0);
        }
        self.load_interval(mode);
        debug!(mode = ?mode, step = self.step_index, "mode switched");
        Some(Event::ModeSwitched {
            mode,
            step_index: self.step_index,
            duration_secs: self.original_duration,
            at: Utc::now(),
        })
    }

    /// Count the current interval as completed and move on per operating
    /// mode. A completion still waiting on its delay is dropped, so the
    /// interval is counted exactly once.
    pub fn skip_current_step(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        self.cancel_pending_completion();

        let from = self.current_mode;
        let mut events = vec![self.count_completion(from)];
        self.halt();

        match self.config.timer.operating_mode {
            OperatingMode::Single => {
                self.time_remaining = 0.0;
                events.push(self.skipped_event(from));
            }
            OperatingMode::Cycle => {
                self.load_interval(self.config.timer.cycle_mode);
                events.push(self.skipped_event(from));
                events.extend(self.start_at(now));
            }
            OperatingMode::Routine => {
                match self.next_routine_step() {
                    Some((next, mode)) => {
                        self.step_index = next;
                        self.load_interval(mode);
                    }
                    None => {
                        warn!("skip with no usable routine; restarting current interval");
                        self.load_interval(self.current_mode);
                    }
                }
                events.push(self.skipped_event(from));
                events.extend(self.start_at(now));
            }
        }
        info!(from = ?from, to = ?self.current_mode, "step skipped");
        events
    }

    /// Zero the completion counters.
    pub fn reset_counters(&mut self) -> Option<Event> {
        self.counters = Counters::default();
        self.config.counters = self.counters;
        Some(Event::CountersReset { at: Utc::now() })
    }

    /// Run every deadline that has passed, in time order.
    pub fn poll(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = Vec::new();
        while let Some((due, kind)) = self.deadlines.earliest() {
            if due > now {
                break;
            }
            match kind {
                Due::Tick => events.extend(self.on_tick(due)),
                Due::SecondChime => {
                    if let Some((_, sound)) = self.deadlines.second_chime.take() {
                        events.push(Event::PlaySound {
                            sound,
                            at: Utc::now(),
                        });
                    }
                }
                Due::Completion => {
                    if let Some(pending) = self.deadlines.completion.take() {
                        events.extend(self.on_completion_due(pending, due));
                    }
                }
                Due::FlagClear => {
                    self.deadlines.flag_clear = None;
                    self.full_reset_performed = false;
                    events.push(Event::FullResetCleared { at: Utc::now() });
                }
            }
        }
        events
    }

    /// Reconcile against freshly read settings.
    ///
    /// While running, the new settings are stored for later transitions but
    /// the loaded interval is left alone.
    pub fn apply_config(&mut self, config: Config) -> Vec<Event> {
        let operating_mode = config.timer.operating_mode;
        let operating_mode_changed = operating_mode != self.previous_operating_mode;
        let routine_changed = config.routines.selected != self.previous_routine_id;
        let cycle_mode_changed = config.timer.cycle_mode != self.previous_cycle_mode;

        if config.counters != self.counters {
            debug!(counters = ?config.counters, "adopting externally changed counters");
            self.counters = config.counters;
        }

        self.previous_operating_mode = operating_mode;
        self.previous_routine_id = config.routines.selected;
        self.previous_cycle_mode = config.timer.cycle_mode;
        self.config = config;

        if self.is_running {
            debug!("settings changed while running; interval left untouched");
            return Vec::new();
        }

        if operating_mode_changed {
            self.step_index = 0;
            let mode = self.start_mode_for(operating_mode);
            self.load_interval(mode);
        } else if operating_mode == OperatingMode::Routine && routine_changed {
            self.step_index = 0;
            let mode = self.start_mode_for(operating_mode);
            self.load_interval(mode);
        } else if operating_mode == OperatingMode::Cycle && cycle_mode_changed {
            self.step_index = 0;
            self.load_interval(self.config.timer.cycle_mode);
        } else {
            let configured = self.configured_duration();
            if configured == self.original_duration {
                return Vec::new();
            }
            self.original_duration = configured;
            self.time_remaining = configured;
        }

        self.cancel_pending_completion();
        debug!(
            operating_mode = %operating_mode,
            mode = ?self.current_mode,
            step = self.step_index,
            "settings reconciled"
        );
        vec![Event::SettingsReconciled {
            operating_mode,
            mode: self.current_mode,
            step_index: self.step_index,
            duration_secs: self.original_duration,
            at: Utc::now(),
        }]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_at(&mut self, at: Instant) -> Option<Event> {
        self.cancel_pending_completion();
        if self.is_running {
            self.deadlines.tick = Some(at + TICK_INTERVAL);
            debug!("start while running; tick source replaced");
            return None;
        }
        // A fresh or finished interval picks up settings edited while idle.
        if self.time_remaining == self.original_duration || self.time_remaining <= 0.0 {
            let duration = self.configured_duration();
            self.original_duration = duration;
            self.time_remaining = duration;
        }
        self.is_running = true;
        self.deadlines.tick = Some(at + TICK_INTERVAL);
        debug!(mode = ?self.current_mode, remaining = self.time_remaining, "timer started");
        Some(Event::TimerStarted {
            mode: self.current_mode,
            step_index: self.step_index,
            remaining_secs: self.time_remaining,
            at: Utc::now(),
        })
    }

    fn halt(&mut self) {
        self.is_running = false;
        self.deadlines.tick = None;
    }

    fn cancel_pending_completion(&mut self) {
        if let Some(pending) = self.deadlines.completion.take() {
            debug!(mode = ?pending.mode, "pending completion cancelled");
        }
    }

    fn on_tick(&mut self, at: Instant) -> Vec<Event> {
        if !self.is_running {
            self.deadlines.tick = None;
            return Vec::new();
        }
        if self.time_remaining > 1.0 {
            self.time_remaining -= 1.0;
            self.deadlines.tick = Some(at + TICK_INTERVAL);
            return vec![Event::Tick {
                remaining_secs: self.time_remaining,
                at: Utc::now(),
            }];
        }
        self.time_remaining = 0.0;
        self.halt();
        self.complete(at)
    }

    fn complete(&mut self, at: Instant) -> Vec<Event> {
        let mode = self.current_mode;
        info!(mode = ?mode, step = self.step_index, "interval completed");

        let mut events = vec![Event::IntervalCompleted {
            mode,
            step_index: self.step_index,
            at: Utc::now(),
        }];

        let notifications = &self.config.notifications;
        if notifications.sound_enabled {
            events.push(Event::PlaySound {
                sound: notifications.sound.clone(),
                at: Utc::now(),
            });
            self.deadlines.second_chime = Some((at + SECOND_CHIME_DELAY, notifications.sound.clone()));
        }
        events.push(Event::ShowAlert {
            mode,
            scale: notifications.alert_scale,
            duration_secs: notifications.alert_duration_secs,
            at: Utc::now(),
        });

        self.deadlines.completion = Some(PendingCompletion {
            due: at + COMPLETION_DELAY,
            mode,
        });
        events
    }

    fn on_completion_due(&mut self, pending: PendingCompletion, at: Instant) -> Vec<Event> {
        if self.is_running || self.time_remaining > 0.0 {
            debug!(mode = ?pending.mode, "completion superseded");
            return Vec::new();
        }
        let mut events = vec![self.count_completion(pending.mode)];
        if self.config.timer.operating_mode != OperatingMode::Single {
            events.extend(self.auto_advance(at));
        }
        events
    }

    fn auto_advance(&mut self, at: Instant) -> Vec<Event> {
        let from = self.current_mode;
        let target = match self.config.timer.operating_mode {
            OperatingMode::Single => return Vec::new(),
            OperatingMode::Cycle => Some(self.config.timer.cycle_mode),
            OperatingMode::Routine => match self.next_routine_step() {
                Some((next, mode)) => {
                    self.step_index = next;
                    Some(mode)
                }
                None => None,
            },
        };

        let Some(to) = target else {
            warn!("no usable routine; falling back to pomodoro");
            self.load_interval(TimerMode::Pomodoro);
            return vec![self.advanced_event(from)];
        };

        self.load_interval(to);
        info!(from = ?from, to = ?to, step = self.step_index, "auto-advanced");
        let mut events = vec![self.advanced_event(from)];
        events.extend(self.start_at(at));
        events
    }

    fn next_routine_step(&self) -> Option<(usize, TimerMode)> {
        let routine = self.active_routine()?;
        let next = routine.next_index(self.step_index)?;
        Some((next, routine.mode_at(next)?))
    }

    fn count_completion(&mut self, mode: TimerMode) -> Event {
        self.counters.increment(mode);
        self.config.counters = self.counters;
        Event::CounterIncremented {
            mode,
            counters: self.counters,
            at: Utc::now(),
        }
    }

    /// First mode of the sequence for `operating_mode`.
    fn start_mode_for(&self, operating_mode: OperatingMode) -> TimerMode {
        match operating_mode {
            OperatingMode::Single => TimerMode::Pomodoro,
            OperatingMode::Cycle => self.config.timer.cycle_mode,
            OperatingMode::Routine => match self.config.selected_routine() {
                Some(routine) => routine.first_mode(),
                None => {
                    warn!("selected routine missing; falling back to pomodoro");
                    TimerMode::Pomodoro
                }
            },
        }
    }

    /// Duration of the current mode at the current step, honouring a
    /// routine step override.
    fn configured_duration(&self) -> f64 {
        self.active_routine()
            .and_then(|r| r.step(self.step_index))
            .filter(|step| step.mode == self.current_mode)
            .and_then(|step| step.override_secs())
            .unwrap_or_else(|| self.config.duration_secs(self.current_mode))
    }

    fn load_interval(&mut self, mode: TimerMode) {
        self.current_mode = mode;
        let duration = self.configured_duration();
        self.original_duration = duration;
        self.time_remaining = duration;
    }

    fn skipped_event(&self, from: TimerMode) -> Event {
        Event::StepSkipped {
            from,
            to: self.current_mode,
            step_index: self.step_index,
            at: Utc::now(),
        }
    }

    fn advanced_event(&self, from: TimerMode) -> Event {
        Event::AutoAdvanced {
            from,
            to: self.current_mode,
            step_index: self.step_index,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;
    use crate::timer::RoutineStep;

    fn engine_with(config: Config) -> (TimerEngine, ManualClock) {
        let clock = ManualClock::new();
        let engine = TimerEngine::with_clock(config, Arc::new(clock.clone()));
        (engine, clock)
    }

    fn single_config() -> Config {
        let mut config = Config::default();
        config.timer.operating_mode = OperatingMode::Single;
        config
    }

    #[test]
    fn start_pause_resume() {
        let (mut engine, _clock) = engine_with(Config::default());
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start().is_some());
        assert_eq!(engine.state(), TimerState::Running);

        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.pause().is_none());

        assert!(engine.start().is_some());
        assert!(engine.is_running());
    }

    #[test]
    fn new_engine_seeds_from_routine() {
        let mut config = Config::default();
        let id = config
            .add_routine("Breaks first", vec![TimerMode::LongBreak.into(), TimerMode::Pomodoro.into()])
            .unwrap();
        config.select_routine(id).unwrap();
        let (engine, _clock) = engine_with(config);
        assert_eq!(engine.current_mode(), TimerMode::LongBreak);
        assert_eq!(engine.time_remaining(), 900.0);
        assert_eq!(engine.original_duration(), 900.0);
        assert_eq!(engine.step_index(), 0);
    }

    #[test]
    fn new_engine_with_cycle_seeds_cycle_mode() {
        let mut config = Config::default();
        config.timer.operating_mode = OperatingMode::Cycle;
        config.timer.cycle_mode = TimerMode::ShortBreak;
        let (engine, _clock) = engine_with(config);
        assert_eq!(engine.current_mode(), TimerMode::ShortBreak);
    }

    #[test]
    fn tick_decrements_one_second() {
        let (mut engine, clock) = engine_with(single_config());
        engine.start();
        clock.advance_secs(3);
        let events = engine.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(engine.time_remaining(), 1497.0);
    }

    #[test]
    fn poll_before_deadline_does_nothing() {
        let (mut engine, clock) = engine_with(single_config());
        engine.start();
        clock.advance(Duration::from_millis(999));
        assert!(engine.poll().is_empty());
        assert_eq!(engine.time_remaining(), 1500.0);
    }

    #[test]
    fn fractional_remainder_lands_on_zero() {
        let mut config = single_config();
        config.timer.pomodoro_min = 2.5 / 60.0;
        let (mut engine, clock) = engine_with(config);
        engine.start();
        clock.advance_secs(1);
        engine.poll();
        assert_eq!(engine.time_remaining(), 1.5);
        clock.advance_secs(1);
        let events = engine.poll();
        assert_eq!(engine.time_remaining(), 0.0);
        assert!(!engine.is_running());
        assert_eq!(engine.state(), TimerState::Completed);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::IntervalCompleted { mode: TimerMode::Pomodoro, .. })));
    }

    #[test]
    fn completion_double_chime_and_alert() {
        let mut config = single_config();
        config.timer.pomodoro_min = 1.0 / 60.0;
        config.notifications.sound = "Ping".into();
        let (mut engine, clock) = engine_with(config);
        engine.start();
        clock.advance_secs(1);
        let events = engine.poll();
        let sounds = events.iter().filter(|e| matches!(e, Event::PlaySound { .. })).count();
        assert_eq!(sounds, 1);
        assert!(events.iter().any(|e| matches!(e, Event::ShowAlert { mode: TimerMode::Pomodoro, .. })));

        clock.advance(Duration::from_millis(500));
        let events = engine.poll();
        assert!(matches!(events.as_slice(), [Event::PlaySound { sound, .. }] if sound == "Ping"));
    }

    #[test]
    fn sound_disabled_still_alerts() {
        let mut config = single_config();
        config.timer.pomodoro_min = 1.0 / 60.0;
        config.notifications.sound_enabled = false;
        let (mut engine, clock) = engine_with(config);
        engine.start();
        clock.advance_secs(3);
        let events = engine.poll();
        assert!(!events.iter().any(|e| matches!(e, Event::PlaySound { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::ShowAlert { .. })));
    }

    #[test]
    fn counter_waits_for_completion_delay() {
        let mut config = single_config();
        config.timer.pomodoro_min = 1.0 / 60.0;
        let (mut engine, clock) = engine_with(config);
        engine.start();
        clock.advance_secs(1);
        engine.poll();
        assert_eq!(engine.counters().pomodoros, 0);
        clock.advance(Duration::from_millis(1999));
        engine.poll();
        assert_eq!(engine.counters().pomodoros, 0);
        clock.advance(Duration::from_millis(1));
        engine.poll();
        assert_eq!(engine.counters().pomodoros, 1);
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn start_after_completion_cancels_pending_counter() {
        let mut config = single_config();
        config.timer.pomodoro_min = 1.0 / 60.0;
        let (mut engine, clock) = engine_with(config);
        engine.start();
        clock.advance_secs(1);
        engine.poll();
        assert!(engine.has_pending_completion());

        engine.start();
        assert!(!engine.has_pending_completion());
        assert_eq!(engine.time_remaining(), 1.0);
        clock.advance(Duration::from_millis(2500));
        engine.poll();
        // Only the second interval's completion is pending now; nothing counted yet.
        assert_eq!(engine.counters().pomodoros, 0);
    }

    #[test]
    fn skip_during_completion_window_counts_once() {
        let mut config = Config::default();
        config.timer.operating_mode = OperatingMode::Cycle;
        config.timer.cycle_mode = TimerMode::Pomodoro;
        config.timer.pomodoro_min = 1.0 / 60.0;
        let (mut engine, clock) = engine_with(config);
        engine.start();
        clock.advance_secs(1);
        engine.poll();

        engine.skip_current_step();
        assert_eq!(engine.counters().pomodoros, 1);
        clock.advance(Duration::from_millis(2100));
        engine.poll();
        // The skip restarted a 1s pomodoro which completed again, but its own
        // completion step is still inside the delay window.
        assert_eq!(engine.counters().pomodoros, 1);
    }

    #[test]
    fn skip_in_single_mode_zeroes_and_stays_idle() {
        let (mut engine, _clock) = engine_with(single_config());
        engine.start();
        let events = engine.skip_current_step();
        assert!(matches!(events[0], Event::CounterIncremented { mode: TimerMode::Pomodoro, .. }));
        assert_eq!(engine.time_remaining(), 0.0);
        assert_eq!(engine.current_mode(), TimerMode::Pomodoro);
        assert!(!engine.is_running());

        // Starting from zero reloads the full interval.
        engine.start();
        assert_eq!(engine.time_remaining(), 1500.0);
    }

    #[test]
    fn skip_in_cycle_mode_restarts_cycle_target() {
        let mut config = Config::default();
        config.timer.operating_mode = OperatingMode::Cycle;
        config.timer.cycle_mode = TimerMode::LongBreak;
        let (mut engine, _clock) = engine_with(config);
        engine.switch_mode(TimerMode::Pomodoro, true);
        engine.skip_current_step();
        assert_eq!(engine.counters().pomodoros, 1);
        assert_eq!(engine.current_mode(), TimerMode::LongBreak);
        assert_eq!(engine.time_remaining(), 900.0);
        assert!(engine.is_running());
    }

    #[test]
    fn skip_in_routine_mode_wraps() {
        let (mut engine, _clock) = engine_with(Config::default());
        for _ in 0..7 {
            engine.skip_current_step();
        }
        assert_eq!(engine.step_index(), 7);
        assert_eq!(engine.current_mode(), TimerMode::LongBreak);
        engine.skip_current_step();
        assert_eq!(engine.step_index(), 0);
        assert_eq!(engine.current_mode(), TimerMode::Pomodoro);
        assert_eq!(engine.counters().pomodoros, 4);
        assert_eq!(engine.counters().short_breaks, 3);
        assert_eq!(engine.counters().long_breaks, 1);
    }

    #[test]
    fn skip_with_empty_routine_restarts_current() {
        let mut config = Config::default();
        let id = config.add_routine("Empty", vec![]).unwrap();
        config.select_routine(id).unwrap();
        let (mut engine, _clock) = engine_with(config);
        assert_eq!(engine.current_mode(), TimerMode::Pomodoro);
        engine.skip_current_step();
        assert_eq!(engine.current_mode(), TimerMode::Pomodoro);
        assert_eq!(engine.time_remaining(), 1500.0);
        assert!(engine.is_running());
    }

    #[test]
    fn switch_mode_resets_index_to_first_occurrence() {
        let (mut engine, _clock) = engine_with(Config::default());
        engine.switch_mode(TimerMode::LongBreak, true);
        assert_eq!(engine.step_index(), 7);
        engine.switch_mode(TimerMode::ShortBreak, false);
        assert_eq!(engine.step_index(), 7);
        assert_eq!(engine.current_mode(), TimerMode::ShortBreak);
        assert_eq!(engine.time_remaining(), 300.0);
        assert!(!engine.is_running());
    }

    #[test]
    fn switch_mode_outside_routine_resets_index_to_zero() {
        let (mut engine, _clock) = engine_with(single_config());
        engine.switch_mode(TimerMode::LongBreak, true);
        assert_eq!(engine.step_index(), 0);
        assert_eq!(engine.current_mode(), TimerMode::LongBreak);
    }

    #[test]
    fn full_reset_flag_clears_itself() {
        let (mut engine, clock) = engine_with(Config::default());
        engine.reset_full_cycle();
        assert!(engine.full_reset_performed());
        clock.advance(Duration::from_millis(300));
        engine.poll();
        assert!(engine.full_reset_performed());
        clock.advance(Duration::from_millis(300));
        let events = engine.poll();
        assert!(!engine.full_reset_performed());
        assert!(matches!(events.as_slice(), [Event::FullResetCleared { .. }]));

        // A second hard reset raises it again.
        engine.reset_full_cycle();
        assert!(engine.full_reset_performed());
    }

    #[test]
    fn full_reset_in_single_keeps_selected_mode() {
        let (mut engine, _clock) = engine_with(single_config());
        engine.switch_mode(TimerMode::ShortBreak, true);
        engine.start();
        engine.reset_full_cycle();
        assert_eq!(engine.current_mode(), TimerMode::ShortBreak);
        assert_eq!(engine.time_remaining(), 300.0);
        assert!(!engine.is_running());
    }

    #[test]
    fn step_override_duration_is_used() {
        let mut config = Config::default();
        let id = config
            .add_routine(
                "Long focus",
                vec![
                    RoutineStep::with_duration_min(TimerMode::Pomodoro, 50.0),
                    RoutineStep::new(TimerMode::ShortBreak),
                ],
            )
            .unwrap();
        config.select_routine(id).unwrap();
        let (mut engine, _clock) = engine_with(config);
        assert_eq!(engine.time_remaining(), 3000.0);
        engine.skip_current_step();
        assert_eq!(engine.time_remaining(), 300.0);
        engine.skip_current_step();
        assert_eq!(engine.time_remaining(), 3000.0);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut config = single_config();
        config.timer.pomodoro_min = 4.0 / 60.0;
        let (mut engine, clock) = engine_with(config);
        assert_eq!(engine.progress(), 0.0);
        engine.start();
        clock.advance_secs(1);
        engine.poll();
        assert_eq!(engine.progress(), 0.25);
    }

    #[test]
    fn reset_counters_zeroes_everything() {
        let (mut engine, _clock) = engine_with(Config::default());
        engine.skip_current_step();
        engine.skip_current_step();
        assert_eq!(engine.counters().total(), 2);
        assert!(matches!(engine.reset_counters(), Some(Event::CountersReset { .. })));
        assert_eq!(engine.counters(), Counters::default());
    }

    #[test]
    fn snapshot_reflects_state() {
        let (engine, _clock) = engine_with(Config::default());
        let snap = engine.snapshot();
        assert_eq!(snap.state, TimerState::Idle);
        assert_eq!(snap.mode, TimerMode::Pomodoro);
        assert_eq!(snap.step_count, 8);
        assert_eq!(snap.routine_name.as_deref(), Some("Classic"));
        assert_eq!(snap.remaining_secs, 1500.0);
    }
}
