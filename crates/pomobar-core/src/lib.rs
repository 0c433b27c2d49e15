//! # Pomobar Core Library
//!
//! Core logic for the Pomobar menu-bar Pomodoro timer. Everything the
//! `pomobar` binary does goes through this crate, so other front ends can
//! drive the same timer.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a deadline-driven state machine. It owns no threads;
//!   the host asks for the next deadline, sleeps until then and calls `poll()`
//! - **Service**: a tokio task that hosts the engine, accepts commands and
//!   reconciles against settings changes
//! - **Storage**: TOML configuration shared through a watched settings store
//! - **Notify**: completion alerts and sounds
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`TimerService`] / [`TimerHandle`]: async host and its client
//! - [`Config`] / [`SettingsStore`]: configuration and change notification
//! - [`Notifier`]: trait for presenting alerts and sounds

pub mod error;
pub mod events;
pub mod notify;
pub mod service;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use notify::{Alert, AlertCatalog, LogNotifier, Notifier, RecordingNotifier};
pub use service::{Command, TimerHandle, TimerService};
pub use storage::{Config, SettingsStore};
pub use timer::{
    format_clock, Clock, Counters, ManualClock, OperatingMode, Routine, RoutineStep, SystemClock,
    TimerEngine, TimerMode, TimerSnapshot, TimerState, TokioClock, CLASSIC_ROUTINE_ID,
};
