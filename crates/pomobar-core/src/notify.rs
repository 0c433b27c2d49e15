//! Completion alerts and sounds.
//!
//! The engine only says "interval of mode M finished" and "play sound S".
//! A [`Notifier`] turns that into something the user sees or hears.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;

use crate::timer::TimerMode;

/// A completion alert ready to present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub mode: TimerMode,
    pub title: String,
    pub message: String,
    pub scale: f64,
    pub duration_secs: f64,
}

pub trait Notifier: Send + Sync {
    fn play_sound(&self, sound: &str);
    fn show_alert(&self, alert: &Alert);
}

/// Per-mode pools of alert messages.
#[derive(Debug, Clone)]
pub struct AlertCatalog {
    pomodoro: Vec<String>,
    short_break: Vec<String>,
    long_break: Vec<String>,
}

impl Default for AlertCatalog {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            pomodoro: owned(&[
                "Pomodoro done. Step away from the keyboard.",
                "Nice focus! Time to stretch.",
                "That's one more in the bag.",
                "Focus block complete. Grab some water.",
                "Great work. Let your eyes rest for a bit.",
            ]),
            short_break: owned(&[
                "Break's over. Back to it!",
                "Recharged? Let's get going.",
                "Short break done. One more push.",
                "Time to dive back in.",
            ]),
            long_break: owned(&[
                "Long break finished. Ready for a new set?",
                "Fully rested. Let's start fresh.",
                "Welcome back! A new round awaits.",
            ]),
        }
    }
}

impl AlertCatalog {
    pub fn messages(&self, mode: TimerMode) -> &[String] {
        match mode {
            TimerMode::Pomodoro => &self.pomodoro,
            TimerMode::ShortBreak => &self.short_break,
            TimerMode::LongBreak => &self.long_break,
        }
    }

    pub fn title(mode: TimerMode) -> String {
        format!("{} {} complete", mode.icon(), mode.title())
    }

    /// Build an alert with a message picked from the mode's pool.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        mode: TimerMode,
        scale: f64,
        duration_secs: f64,
        rng: &mut R,
    ) -> Alert {
        let message = self
            .messages(mode)
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| format!("{} finished.", mode.title()));
        Alert {
            mode,
            title: Self::title(mode),
            message,
            scale,
            duration_secs,
        }
    }
}

/// Writes alerts and sounds to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn play_sound(&self, sound: &str) {
        info!(sound, "play sound");
    }

    fn show_alert(&self, alert: &Alert) {
        info!(mode = ?alert.mode, title = %alert.title, message = %alert.message, "completion alert");
    }
}

/// Keeps everything it is asked to do. Handy in tests and previews.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sounds: Mutex<Vec<String>>,
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> Vec<String> {
        self.sounds.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn play_sound(&self, sound: &str) {
        self.sounds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sound.to_string());
    }

    fn show_alert(&self, alert: &Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(alert.clone());
    }
}
