//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Per-mode durations and the operating mode
//! - Routines and the selected routine
//! - Sound and alert preferences
//! - Status bar icons
//! - Completion counters
//!
//! Configuration is stored at `~/.config/pomobar/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result, ValidationError};
use crate::timer::{Counters, OperatingMode, Routine, RoutineStep, TimerMode};

/// Durations and operating mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_pomodoro_min")]
    pub pomodoro_min: f64,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: f64,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: f64,
    #[serde(default)]
    pub operating_mode: OperatingMode,
    /// Mode repeated in cycle operating mode.
    #[serde(default = "default_cycle_mode")]
    pub cycle_mode: TimerMode,
}

/// Sound and alert preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_sound")]
    pub sound: String,
    /// Passed through to the alert presenter.
    #[serde(default = "default_alert_scale")]
    pub alert_scale: f64,
    #[serde(default = "default_alert_duration")]
    pub alert_duration_secs: f64,
}

/// Status bar appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceConfig {
    #[serde(default = "default_pomodoro_icon")]
    pub pomodoro_icon: String,
    #[serde(default = "default_short_break_icon")]
    pub short_break_icon: String,
    #[serde(default = "default_long_break_icon")]
    pub long_break_icon: String,
    /// Show the countdown next to the icon.
    #[serde(default = "default_true")]
    pub show_countdown: bool,
}

/// Routine list and current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutinesConfig {
    #[serde(default)]
    pub selected: Option<Uuid>,
    #[serde(default)]
    pub list: Vec<Routine>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomobar/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub counters: Counters,
    #[serde(default)]
    pub routines: RoutinesConfig,
}

// Default functions
fn default_pomodoro_min() -> f64 {
    25.0
}
fn default_short_break_min() -> f64 {
    5.0
}
fn default_long_break_min() -> f64 {
    15.0
}
fn default_cycle_mode() -> TimerMode {
    TimerMode::Pomodoro
}
fn default_true() -> bool {
    true
}
fn default_sound() -> String {
    "Glass".into()
}
fn default_alert_scale() -> f64 {
    1.0
}
fn default_alert_duration() -> f64 {
    4.0
}
fn default_pomodoro_icon() -> String {
    TimerMode::Pomodoro.icon().into()
}
fn default_short_break_icon() -> String {
    TimerMode::ShortBreak.icon().into()
}
fn default_long_break_icon() -> String {
    TimerMode::LongBreak.icon().into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomodoro_min: default_pomodoro_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
            operating_mode: OperatingMode::default(),
            cycle_mode: default_cycle_mode(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            sound: default_sound(),
            alert_scale: default_alert_scale(),
            alert_duration_secs: default_alert_duration(),
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            pomodoro_icon: default_pomodoro_icon(),
            short_break_icon: default_short_break_icon(),
            long_break_icon: default_long_break_icon(),
            show_countdown: true,
        }
    }
}

impl Default for RoutinesConfig {
    fn default() -> Self {
        let classic = Routine::classic();
        Self {
            selected: Some(classic.id),
            list: vec![classic],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            notifications: NotificationsConfig::default(),
            appearance: AppearanceConfig::default(),
            counters: Counters::default(),
            routines: RoutinesConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            value
                                .parse::<f64>()
                                .ok()
                                .and_then(serde_json::Number::from_f64)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let durations = [
            ("timer.pomodoro_min", self.timer.pomodoro_min),
            ("timer.short_break_min", self.timer.short_break_min),
            ("timer.long_break_min", self.timer.long_break_min),
        ];
        for (field, value) in durations {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidDuration {
                    field: field.into(),
                    value,
                });
            }
        }
        for routine in &self.routines.list {
            for step in &routine.steps {
                if let Some(m) = step.duration_min {
                    if !m.is_finite() || m <= 0.0 {
                        return Err(ValidationError::InvalidDuration {
                            field: format!("routine '{}' step", routine.name),
                            value: m,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Configured duration of `mode` in seconds.
    pub fn duration_secs(&self, mode: TimerMode) -> f64 {
        let minutes = match mode {
            TimerMode::Pomodoro => self.timer.pomodoro_min,
            TimerMode::ShortBreak => self.timer.short_break_min,
            TimerMode::LongBreak => self.timer.long_break_min,
        };
        if minutes.is_finite() && minutes > 0.0 {
            minutes * 60.0
        } else {
            mode.default_duration_secs()
        }
    }

    pub fn icon(&self, mode: TimerMode) -> &str {
        let icon = match mode {
            TimerMode::Pomodoro => &self.appearance.pomodoro_icon,
            TimerMode::ShortBreak => &self.appearance.short_break_icon,
            TimerMode::LongBreak => &self.appearance.long_break_icon,
        };
        if icon.trim().is_empty() {
            mode.icon()
        } else {
            icon
        }
    }

    // ── Routines ─────────────────────────────────────────────────────

    /// The selected routine, if the selection still points at one.
    pub fn selected_routine(&self) -> Option<&Routine> {
        let id = self.routines.selected?;
        self.routines.list.iter().find(|r| r.id == id)
    }

    /// Look a routine up by id or (case-insensitive) name.
    pub fn find_routine(&self, needle: &str) -> Option<&Routine> {
        if let Ok(id) = needle.parse::<Uuid>() {
            if let Some(r) = self.routines.list.iter().find(|r| r.id == id) {
                return Some(r);
            }
        }
        self.routines
            .list
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(needle.trim()))
    }

    fn routine_mut(&mut self, id: Uuid) -> Result<&mut Routine> {
        self.routines
            .list
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ValidationError::RoutineNotFound(id.to_string()).into())
    }

    fn ensure_unique_name(&self, name: &str, except: Option<Uuid>) -> Result<()> {
        let taken = self
            .routines
            .list
            .iter()
            .any(|r| Some(r.id) != except && r.name.eq_ignore_ascii_case(name.trim()));
        if taken {
            return Err(ValidationError::DuplicateRoutineName(name.trim().to_string()).into());
        }
        Ok(())
    }

    /// Add a routine. It becomes selected if nothing valid was selected.
    pub fn add_routine(&mut self, name: &str, steps: Vec<RoutineStep>) -> Result<Uuid> {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "routine name must not be empty".into(),
            }
            .into());
        }
        self.ensure_unique_name(name, None)?;
        let routine = Routine::new(name.trim(), steps);
        let id = routine.id;
        self.routines.list.push(routine);
        if self.selected_routine().is_none() {
            self.routines.selected = Some(id);
        }
        Ok(id)
    }

    /// Remove a routine, moving the selection to the first remaining one.
    pub fn remove_routine(&mut self, id: Uuid) -> Result<Routine> {
        let pos = self
            .routines
            .list
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoreError::from(ValidationError::RoutineNotFound(id.to_string())))?;
        let removed = self.routines.list.remove(pos);
        if self.routines.selected == Some(id) {
            self.routines.selected = self.routines.list.first().map(|r| r.id);
        }
        Ok(removed)
    }

    pub fn rename_routine(&mut self, id: Uuid, name: &str) -> Result<()> {
        self.ensure_unique_name(name, Some(id))?;
        self.routine_mut(id)?.name = name.trim().to_string();
        Ok(())
    }

    pub fn set_routine_steps(&mut self, id: Uuid, steps: Vec<RoutineStep>) -> Result<()> {
        self.routine_mut(id)?.steps = steps;
        self.validate()?;
        Ok(())
    }

    pub fn select_routine(&mut self, id: Uuid) -> Result<()> {
        if !self.routines.list.iter().any(|r| r.id == id) {
            return Err(ValidationError::RoutineNotFound(id.to_string()).into());
        }
        self.routines.selected = Some(id);
        Ok(())
    }
}
