//! Core error types for pomobar-core.
//!
//! The timer engine itself never fails; invalid states degrade to defaults.
//! These errors cover the surfaces that touch the outside world: the config
//! file, settings validation, and the service channels.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomobar-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The timer service is no longer running.
    #[error("Timer service has shut down")]
    ServiceClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Referenced routine does not exist
    #[error("Routine not found: {0}")]
    RoutineNotFound(String),

    /// Routine name already in use
    #[error("A routine named '{0}' already exists")]
    DuplicateRoutineName(String),

    /// Invalid duration
    #[error("Invalid duration for '{field}': {value} (must be a positive number of minutes)")]
    InvalidDuration { field: String, value: f64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
