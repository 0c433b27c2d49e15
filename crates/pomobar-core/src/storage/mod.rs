mod config;
mod store;

pub use config::{AppearanceConfig, Config, NotificationsConfig, RoutinesConfig, TimerConfig};
pub use store::SettingsStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the data directory, creating it if needed.
///
/// `POMOBAR_CONFIG_DIR` wins when set. Otherwise `~/.config/pomobar[-dev]/`,
/// with the `-dev` suffix when `POMOBAR_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOBAR_CONFIG_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOBAR_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pomobar-dev")
            } else {
                base_dir.join("pomobar")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
