pub mod config;
pub mod modes;
pub mod routine;
pub mod stats;
pub mod timer;

use pomobar_core::SettingsStore;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Settings store backed by the default config file.
pub fn open_store() -> Result<SettingsStore, Box<dyn std::error::Error>> {
    Ok(SettingsStore::open()?)
}
