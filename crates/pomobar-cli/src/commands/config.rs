use clap::Subcommand;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.pomodoro_min", "notifications.sound")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config (counters included) to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> CliResult {
    let store = open_store()?;

    match action {
        ConfigAction::Get { key } => match store.current().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            store.update(|config| config.set(&key, &value))?;
            println!("ok");
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(&store.current())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.reset_to_defaults()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            if let Some(path) = store.path() {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}
