use clap::Subcommand;
use pomobar_core::{Counters, TimerMode};

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Completed interval counts
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Zero all counters
    Reset,
}

pub fn run(action: StatsAction) -> CliResult {
    let store = open_store()?;

    match action {
        StatsAction::Show { json } => {
            let counters = store.current().counters;
            if json {
                println!("{}", serde_json::to_string_pretty(&counters)?);
            } else {
                for mode in TimerMode::ALL {
                    println!("{} {:<12} {}", mode.icon(), mode.title(), counters.get(mode));
                }
                println!("   {:<12} {}", "Total", counters.total());
            }
        }
        StatsAction::Reset => {
            store.update(|config| {
                config.counters = Counters::default();
                Ok(())
            })?;
            println!("counters reset");
        }
    }
    Ok(())
}
