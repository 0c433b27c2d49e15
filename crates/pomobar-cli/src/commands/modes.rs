use pomobar_core::{format_clock, TimerMode};

use super::{open_store, CliResult};

pub fn run() -> CliResult {
    let config = open_store()?.current();
    for mode in TimerMode::ALL {
        println!(
            "{} {:<12} {:<12} {:>8}  {}",
            config.icon(mode),
            mode.key(),
            mode.title(),
            format_clock(config.duration_secs(mode)),
            mode.description()
        );
    }
    Ok(())
}
