use clap::Subcommand;
use pomobar_core::error::Result as CoreResult;
use pomobar_core::{Config, RoutineStep, TimerMode, ValidationError};
use uuid::Uuid;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum RoutineAction {
    /// List routines
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a routine
    Add {
        /// Routine name
        name: String,
        /// Steps as MODE or MODE:MINUTES (e.g. p s p:50 l)
        #[arg(required = true)]
        steps: Vec<String>,
        /// Make it the selected routine
        #[arg(long)]
        select: bool,
    },
    /// Remove a routine
    Remove {
        /// Routine id or name
        routine: String,
    },
    /// Rename a routine
    Rename {
        /// Routine id or name
        routine: String,
        /// New name
        name: String,
    },
    /// Select the routine the timer follows
    Select {
        /// Routine id or name
        routine: String,
    },
    /// Replace a routine's steps
    Steps {
        /// Routine id or name
        routine: String,
        /// Steps as MODE or MODE:MINUTES
        #[arg(required = true)]
        steps: Vec<String>,
    },
}

/// Parse `p`, `short_break`, `p:50` and the like.
pub fn parse_step(raw: &str) -> Result<RoutineStep, ValidationError> {
    let (mode, minutes) = match raw.split_once(':') {
        Some((mode, minutes)) => (mode, Some(minutes)),
        None => (raw, None),
    };
    let mode: TimerMode = mode.parse()?;
    match minutes {
        None => Ok(RoutineStep::new(mode)),
        Some(minutes) => {
            let value: f64 = minutes.trim().parse().map_err(|_| ValidationError::InvalidValue {
                field: "step".into(),
                message: format!("cannot parse '{minutes}' as minutes"),
            })?;
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidDuration {
                    field: format!("step '{raw}'"),
                    value,
                });
            }
            Ok(RoutineStep::with_duration_min(mode, value))
        }
    }
}

fn parse_steps(raw: &[String]) -> Result<Vec<RoutineStep>, ValidationError> {
    raw.iter().map(|s| parse_step(s)).collect()
}

fn resolve(config: &Config, needle: &str) -> CoreResult<Uuid> {
    config
        .find_routine(needle)
        .map(|r| r.id)
        .ok_or_else(|| ValidationError::RoutineNotFound(needle.to_string()).into())
}

pub fn run(action: RoutineAction) -> CliResult {
    let store = open_store()?;

    match action {
        RoutineAction::List { json } => {
            let config = store.current();
            if json {
                println!("{}", serde_json::to_string_pretty(&config.routines)?);
                return Ok(());
            }
            let selected = config.selected_routine().map(|r| r.id);
            for routine in &config.routines.list {
                let marker = if Some(routine.id) == selected { "*" } else { " " };
                println!(
                    "{marker} {:<20} {:>3} steps {:>6.0} min  {}  {}",
                    routine.name,
                    routine.len(),
                    routine.total_duration_secs(&config) / 60.0,
                    routine.summary(),
                    routine.id
                );
            }
        }
        RoutineAction::Add { name, steps, select } => {
            let steps = parse_steps(&steps)?;
            let id = store.update(|config| {
                let id = config.add_routine(&name, steps)?;
                if select {
                    config.select_routine(id)?;
                }
                Ok(id)
            })?;
            println!("{id}");
        }
        RoutineAction::Remove { routine } => {
            let removed = store.update(|config| {
                let id = resolve(config, &routine)?;
                config.remove_routine(id)
            })?;
            println!("removed {}", removed.name);
        }
        RoutineAction::Rename { routine, name } => {
            store.update(|config| {
                let id = resolve(config, &routine)?;
                config.rename_routine(id, &name)
            })?;
            println!("ok");
        }
        RoutineAction::Select { routine } => {
            store.update(|config| {
                let id = resolve(config, &routine)?;
                config.select_routine(id)
            })?;
            println!("ok");
        }
        RoutineAction::Steps { routine, steps } => {
            let steps = parse_steps(&steps)?;
            store.update(|config| {
                let id = resolve(config, &routine)?;
                config.set_routine_steps(id, steps)
            })?;
            println!("ok");
        }
    }
    Ok(())
}
