mod clock;
mod counters;
mod engine;
mod mode;
mod routine;
mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use counters::Counters;
pub use engine::{
    TimerEngine, TimerState, COMPLETION_DELAY, FULL_RESET_FLAG_DURATION, SECOND_CHIME_DELAY,
    TICK_INTERVAL,
};
pub use mode::{OperatingMode, TimerMode};
pub use routine::{Routine, RoutineStep, CLASSIC_ROUTINE_ID};
pub use snapshot::{format_clock, TimerSnapshot};
