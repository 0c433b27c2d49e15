use serde::{Deserialize, Serialize};

use super::mode::TimerMode;

/// Completed-interval tallies. Only ever incremented, except by an
/// explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    #[serde(default)]
    pub pomodoros: u64,
    #[serde(default)]
    pub short_breaks: u64,
    #[serde(default)]
    pub long_breaks: u64,
}

impl Counters {
    pub fn get(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Pomodoro => self.pomodoros,
            TimerMode::ShortBreak => self.short_breaks,
            TimerMode::LongBreak => self.long_breaks,
        }
    }

    /// Bump the tally for `mode` and return the new value.
    pub fn increment(&mut self, mode: TimerMode) -> u64 {
        let slot = match mode {
            TimerMode::Pomodoro => &mut self.pomodoros,
            TimerMode::ShortBreak => &mut self.short_breaks,
            TimerMode::LongBreak => &mut self.long_breaks,
        };
        *slot = slot.saturating_add(1);
        *slot
    }

    pub fn total(&self) -> u64 {
        self.pomodoros
            .saturating_add(self.short_breaks)
            .saturating_add(self.long_breaks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_saturates() {
        let c = Counters {
            pomodoros: u64::MAX,
            short_breaks: 2,
            long_breaks: 1,
        };
        assert_eq!(c.total(), u64::MAX);
    }

    #[test]
    fn increment_touches_only_its_mode() {
        let mut c = Counters::default();
        assert_eq!(c.increment(TimerMode::ShortBreak), 1);
        assert_eq!(c.increment(TimerMode::ShortBreak), 2);
        assert_eq!(c.get(TimerMode::Pomodoro), 0);
        assert_eq!(c.get(TimerMode::LongBreak), 0);
        assert_eq!(c.total(), 2);
    }
}
