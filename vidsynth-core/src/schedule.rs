//! Cancellable fixed-interval schedule for simulated runs.
//!
//! The owner polls with the current instant; the schedule reports how many
//! ticks fell due since the last poll. Dropping the schedule cancels it.

use std::time::{Duration, Instant};

/// Fixed-rate tick source driven by the caller's clock.
#[derive(Debug, Clone)]
pub struct IntervalSchedule {
    interval: Duration,
    next_due: Instant,
}

impl IntervalSchedule {
    /// Start a schedule whose first tick is due one interval after `now`.
    pub fn start(interval: Duration, now: Instant) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks due at `now`; consumed ticks are not reported again.
    pub fn due(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while self.next_due <= now {
            ticks += 1;
            self.next_due += self.interval;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tick_before_first_interval() {
        let now = Instant::now();
        let mut schedule = IntervalSchedule::start(Duration::from_millis(50), now);
        assert_eq!(schedule.due(now), 0);
        assert_eq!(schedule.due(now + Duration::from_millis(49)), 0);
    }

    #[test]
    fn test_catches_up_missed_ticks_once() {
        let now = Instant::now();
        let mut schedule = IntervalSchedule::start(Duration::from_millis(30), now);
        assert_eq!(schedule.due(now + Duration::from_millis(95)), 3);
        assert_eq!(schedule.due(now + Duration::from_millis(95)), 0);
        assert_eq!(schedule.due(now + Duration::from_millis(120)), 1);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let schedule = IntervalSchedule::start(Duration::ZERO, Instant::now());
        assert_eq!(schedule.interval(), Duration::from_millis(1));
    }
}
