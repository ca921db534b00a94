//! Semantic stage: simulated analysis scan and score bucketing for the
//! cross-video heatmap.

use std::time::{Duration, Instant};

use crate::schedule::IntervalSchedule;

/// Tick period of the simulated scan
pub const SCAN_TICK: Duration = Duration::from_millis(50);

/// Progress added per tick
pub const SCAN_STEP: u32 = 2;

/// Simulated "Start Analysis" scan.
#[derive(Debug, Clone, Default)]
pub struct SemanticScan {
    progress: u32,
    schedule: Option<IntervalSchedule>,
}

impl SemanticScan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Start a scan. Returns false (and does nothing) while one is running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.progress = 0;
        self.schedule = Some(IntervalSchedule::start(SCAN_TICK, now));
        tracing::debug!("Semantic scan started");
        true
    }

    /// Advance by every tick due at `now`. Returns true if anything changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(schedule) = self.schedule.as_mut() else {
            return false;
        };
        let ticks = schedule.due(now);
        for _ in 0..ticks {
            if self.progress >= 100 {
                self.progress = 100;
                self.schedule = None;
                tracing::debug!("Semantic scan finished");
                break;
            }
            self.progress += SCAN_STEP;
        }
        ticks > 0
    }

    /// Stop without finishing.
    pub fn cancel(&mut self) {
        self.schedule = None;
        self.progress = 0;
    }

    /// Raw scan progress (0-100)
    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Bar fill: the scan progress while running, full when idle.
    pub fn display_progress(&self) -> u32 {
        if self.is_running() {
            self.progress
        } else {
            100
        }
    }
}

/// Heatmap color class of a segment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBucket {
    Low,
    Medium,
    High,
    Peak,
}

impl ScoreBucket {
    /// Bucket for `score`; a missing score counts as 0.
    pub fn from_score(score: Option<f64>) -> Self {
        let score = score.unwrap_or(0.0);
        if score < 0.4 {
            ScoreBucket::Low
        } else if score < 0.6 {
            ScoreBucket::Medium
        } else if score < 0.8 {
            ScoreBucket::High
        } else {
            ScoreBucket::Peak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBucket::Low => "low",
            ScoreBucket::Medium => "medium",
            ScoreBucket::High => "high",
            ScoreBucket::Peak => "peak",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_runs_to_completion() {
        let start = Instant::now();
        let mut scan = SemanticScan::new();
        assert!(scan.start(start));
        assert_eq!(scan.display_progress(), 0);

        scan.poll(start + SCAN_TICK * 10);
        assert_eq!(scan.progress(), 20);
        assert!(scan.is_running());

        scan.poll(start + SCAN_TICK * 60);
        assert_eq!(scan.progress(), 100);
        assert!(!scan.is_running());
        assert_eq!(scan.display_progress(), 100);
    }

    #[test]
    fn test_scan_retrigger_ignored_while_running() {
        let start = Instant::now();
        let mut scan = SemanticScan::new();
        scan.start(start);
        scan.poll(start + SCAN_TICK * 5);
        assert!(!scan.start(start + SCAN_TICK * 5));
        assert_eq!(scan.progress(), 10);
    }

    #[test]
    fn test_scan_cancel() {
        let start = Instant::now();
        let mut scan = SemanticScan::new();
        scan.start(start);
        scan.cancel();
        assert!(!scan.is_running());
        assert!(!scan.poll(start + SCAN_TICK * 5));
    }

    #[test]
    fn test_score_buckets() {
        assert_eq!(ScoreBucket::from_score(None), ScoreBucket::Low);
        assert_eq!(ScoreBucket::from_score(Some(0.39)), ScoreBucket::Low);
        assert_eq!(ScoreBucket::from_score(Some(0.4)), ScoreBucket::Medium);
        assert_eq!(ScoreBucket::from_score(Some(0.6)), ScoreBucket::High);
        assert_eq!(ScoreBucket::from_score(Some(0.8)), ScoreBucket::Peak);
    }
}
