//! Strategy stage: tunable serialization parameters and the simulated
//! strategy run that narrates into the log.

use std::time::{Duration, Instant};

use crate::schedule::IntervalSchedule;
use crate::types::{LogEntry, LogKind};

/// Tick period of a strategy run
pub const RUN_TICK: Duration = Duration::from_millis(30);

/// Steps in one run
pub const RUN_STEPS: u32 = 100;

/// Strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub merge_gap: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            upper_threshold: 0.20,
            lower_threshold: 0.21,
            min_duration: 2.0,
            max_duration: 6.0,
            merge_gap: 1.0,
        }
    }
}

/// One editable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyField {
    UpperThreshold,
    LowerThreshold,
    MinDuration,
    MaxDuration,
    MergeGap,
}

impl StrategyField {
    pub const ALL: [StrategyField; 5] = [
        StrategyField::UpperThreshold,
        StrategyField::LowerThreshold,
        StrategyField::MinDuration,
        StrategyField::MaxDuration,
        StrategyField::MergeGap,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StrategyField::UpperThreshold => "Upper Threshold",
            StrategyField::LowerThreshold => "Lower Threshold",
            StrategyField::MinDuration => "Min Duration (s)",
            StrategyField::MaxDuration => "Max Duration (s)",
            StrategyField::MergeGap => "Merge Gap (s)",
        }
    }

    /// Increment applied by one adjustment
    pub fn step(&self) -> f64 {
        match self {
            StrategyField::UpperThreshold | StrategyField::LowerThreshold => 0.01,
            _ => 0.1,
        }
    }

    fn decimals(&self) -> i32 {
        match self {
            StrategyField::UpperThreshold | StrategyField::LowerThreshold => 2,
            _ => 1,
        }
    }

    /// Next field, wrapping
    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous field, wrapping
    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl StrategyParams {
    pub fn get(&self, field: StrategyField) -> f64 {
        match field {
            StrategyField::UpperThreshold => self.upper_threshold,
            StrategyField::LowerThreshold => self.lower_threshold,
            StrategyField::MinDuration => self.min_duration,
            StrategyField::MaxDuration => self.max_duration,
            StrategyField::MergeGap => self.merge_gap,
        }
    }

    fn slot(&mut self, field: StrategyField) -> &mut f64 {
        match field {
            StrategyField::UpperThreshold => &mut self.upper_threshold,
            StrategyField::LowerThreshold => &mut self.lower_threshold,
            StrategyField::MinDuration => &mut self.min_duration,
            StrategyField::MaxDuration => &mut self.max_duration,
            StrategyField::MergeGap => &mut self.merge_gap,
        }
    }

    /// Move `field` by `steps` increments, rounded to the field's precision.
    /// Values never go below zero.
    pub fn adjust(&mut self, field: StrategyField, steps: i32) {
        let scale = 10f64.powi(field.decimals());
        let slot = self.slot(field);
        let next = *slot + field.step() * f64::from(steps);
        *slot = ((next * scale).round() / scale).max(0.0);
    }
}

/// Log lines a run emits at `step` (1-based).
pub fn messages_for_step(step: u32, params: &StrategyParams) -> Vec<(LogKind, String)> {
    let mut messages = Vec::new();
    match step {
        5 => messages.push((
            LogKind::Info,
            format!(
                "Initializing serialization with Threshold=[{}, {}]",
                params.lower_threshold, params.upper_threshold
            ),
        )),
        15 => messages.push((
            LogKind::Info,
            "Loaded 7 video contexts into memory.".to_string(),
        )),
        25 => messages.push((
            LogKind::Filter,
            format!("Filtering segments < {}s...", params.min_duration),
        )),
        35 => messages.push((
            LogKind::Filter,
            format!(
                "Dropped 12 noise segments (Score < {})",
                params.lower_threshold
            ),
        )),
        50 => messages.push((
            LogKind::Merge,
            format!(
                "Analyzing gaps < {}s for merge candidates...",
                params.merge_gap
            ),
        )),
        65 => messages.push((
            LogKind::Merge,
            "Merged Seg#12 and Seg#13 (Gap: 0.2s)".to_string(),
        )),
        80 => messages.push((
            LogKind::Merge,
            "Merged Seg#45 and Seg#46 (Gap: 0.5s)".to_string(),
        )),
        95 => messages.push((
            LogKind::Result,
            "Serialization Complete. 8 Final Cuts generated.".to_string(),
        )),
        _ => {}
    }
    if (50..90).contains(&step) && step % 10 == 0 {
        messages.push((
            LogKind::Info,
            format!("Processing batch chunk #{}...", step),
        ));
    }
    messages
}

/// Simulated "Run Strategy" execution and its log.
#[derive(Debug, Clone, Default)]
pub struct StrategyRun {
    params: StrategyParams,
    step: u32,
    progress: u32,
    logs: Vec<LogEntry>,
    schedule: Option<IntervalSchedule>,
}

impl StrategyRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    /// Parameters are editable between runs only.
    pub fn params_mut(&mut self) -> Option<&mut StrategyParams> {
        if self.is_running() {
            None
        } else {
            Some(&mut self.params)
        }
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Start a run: clears the log. Returns false while one is running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.step = 0;
        self.progress = 0;
        self.logs.clear();
        self.schedule = Some(IntervalSchedule::start(RUN_TICK, now));
        tracing::debug!(params = ?self.params, "Strategy run started");
        true
    }

    /// Advance by every tick due at `now`. Returns true if anything changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(schedule) = self.schedule.as_mut() else {
            return false;
        };
        let ticks = schedule.due(now);
        for _ in 0..ticks {
            self.progress = (self.progress + 2).min(100);
            self.step += 1;

            for (kind, message) in messages_for_step(self.step, &self.params) {
                self.logs.push(LogEntry::now(kind, message));
            }

            if self.step >= RUN_STEPS {
                self.schedule = None;
                self.progress = 100;
                tracing::debug!(lines = self.logs.len(), "Strategy run finished");
                break;
            }
        }
        ticks > 0
    }

    /// Stop and forget the current run; parameters are kept.
    pub fn cancel(&mut self) {
        self.schedule = None;
        self.step = 0;
        self.progress = 0;
        self.logs.clear();
    }
}
