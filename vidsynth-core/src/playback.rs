//! Simulated playhead for the segmentation stage.

use std::time::Instant;

/// Position in seconds that advances with wall time while playing and
/// wraps at the video's duration.
#[derive(Debug, Clone, Default)]
pub struct Playhead {
    position: f64,
    playing_since: Option<Instant>,
}

impl Playhead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.playing_since.take().is_none() {
            self.playing_since = Some(now);
        }
    }

    /// Jump to `seconds`, clamped into `[0, duration]`.
    pub fn seek(&mut self, seconds: f64, duration: f64) {
        self.position = seconds.clamp(0.0, duration.max(0.0));
    }

    /// Advance to `now`.
    pub fn advance(&mut self, now: Instant, duration: f64) {
        let Some(since) = self.playing_since else {
            return;
        };
        let elapsed = now.saturating_duration_since(since).as_secs_f64();
        self.playing_since = Some(now);
        if duration <= 0.0 {
            self.position = 0.0;
            return;
        }
        self.position = (self.position + elapsed) % duration;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
