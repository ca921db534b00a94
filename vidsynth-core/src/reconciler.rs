//! Status reconciliation across the REST snapshot, the event stream and
//! optimistic local writes.
//!
//! All writers go through [`Reconciler::apply`] with a [`StatusWrite`]. Each
//! write touches only the ids it names; the last write for an id wins.
//! Reads layer the id-keyed entries over the video's own server status.

use std::collections::HashMap;

use crate::types::{PipelineStatus, VideoResource, VideoStatus};

/// Partial status/progress update for one video.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusPatch {
    pub status: Option<PipelineStatus>,
    pub progress: Option<f64>,
}

/// A single write into the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusWrite {
    /// Full-state resync after a stream (re)connect. Ids absent from the
    /// payload keep their entries.
    Snapshot(Vec<(String, StatusPatch)>),
    /// One incremental stream event
    Update { video_id: String, patch: StatusPatch },
    /// Server reported the run finished
    Complete { video_id: String },
    /// Server reported the run failed
    Failure { video_id: String },
    /// User triggered a run; written before the server acknowledges it
    Optimistic { video_id: String },
}

impl StatusWrite {
    /// Name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            StatusWrite::Snapshot(_) => "snapshot",
            StatusWrite::Update { .. } => "status_update",
            StatusWrite::Complete { .. } => "task_complete",
            StatusWrite::Failure { .. } => "error",
            StatusWrite::Optimistic { .. } => "optimistic",
        }
    }
}

/// Per-video status/progress projection.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    status_by_video: HashMap<String, PipelineStatus>,
    progress_by_video: HashMap<String, f64>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one write.
    pub fn apply(&mut self, write: StatusWrite) {
        tracing::debug!(kind = write.kind(), "Applying status write");
        match write {
            StatusWrite::Snapshot(entries) => {
                for (video_id, patch) in entries {
                    self.patch(&video_id, patch);
                }
            }
            StatusWrite::Update { video_id, patch } => self.patch(&video_id, patch),
            StatusWrite::Complete { video_id } => {
                self.set(&video_id, PipelineStatus::Done, Some(100.0));
            }
            StatusWrite::Failure { video_id } => {
                self.set(&video_id, PipelineStatus::Error, None);
            }
            StatusWrite::Optimistic { video_id } => {
                self.set(&video_id, PipelineStatus::Processing, Some(0.0));
            }
        }
    }

    fn patch(&mut self, video_id: &str, patch: StatusPatch) {
        if let Some(status) = patch.status {
            self.status_by_video.insert(video_id.to_string(), status);
        }
        if let Some(progress) = patch.progress {
            self.progress_by_video
                .insert(video_id.to_string(), clamp_progress(progress));
        }
        tracing::debug!(
            video_id = %video_id,
            status = ?patch.status,
            progress = ?patch.progress,
            "Status entry patched"
        );
    }

    fn set(&mut self, video_id: &str, status: PipelineStatus, progress: Option<f64>) {
        self.patch(
            video_id,
            StatusPatch {
                status: Some(status),
                progress,
            },
        );
    }

    /// Reconciled status for `video`.
    ///
    /// An entry written by any path wins outright; otherwise the video's own
    /// server fields decide (see [`fallback_status`]).
    pub fn resolve_status(&self, video: &VideoResource) -> PipelineStatus {
        self.status_by_video
            .get(&video.id)
            .copied()
            .unwrap_or_else(|| fallback_status(video.status, video.segmented))
    }

    /// Reconciled progress (0-100) for `video`.
    pub fn progress(&self, video: &VideoResource) -> f64 {
        match self.progress_by_video.get(&video.id) {
            Some(progress) => *progress,
            None if self.resolve_status(video) == PipelineStatus::Done => 100.0,
            None => 0.0,
        }
    }

    /// Explicit status entry for an id, if any path has written one.
    pub fn entry(&self, video_id: &str) -> Option<PipelineStatus> {
        self.status_by_video.get(video_id).copied()
    }

    /// Drop every entry (the owning view went away).
    pub fn clear(&mut self) {
        self.status_by_video.clear();
        self.progress_by_video.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.status_by_video.is_empty() && self.progress_by_video.is_empty()
    }
}

/// Status of a video nothing has written an entry for yet.
///
/// Pending/processing collapse to processing; ready, or clip output already
/// present, is done; error stays error; anything else is idle.
pub fn fallback_status(status: VideoStatus, segmented: bool) -> PipelineStatus {
    match status {
        VideoStatus::Pending | VideoStatus::Processing => PipelineStatus::Processing,
        _ if segmented => PipelineStatus::Done,
        other => PipelineStatus::from_video(other),
    }
}

fn clamp_progress(progress: f64) -> f64 {
    if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
