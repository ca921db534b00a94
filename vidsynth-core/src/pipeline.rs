//! Pipeline view state.
//!
//! [`PipelineState`] is owned by the top-level view. It holds the asset list,
//! the active selection and the per-video status projection, and turns user
//! actions and stream events into [`PipelineEffect`]s for the network worker.
//! All mutation happens on the owning thread; results of async work come back
//! through the `apply_*` methods.
//!
//! ```text
//!  assets ──> replace_assets ─┐
//!  stream ──> apply_stream_* ─┼──> Reconciler ──> resolve_status / progress
//!  user   ──> begin_run ──────┘         │
//!                                       └──> PipelineEffect::FetchSegments
//!                                              └──> apply_segments (ticket checked)
//! ```

use std::collections::HashMap;
use std::time::Instant;

use crate::assets::resolve_optional_url;
use crate::playback::Playhead;
use crate::reconciler::{Reconciler, StatusWrite};
use crate::segments::{FetchGenerations, FetchTicket};
use crate::semantic::SemanticScan;
use crate::strategy::StrategyRun;
use crate::stream::{ConnectionState, StreamEvent};
use crate::timeline::{SegmentRef, Timeline, TimelineCache};
use crate::types::{PipelineStatus, Segment, VideoResource};

/// Banner shown while the status stream is down
pub const STREAM_LOST_MESSAGE: &str = "SSE connection lost";

/// Placeholder while the first asset load is in flight
pub const LOADING_MESSAGE: &str = "Loading assets...";

/// Placeholder for an empty asset list
pub const EMPTY_MESSAGE: &str = "No videos found. Upload in Project Config.";

/// Work the owner must hand to the network worker.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEffect {
    /// Load predicted segments; the result goes to [`PipelineState::apply_segments`]
    FetchSegments {
        ticket: FetchTicket,
        clips_url: Option<String>,
    },
    /// Load ground truth; the result goes to [`PipelineState::apply_ground_truth`]
    FetchGroundTruth { video_id: String, gt_url: String },
}

/// A segmentation request produced by [`PipelineState::begin_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub video_ids: Vec<String>,
    /// True when re-running a video that is already done
    pub force: bool,
}

/// State of the pipeline view and its four stages.
#[derive(Debug)]
pub struct PipelineState {
    base_url: String,
    videos: Vec<VideoResource>,
    active_video_id: Option<String>,
    reconciler: Reconciler,
    generations: FetchGenerations,
    revision: u64,
    timeline: TimelineCache,
    task_error: Option<String>,
    connection: ConnectionState,
    /// Set on a stream error, cleared only once the stream is back
    stream_lost: bool,
    assets_loading: bool,
    assets_error: Option<String>,
    selected_segment: Option<SegmentRef>,
    /// Semantic stage scan
    pub semantic: SemanticScan,
    /// Strategy stage run and parameters
    pub strategy: StrategyRun,
    /// Segmentation stage playhead
    pub playback: Playhead,
}

impl PipelineState {
    /// Create an empty pipeline; `base_url` resolves links in stream payloads.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            videos: Vec::new(),
            active_video_id: None,
            reconciler: Reconciler::new(),
            generations: FetchGenerations::new(),
            revision: 0,
            timeline: TimelineCache::new(),
            task_error: None,
            connection: ConnectionState::Disconnected,
            stream_lost: false,
            assets_loading: true,
            assets_error: None,
            selected_segment: None,
            semantic: SemanticScan::new(),
            strategy: StrategyRun::new(),
            playback: Playhead::new(),
        }
    }

    // ========================================
    // Asset list
    // ========================================

    /// Mark an asset refresh as in flight.
    pub fn begin_asset_load(&mut self) {
        self.assets_loading = true;
        self.assets_error = None;
    }

    /// Install a freshly loaded asset list.
    ///
    /// The list is replaced wholesale. Segment lists already loaded for ids
    /// that survive are carried over; the active selection is kept if it still
    /// exists, else the first video is selected.
    pub fn replace_assets(&mut self, videos: Vec<VideoResource>) -> Vec<PipelineEffect> {
        let mut loaded: HashMap<String, (Vec<Segment>, Option<Vec<Segment>>)> = self
            .videos
            .drain(..)
            .map(|v| (v.id, (v.predicted_segments, v.ground_truth)))
            .collect();

        self.videos = videos;
        for video in &mut self.videos {
            if let Some((predicted, ground_truth)) = loaded.remove(&video.id) {
                video.predicted_segments = predicted;
                video.ground_truth = ground_truth;
            }
        }
        self.assets_loading = false;
        self.assets_error = None;
        self.touch();

        let previous = self.active_video_id.take();
        let next = match &previous {
            Some(id) if self.videos.iter().any(|v| &v.id == id) => Some(id.clone()),
            _ => self.videos.first().map(|v| v.id.clone()),
        };
        tracing::info!(
            videos = self.videos.len(),
            active = ?next,
            "Asset list replaced"
        );

        match next {
            Some(id) if previous.as_deref() == Some(id.as_str()) => {
                self.active_video_id = Some(id.clone());
                self.activation_effects(&id)
            }
            Some(id) => self.activate(id),
            None => Vec::new(),
        }
    }

    /// Record a failed asset refresh; the current list stays.
    pub fn assets_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "Asset refresh failed");
        self.assets_loading = false;
        self.assets_error = Some(message);
    }

    pub fn assets_loading(&self) -> bool {
        self.assets_loading
    }

    pub fn assets_error(&self) -> Option<&str> {
        self.assets_error.as_deref()
    }

    /// Placeholder text shown instead of the stages when no video is active.
    pub fn placeholder(&self) -> Option<String> {
        if self.active_video().is_some() {
            return None;
        }
        Some(if self.assets_loading {
            LOADING_MESSAGE.to_string()
        } else if let Some(error) = &self.assets_error {
            format!("Failed to load assets: {}", error)
        } else {
            EMPTY_MESSAGE.to_string()
        })
    }

    pub fn videos(&self) -> &[VideoResource] {
        &self.videos
    }

    pub fn video(&self, video_id: &str) -> Option<&VideoResource> {
        self.videos.iter().find(|v| v.id == video_id)
    }

    fn video_mut(&mut self, video_id: &str) -> Option<&mut VideoResource> {
        self.videos.iter_mut().find(|v| v.id == video_id)
    }

    // ========================================
    // Selection
    // ========================================

    pub fn active_video_id(&self) -> Option<&str> {
        self.active_video_id.as_deref()
    }

    pub fn active_video(&self) -> Option<&VideoResource> {
        self.active_video_id
            .as_deref()
            .and_then(|id| self.video(id))
    }

    pub fn active_index(&self) -> Option<usize> {
        let id = self.active_video_id.as_deref()?;
        self.videos.iter().position(|v| v.id == id)
    }

    /// Make `video_id` the active video. Unknown ids and the current
    /// selection are no-ops.
    pub fn select_video(&mut self, video_id: &str) -> Vec<PipelineEffect> {
        if self.active_video_id.as_deref() == Some(video_id) || self.video(video_id).is_none() {
            return Vec::new();
        }
        self.activate(video_id.to_string())
    }

    /// Select the video `offset` positions away from the active one, wrapping.
    pub fn select_relative(&mut self, offset: isize) -> Vec<PipelineEffect> {
        let len = self.videos.len();
        if len == 0 {
            return Vec::new();
        }
        let current = self.active_index().unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len as isize) as usize;
        let id = self.videos[next].id.clone();
        self.select_video(&id)
    }

    fn activate(&mut self, video_id: String) -> Vec<PipelineEffect> {
        tracing::debug!(video_id = %video_id, "Active video changed");
        self.active_video_id = Some(video_id.clone());
        self.task_error = None;
        self.playback.reset();
        self.reset_segments(&video_id);
        self.activation_effects(&video_id)
    }

    /// Fetches owed to a video on becoming (or staying) active.
    fn activation_effects(&mut self, video_id: &str) -> Vec<PipelineEffect> {
        let Some(video) = self.video(video_id) else {
            return Vec::new();
        };
        let needs_segments =
            self.reconciler.resolve_status(video) == PipelineStatus::Done || video.segmented;
        let clips_url = video.clips_url.clone();
        let ground_truth = match (&video.gt_url, &video.ground_truth) {
            (Some(gt_url), None) if video.has_gt => Some(gt_url.clone()),
            _ => None,
        };

        let mut effects = Vec::new();
        if needs_segments {
            effects.push(self.fetch_segments(video_id, clips_url));
        }
        if let Some(gt_url) = ground_truth {
            effects.push(PipelineEffect::FetchGroundTruth {
                video_id: video_id.to_string(),
                gt_url,
            });
        }
        effects
    }

    fn fetch_segments(&mut self, video_id: &str, clips_url: Option<String>) -> PipelineEffect {
        let ticket = self.generations.issue(video_id);
        tracing::debug!(
            video_id = %video_id,
            generation = ticket.generation,
            url = ?clips_url,
            "Segment fetch issued"
        );
        PipelineEffect::FetchSegments { ticket, clips_url }
    }

    fn reset_segments(&mut self, video_id: &str) {
        self.generations.invalidate(video_id);
        if let Some(video) = self.video_mut(video_id) {
            if !video.predicted_segments.is_empty() {
                video.predicted_segments.clear();
            }
        }
        self.touch();
    }

    // ========================================
    // Status reads
    // ========================================

    /// Reconciled status of `video`.
    pub fn resolve_status(&self, video: &VideoResource) -> PipelineStatus {
        self.reconciler.resolve_status(video)
    }

    /// Reconciled progress (0-100) of `video`.
    pub fn progress(&self, video: &VideoResource) -> f64 {
        self.reconciler.progress(video)
    }

    pub fn active_status(&self) -> Option<PipelineStatus> {
        self.active_video().map(|v| self.resolve_status(v))
    }

    /// Failure message for the active video's panel
    pub fn task_error(&self) -> Option<&str> {
        self.task_error.as_deref()
    }

    // ========================================
    // Runs
    // ========================================

    /// Start a segmentation run for the active video.
    ///
    /// Returns `None` while the video is already processing. Otherwise the
    /// optimistic write is applied immediately and the video's segment list
    /// is reset.
    pub fn begin_run(&mut self) -> Option<RunRequest> {
        let video = self.active_video()?;
        let status = self.resolve_status(video);
        if status.is_processing() {
            tracing::debug!(video_id = %video.id, "Run ignored, already processing");
            return None;
        }
        let video_id = video.id.clone();
        let force = status == PipelineStatus::Done;

        self.task_error = None;
        self.reconciler.apply(StatusWrite::Optimistic {
            video_id: video_id.clone(),
        });
        self.reset_segments(&video_id);
        tracing::info!(video_id = %video_id, force, "Segmentation run requested");

        Some(RunRequest {
            video_ids: vec![video_id],
            force,
        })
    }

    /// The segmentation request for `video_id` failed.
    pub fn run_failed(&mut self, video_id: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(video_id = %video_id, error = %message, "Segmentation request failed");
        self.reconciler.apply(StatusWrite::Failure {
            video_id: video_id.to_string(),
        });
        if self.active_video_id.as_deref() == Some(video_id) {
            self.task_error = Some(message);
        }
    }

    // ========================================
    // Status stream
    // ========================================

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Non-fatal banner for a lost stream, if any.
    ///
    /// Stays up through reconnect attempts until the stream is connected again.
    pub fn stream_banner(&self) -> Option<&'static str> {
        self.stream_lost.then_some(STREAM_LOST_MESSAGE)
    }

    /// Track the stream's connection state. Known statuses are never cleared.
    pub fn set_connection(&mut self, state: ConnectionState) {
        if state != self.connection {
            tracing::debug!(state = state.as_str(), "Stream connection state");
        }
        match state {
            ConnectionState::Error => self.stream_lost = true,
            ConnectionState::Connected => self.stream_lost = false,
            _ => {}
        }
        self.connection = state;
    }

    /// Apply one stream event.
    pub fn apply_stream_event(&mut self, event: StreamEvent) -> Vec<PipelineEffect> {
        self.reconciler.apply(event.to_write());

        let is_active = event.video_id().is_some() && event.video_id() == self.active_video_id();
        match event {
            StreamEvent::TaskComplete {
                video_id,
                clips_url,
            } if is_active => {
                let clips_url = resolve_optional_url(&self.base_url, clips_url.as_deref())
                    .or_else(|| self.video(&video_id).and_then(|v| v.clips_url.clone()));
                vec![self.fetch_segments(&video_id, clips_url)]
            }
            StreamEvent::TaskError { message, .. } if is_active => {
                self.task_error = Some(message);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    // ========================================
    // Fetch results
    // ========================================

    /// Install a segment fetch result.
    ///
    /// Returns true if the list changed. `None` results and results whose
    /// ticket was superseded leave the current list alone.
    pub fn apply_segments(&mut self, ticket: &FetchTicket, segments: Option<Vec<Segment>>) -> bool {
        if !self.generations.is_current(ticket) {
            tracing::debug!(
                video_id = %ticket.video_id,
                generation = ticket.generation,
                "Discarding stale segment result"
            );
            return false;
        }
        let Some(segments) = segments else {
            return false;
        };
        let Some(video) = self.video_mut(&ticket.video_id) else {
            return false;
        };
        tracing::info!(
            video_id = %ticket.video_id,
            segments = segments.len(),
            "Predicted segments loaded"
        );
        video.predicted_segments = segments;
        self.touch();
        true
    }

    /// Install ground truth for a video.
    pub fn apply_ground_truth(&mut self, video_id: &str, segments: Option<Vec<Segment>>) -> bool {
        let Some(segments) = segments else {
            return false;
        };
        match self.video_mut(video_id) {
            Some(video) => {
                video.ground_truth = Some(segments);
                true
            }
            None => false,
        }
    }

    // ========================================
    // Derived views
    // ========================================

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Cross-video timeline, rebuilt only when segment lists changed.
    pub fn timeline(&mut self) -> &Timeline {
        self.timeline.get(self.revision, &self.videos)
    }

    pub fn selected_segment(&self) -> Option<&SegmentRef> {
        self.selected_segment.as_ref()
    }

    /// Global timeline position of the selection.
    pub fn selected_index(&mut self) -> Option<usize> {
        let selected = self.selected_segment.clone()?;
        self.timeline()
            .index_of(&selected.video_id, &selected.segment_id)
    }

    /// Select a video's segment. Unknown pairs clear the selection.
    pub fn select_segment(&mut self, video_id: &str, segment_id: &str) {
        let known = self.timeline().index_of(video_id, segment_id).is_some();
        self.selected_segment = known.then(|| SegmentRef::new(video_id, segment_id));
    }

    /// Move the selection by `offset` across the whole timeline, clamped at
    /// the ends.
    pub fn select_segment_relative(&mut self, offset: isize) {
        let current = self.selected_index();
        let timeline = self.timeline();
        if timeline.is_empty() {
            self.selected_segment = None;
            return;
        }
        let last = timeline.len() as isize - 1;
        let next = match current {
            Some(i) => (i as isize + offset).clamp(0, last),
            None => 0,
        } as usize;
        self.selected_segment = timeline.key_at(next);
    }

    /// Move the selection by `offset` within the active video's segments,
    /// clamped at the ends. A selection outside the active video restarts
    /// at its first segment.
    pub fn select_active_segment_relative(&mut self, offset: isize) {
        let Some(video) = self.active_video() else {
            self.selected_segment = None;
            return;
        };
        let segments = &video.predicted_segments;
        if segments.is_empty() {
            self.selected_segment = None;
            return;
        }
        let current = self
            .selected_segment
            .as_ref()
            .filter(|selected| selected.video_id == video.id)
            .and_then(|selected| segments.iter().position(|s| s.id == selected.segment_id));
        let last = segments.len() as isize - 1;
        let next = match current {
            Some(i) => (i as isize + offset).clamp(0, last),
            None => 0,
        } as usize;
        self.selected_segment = Some(SegmentRef::new(video.id.clone(), segments[next].id.clone()));
    }

    // ========================================
    // Lifecycle
    // ========================================

    /// Advance the simulated stage runs and the playhead.
    pub fn tick(&mut self, now: Instant) {
        self.semantic.poll(now);
        self.strategy.poll(now);
        let duration = self.active_video().map(|v| v.duration).unwrap_or(0.0);
        self.playback.advance(now, duration);
    }

    /// The view was left: drop every stage-local state.
    ///
    /// The asset list stays for other views; in-flight segment results are
    /// invalidated.
    pub fn leave(&mut self) {
        tracing::debug!("Pipeline view left, resetting stage state");
        self.reconciler.clear();
        self.task_error = None;
        self.connection = ConnectionState::Disconnected;
        self.stream_lost = false;
        self.selected_segment = None;
        self.semantic.cancel();
        self.strategy.cancel();
        self.playback.reset();

        let ids: Vec<String> = self.videos.iter().map(|v| v.id.clone()).collect();
        for id in &ids {
            self.reset_segments(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::map_asset;
    use crate::reconciler::StatusPatch;
    use crate::types::{AssetRecord, VideoStatus};

    const BASE: &str = "http://api";

    fn record(id: &str, status: Option<VideoStatus>, segmented: bool) -> AssetRecord {
        AssetRecord {
            id: id.to_string(),
            name: format!("{id}.mp4"),
            status,
            segmented,
            duration: Some(20.0),
            ..Default::default()
        }
    }

    fn videos(records: &[AssetRecord]) -> Vec<VideoResource> {
        records.iter().map(|r| map_asset(BASE, r)).collect()
    }

    fn segments(n: usize) -> Vec<Segment> {
        (0..n)
            .map(|i| Segment {
                id: format!("clip_{i}"),
                start: i as f64 * 2.0,
                end: i as f64 * 2.0 + 1.5,
                label: format!("Clip {i}"),
                score: Some(0.5),
                pos_score: None,
                neg_score: None,
            })
            .collect()
    }

    fn ticket_of(effects: &[PipelineEffect]) -> FetchTicket {
        effects
            .iter()
            .find_map(|e| match e {
                PipelineEffect::FetchSegments { ticket, .. } => Some(ticket.clone()),
                _ => None,
            })
            .expect("no segment fetch issued")
    }

    fn two_video_state() -> (PipelineState, Vec<PipelineEffect>) {
        let mut state = PipelineState::new(BASE);
        let effects = state.replace_assets(videos(&[
            record("v1", Some(VideoStatus::Ready), true),
            record("v2", Some(VideoStatus::Idle), false),
        ]));
        (state, effects)
    }

    #[test]
    fn test_initial_load_selects_first_and_fetches_done_video() {
        let (state, effects) = two_video_state();
        assert_eq!(state.active_video_id(), Some("v1"));
        assert_eq!(effects.len(), 1);
        let ticket = ticket_of(&effects);
        assert_eq!(ticket.video_id, "v1");

        let v1 = state.video("v1").unwrap();
        let v2 = state.video("v2").unwrap();
        assert_eq!(v1.status, VideoStatus::Ready);
        assert_eq!(v2.status, VideoStatus::Idle);
        assert_eq!(state.resolve_status(v1), PipelineStatus::Done);
        assert_eq!(state.resolve_status(v2), PipelineStatus::Idle);
    }

    #[test]
    fn test_refresh_keeps_selection_and_carries_segments() {
        let (mut state, _) = two_video_state();
        state.select_video("v2");
        assert_eq!(state.active_video_id(), Some("v2"));

        let fetch = state.select_video("v1");
        assert!(state.apply_segments(&ticket_of(&fetch), Some(segments(2))));

        state.select_video("v2");
        let effects = state.replace_assets(videos(&[
            record("v1", Some(VideoStatus::Ready), true),
            record("v2", Some(VideoStatus::Idle), false),
        ]));
        assert_eq!(state.active_video_id(), Some("v2"));
        assert!(effects.is_empty());
        assert_eq!(state.video("v1").unwrap().predicted_segments.len(), 2);
    }

    #[test]
    fn test_refresh_falls_back_to_first_video() {
        let (mut state, _) = two_video_state();
        state.select_video("v2");
        state.replace_assets(videos(&[record("v3", None, false)]));
        assert_eq!(state.active_video_id(), Some("v3"));

        state.replace_assets(Vec::new());
        assert_eq!(state.active_video_id(), None);
        assert_eq!(state.placeholder().as_deref(), Some(EMPTY_MESSAGE));
    }

    #[test]
    fn test_placeholders() {
        let mut state = PipelineState::new(BASE);
        assert_eq!(state.placeholder().as_deref(), Some(LOADING_MESSAGE));
        state.assets_failed("Request failed: 500");
        assert_eq!(
            state.placeholder().as_deref(),
            Some("Failed to load assets: Request failed: 500")
        );
        state.begin_asset_load();
        assert!(state.assets_error().is_none());
    }

    #[test]
    fn test_status_update_then_completion_for_active_video() {
        let (mut state, _) = two_video_state();
        state.select_video("v2");

        let effects = state.apply_stream_event(StreamEvent::StatusUpdate {
            video_id: "v2".to_string(),
            patch: StatusPatch {
                status: Some(PipelineStatus::Processing),
                progress: Some(40.0),
            },
        });
        assert!(effects.is_empty());
        let v2 = state.video("v2").unwrap().clone();
        assert_eq!(state.resolve_status(&v2), PipelineStatus::Processing);
        assert_eq!(state.progress(&v2), 40.0);

        let effects = state.apply_stream_event(StreamEvent::TaskComplete {
            video_id: "v2".to_string(),
            clips_url: Some("/static/segmentation/v2/clips.json".to_string()),
        });
        assert_eq!(state.resolve_status(&v2), PipelineStatus::Done);
        assert_eq!(state.progress(&v2), 100.0);
        match &effects[..] {
            [PipelineEffect::FetchSegments { ticket, clips_url }] => {
                assert_eq!(ticket.video_id, "v2");
                assert_eq!(
                    clips_url.as_deref(),
                    Some("http://api/static/segmentation/v2/clips.json")
                );
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_completion_for_inactive_video_does_not_fetch() {
        let (mut state, _) = two_video_state();
        let effects = state.apply_stream_event(StreamEvent::TaskComplete {
            video_id: "v2".to_string(),
            clips_url: None,
        });
        assert!(effects.is_empty());
        let v1 = state.video("v1").unwrap().clone();
        let v2 = state.video("v2").unwrap().clone();
        assert_eq!(state.resolve_status(&v2), PipelineStatus::Done);
        assert_eq!(state.resolve_status(&v1), PipelineStatus::Done);
        assert!(state.reconciler.entry("v1").is_none());
    }

    #[test]
    fn test_failure_message_only_for_active_video() {
        let (mut state, _) = two_video_state();
        state.apply_stream_event(StreamEvent::TaskError {
            video_id: "v2".to_string(),
            message: "boom".to_string(),
        });
        assert!(state.task_error().is_none());

        state.apply_stream_event(StreamEvent::TaskError {
            video_id: "v1".to_string(),
            message: "decoder crashed".to_string(),
        });
        assert_eq!(state.task_error(), Some("decoder crashed"));
        assert_eq!(state.active_status(), Some(PipelineStatus::Error));
    }

    #[test]
    fn test_run_force_flag() {
        let (mut state, _) = two_video_state();

        let run = state.begin_run().unwrap();
        assert_eq!(run.video_ids, vec!["v1".to_string()]);
        assert!(run.force);
        assert_eq!(state.active_status(), Some(PipelineStatus::Processing));
        assert_eq!(state.progress(state.active_video().unwrap()), 0.0);

        state.select_video("v2");
        let run = state.begin_run().unwrap();
        assert!(!run.force);

        state.run_failed("v2", "Request failed: 503");
        assert_eq!(state.active_status(), Some(PipelineStatus::Error));
        assert_eq!(state.task_error(), Some("Request failed: 503"));
        let run = state.begin_run().unwrap();
        assert!(!run.force);
    }

    #[test]
    fn test_run_refused_while_processing() {
        let (mut state, _) = two_video_state();
        assert!(state.begin_run().is_some());
        assert!(state.begin_run().is_none());
    }

    #[test]
    fn test_non_array_clips_leave_list_unchanged() {
        let (mut state, effects) = two_video_state();
        let ticket = ticket_of(&effects);
        assert!(!state.apply_segments(&ticket, None));
        assert!(state.active_video().unwrap().predicted_segments.is_empty());
    }

    #[test]
    fn test_stale_segment_result_is_discarded() {
        let (mut state, effects) = two_video_state();
        let first = ticket_of(&effects);

        state.select_video("v2");
        let again = state.select_video("v1");
        let second = ticket_of(&again);

        assert!(state.apply_segments(&second, Some(segments(3))));
        assert!(!state.apply_segments(&first, Some(segments(1))));
        assert_eq!(state.active_video().unwrap().predicted_segments.len(), 3);
    }

    #[test]
    fn test_run_invalidates_inflight_fetch() {
        let (mut state, effects) = two_video_state();
        let ticket = ticket_of(&effects);
        state.begin_run();
        assert!(!state.apply_segments(&ticket, Some(segments(2))));
    }

    #[test]
    fn test_timeline_follows_segment_changes() {
        let (mut state, effects) = two_video_state();
        assert!(state.timeline().is_empty());
        state.apply_segments(&ticket_of(&effects), Some(segments(4)));
        assert_eq!(state.timeline().len(), 4);

        state.select_segment("v1", "clip_2");
        assert_eq!(state.selected_segment(), Some(&SegmentRef::new("v1", "clip_2")));
        state.select_segment_relative(5);
        assert_eq!(state.selected_segment(), Some(&SegmentRef::new("v1", "clip_3")));
        state.select_segment("v1", "missing");
        assert!(state.selected_segment().is_none());
        state.select_segment("v2", "clip_0");
        assert!(state.selected_segment().is_none());
    }

    /// Both videos segmented, v1 with three clips and v2 (active) with two,
    /// sharing the `clip_N` ids.
    fn shared_ids_state() -> PipelineState {
        let mut state = PipelineState::new(BASE);
        let effects = state.replace_assets(videos(&[
            record("v1", Some(VideoStatus::Ready), true),
            record("v2", Some(VideoStatus::Ready), true),
        ]));
        assert!(state.apply_segments(&ticket_of(&effects), Some(segments(3))));
        let effects = state.select_video("v2");
        assert!(state.apply_segments(&ticket_of(&effects), Some(segments(2))));
        state
    }

    #[test]
    fn test_relative_selection_crosses_videos_with_repeated_ids() {
        let mut state = shared_ids_state();
        assert_eq!(state.timeline().len(), 5);

        let mut visited = Vec::new();
        for _ in 0..6 {
            state.select_segment_relative(1);
            visited.push(state.selected_index().unwrap());
        }
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 4]);
        assert_eq!(state.selected_segment(), Some(&SegmentRef::new("v2", "clip_1")));

        state.select_segment_relative(-2);
        assert_eq!(state.selected_index(), Some(2));
        assert_eq!(state.selected_segment(), Some(&SegmentRef::new("v1", "clip_2")));
    }

    #[test]
    fn test_active_selection_stays_in_active_video() {
        let mut state = shared_ids_state();
        state.select_segment("v1", "clip_1");

        state.select_active_segment_relative(1);
        assert_eq!(state.selected_segment(), Some(&SegmentRef::new("v2", "clip_0")));
        for _ in 0..3 {
            state.select_active_segment_relative(1);
        }
        assert_eq!(state.selected_segment(), Some(&SegmentRef::new("v2", "clip_1")));
        assert_eq!(state.selected_index(), Some(4));
        state.select_active_segment_relative(-5);
        assert_eq!(state.selected_segment(), Some(&SegmentRef::new("v2", "clip_0")));
    }

    #[test]
    fn test_ground_truth_fetch_on_activation() {
        let mut state = PipelineState::new(BASE);
        let mut with_gt = record("g1", None, false);
        with_gt.has_gt = true;
        with_gt.gt_url = Some("/static/gt/g1.json".to_string());
        let effects = state.replace_assets(videos(&[with_gt]));
        assert_eq!(
            effects,
            vec![PipelineEffect::FetchGroundTruth {
                video_id: "g1".to_string(),
                gt_url: "http://api/static/gt/g1.json".to_string(),
            }]
        );
        assert!(state.apply_ground_truth("g1", Some(segments(1))));
        assert!(state.active_video().unwrap().ground_truth.is_some());
    }

    #[test]
    fn test_stream_banner() {
        let (mut state, _) = two_video_state();
        state.set_connection(ConnectionState::Connecting);
        assert!(state.stream_banner().is_none());
        state.set_connection(ConnectionState::Connected);
        state.set_connection(ConnectionState::Error);
        assert_eq!(state.stream_banner(), Some(STREAM_LOST_MESSAGE));
        state.set_connection(ConnectionState::Connected);
        assert!(state.stream_banner().is_none());
    }

    #[test]
    fn test_stream_banner_survives_reconnect_attempts() {
        let (mut state, _) = two_video_state();
        state.set_connection(ConnectionState::Connected);
        state.set_connection(ConnectionState::Error);
        state.set_connection(ConnectionState::Connecting);
        assert_eq!(state.stream_banner(), Some(STREAM_LOST_MESSAGE));
        state.set_connection(ConnectionState::Error);
        state.set_connection(ConnectionState::Connecting);
        assert_eq!(state.stream_banner(), Some(STREAM_LOST_MESSAGE));

        state.set_connection(ConnectionState::Connected);
        assert!(state.stream_banner().is_none());

        state.set_connection(ConnectionState::Error);
        state.leave();
        assert!(state.stream_banner().is_none());
    }

    #[test]
    fn test_leave_resets_stage_state() {
        let (mut state, effects) = two_video_state();
        let ticket = ticket_of(&effects);
        state.begin_run();
        state.semantic.start(Instant::now());
        state.set_connection(ConnectionState::Connected);
        state.select_segment_relative(1);

        state.leave();
        assert!(state.selected_segment().is_none());
        assert!(state.reconciler.is_empty());
        assert!(!state.semantic.is_running());
        assert_eq!(state.connection(), ConnectionState::Disconnected);
        assert!(!state.apply_segments(&ticket, Some(segments(1))));
        // The asset list survives for the config modal
        assert_eq!(state.videos().len(), 2);
        assert_eq!(state.active_video_id(), Some("v1"));
    }
}
