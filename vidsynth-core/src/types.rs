//! Core domain types for vidsynth
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Asset** | A server-tracked source video record ([`AssetRecord`]) |
//! | **Video** | The dashboard's normalized view of an asset ([`VideoResource`]) |
//! | **Segment** | A scored or ground-truth time interval within a video |
//! | **Clip** | A raw segment record as served by the clips endpoint |
//! | **EDL** | Edit decision list: ordered source intervals composing a final cut |
//!
//! ### Two status domains
//!
//! The server reports a five-value [`VideoStatus`] on each asset. The dashboard
//! renders a four-value [`PipelineStatus`] produced by the reconciler. The
//! mapping between them is [`PipelineStatus::from_video`].

use serde::{Deserialize, Serialize};

// ============================================
// Status domains
// ============================================

/// Server-reported processing status of an asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    #[default]
    Idle,
    Pending,
    Processing,
    Ready,
    Error,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Idle => "idle",
            VideoStatus::Pending => "pending",
            VideoStatus::Processing => "processing",
            VideoStatus::Ready => "ready",
            VideoStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(VideoStatus::Idle),
            "pending" => Ok(VideoStatus::Pending),
            "processing" => Ok(VideoStatus::Processing),
            "ready" => Ok(VideoStatus::Ready),
            "error" => Ok(VideoStatus::Error),
            _ => Err(format!("unknown video status: {}", s)),
        }
    }
}

/// Reconciled status rendered by the pipeline stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Processing,
    Done,
    Error,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Idle => "idle",
            PipelineStatus::Processing => "processing",
            PipelineStatus::Done => "done",
            PipelineStatus::Error => "error",
        }
    }

    /// Total mapping from the server's five-value domain.
    ///
    /// `pending` and `processing` collapse to [`PipelineStatus::Processing`],
    /// `ready` becomes [`PipelineStatus::Done`].
    pub fn from_video(status: VideoStatus) -> Self {
        match status {
            VideoStatus::Pending | VideoStatus::Processing => PipelineStatus::Processing,
            VideoStatus::Ready => PipelineStatus::Done,
            VideoStatus::Error => PipelineStatus::Error,
            VideoStatus::Idle => PipelineStatus::Idle,
        }
    }

    /// Parse a status string received on the event stream.
    ///
    /// Accepts both domains' spellings; returns `None` for anything else.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(PipelineStatus::Idle),
            "pending" | "processing" => Some(PipelineStatus::Processing),
            "done" | "ready" => Some(PipelineStatus::Done),
            "error" => Some(PipelineStatus::Error),
            _ => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, PipelineStatus::Processing)
    }
}

// ============================================
// Segments
// ============================================

/// One time interval within a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique within its owning list
    pub id: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Display label
    pub label: String,
    /// Overall relevance score (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Positive-tag affinity (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_score: Option<f64>,
    /// Negative-tag affinity (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg_score: Option<f64>,
}

impl Segment {
    /// Length of the interval in seconds (never negative)
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A segment annotated with its originating video and its position in the
/// cross-video concatenation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedSegment {
    pub segment: Segment,
    pub video_id: String,
    pub video_name: String,
    /// Zero-based position, stable only within one derivation pass
    pub global_index: usize,
}

// ============================================
// Assets and videos
// ============================================

/// Raw asset record as returned by `GET /api/assets`.
///
/// Every field tolerates absence. Batches are decoded record by record with
/// [`crate::assets::records_from_json`], so one malformed record never fails
/// the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumb_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, rename = "hasGT")]
    pub has_gt: bool,
    #[serde(default)]
    pub segmented: bool,
    #[serde(default)]
    pub status: Option<VideoStatus>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub clips_url: Option<String>,
    #[serde(default)]
    pub gt_url: Option<String>,
}

/// One tracked source video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoResource {
    pub id: String,
    pub name: String,
    /// Resolved media address
    pub url: String,
    /// Resolved thumbnail address, absent when the server sent none
    pub thumbnail: Option<String>,
    /// Seconds, authoritative from the server
    pub duration: f64,
    pub has_gt: bool,
    /// Present only once ground truth has been mapped and loaded
    pub ground_truth: Option<Vec<Segment>>,
    /// Server-reported status (see [`PipelineStatus::from_video`])
    pub status: VideoStatus,
    /// Clip output already exists on the server
    pub segmented: bool,
    /// 0-100 when reported
    pub progress: Option<f64>,
    pub clips_url: Option<String>,
    pub gt_url: Option<String>,
    /// Populated lazily by the segment fetcher
    pub predicted_segments: Vec<Segment>,
}

// ============================================
// Strategy log
// ============================================

/// Category of a strategy log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Filter,
    Merge,
    Result,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Info => "info",
            LogKind::Filter => "filter",
            LogKind::Merge => "merge",
            LogKind::Result => "result",
        }
    }
}

/// Append-only, client-local log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub kind: LogKind,
    pub message: String,
    /// Display string (`HH:MM:SS`)
    pub timestamp: String,
}

impl LogEntry {
    /// Create an entry stamped with the local wall clock.
    pub fn now(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

// ============================================
// Sandbox and final cut
// ============================================

/// Synthetic embedding point for the cluster sandbox.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub cluster_id: usize,
    pub thumbnail: String,
}

/// One entry of an edit decision list.
#[derive(Debug, Clone, PartialEq)]
pub struct EdlItem {
    pub id: String,
    pub source_id: String,
    pub source_start: f64,
    pub source_end: f64,
    pub target_start: f64,
    pub target_end: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_is_total() {
        let cases = [
            (VideoStatus::Idle, PipelineStatus::Idle),
            (VideoStatus::Pending, PipelineStatus::Processing),
            (VideoStatus::Processing, PipelineStatus::Processing),
            (VideoStatus::Ready, PipelineStatus::Done),
            (VideoStatus::Error, PipelineStatus::Error),
        ];
        for (input, expected) in cases {
            assert_eq!(PipelineStatus::from_video(input), expected, "{:?}", input);
        }
    }

    #[test]
    fn test_wire_status_parsing() {
        assert_eq!(
            PipelineStatus::from_wire("pending"),
            Some(PipelineStatus::Processing)
        );
        assert_eq!(PipelineStatus::from_wire("ready"), Some(PipelineStatus::Done));
        assert_eq!(PipelineStatus::from_wire("done"), Some(PipelineStatus::Done));
        assert_eq!(PipelineStatus::from_wire("queued"), None);
        assert_eq!(PipelineStatus::from_wire(""), None);
    }

    #[test]
    fn test_video_status_from_str() {
        assert_eq!("ready".parse::<VideoStatus>(), Ok(VideoStatus::Ready));
        assert!("done".parse::<VideoStatus>().is_err());
    }

    #[test]
    fn test_asset_record_tolerates_missing_fields() {
        let record: AssetRecord = serde_json::from_str(r#"{"id": "v9"}"#).unwrap();
        assert_eq!(record.id, "v9");
        assert!(!record.segmented);
        assert!(record.status.is_none());
        assert!(record.video_url.is_none());
    }

    #[test]
    fn test_asset_record_reads_has_gt() {
        let record: AssetRecord =
            serde_json::from_str(r#"{"id": "v1", "hasGT": true, "status": "pending"}"#).unwrap();
        assert!(record.has_gt);
        assert_eq!(record.status, Some(VideoStatus::Pending));
    }

    #[test]
    fn test_log_entry_timestamp_shape() {
        let entry = LogEntry::now(LogKind::Merge, "merged");
        assert_eq!(entry.timestamp.len(), 8);
        assert_eq!(entry.timestamp.as_bytes()[2], b':');
        assert_eq!(entry.kind.as_str(), "merge");
    }
}
