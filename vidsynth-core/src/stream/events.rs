//! Status stream envelopes.
//!
//! Every message `data` is a JSON envelope `{type, payload}`. Envelopes that
//! fail to parse, carry an unknown `type`, or lack the fields their type
//! needs are dropped without error.

use serde_json::Value;

use crate::reconciler::{StatusPatch, StatusWrite};
use crate::types::PipelineStatus;

/// Default failure message when the server sends none
pub const DEFAULT_TASK_ERROR: &str = "Task failed";

/// A recognized stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Full resync, one patch per listed video
    Snapshot(Vec<(String, StatusPatch)>),
    /// Incremental status/progress change
    StatusUpdate { video_id: String, patch: StatusPatch },
    /// Run finished; `clips_url` as sent by the server (unresolved)
    TaskComplete {
        video_id: String,
        clips_url: Option<String>,
    },
    /// Run failed
    TaskError { video_id: String, message: String },
}

impl StreamEvent {
    /// The reconciler write this event performs.
    pub fn to_write(&self) -> StatusWrite {
        match self {
            StreamEvent::Snapshot(entries) => StatusWrite::Snapshot(entries.clone()),
            StreamEvent::StatusUpdate { video_id, patch } => StatusWrite::Update {
                video_id: video_id.clone(),
                patch: *patch,
            },
            StreamEvent::TaskComplete { video_id, .. } => StatusWrite::Complete {
                video_id: video_id.clone(),
            },
            StreamEvent::TaskError { video_id, .. } => StatusWrite::Failure {
                video_id: video_id.clone(),
            },
        }
    }

    /// Video the event targets; `None` for snapshots.
    pub fn video_id(&self) -> Option<&str> {
        match self {
            StreamEvent::Snapshot(_) => None,
            StreamEvent::StatusUpdate { video_id, .. }
            | StreamEvent::TaskComplete { video_id, .. }
            | StreamEvent::TaskError { video_id, .. } => Some(video_id),
        }
    }
}

/// Parse one message `data` field.
pub fn parse_envelope(data: &str) -> Option<StreamEvent> {
    if data.is_empty() {
        return None;
    }
    let envelope: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Discarding undecodable stream message");
            return None;
        }
    };

    let kind = envelope.get("type").and_then(Value::as_str)?;
    let payload = envelope.get("payload").unwrap_or(&Value::Null);

    let event = match kind {
        "snapshot" => parse_snapshot(payload),
        "status_update" => video_id(payload).map(|video_id| StreamEvent::StatusUpdate {
            video_id,
            patch: parse_patch(payload),
        }),
        "task_complete" => video_id(payload).map(|video_id| StreamEvent::TaskComplete {
            video_id,
            clips_url: payload
                .get("clips_url")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }),
        "error" => video_id(payload).map(|video_id| StreamEvent::TaskError {
            video_id,
            message: payload
                .get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_TASK_ERROR)
                .to_string(),
        }),
        other => {
            tracing::debug!(kind = other, "Ignoring unknown stream message type");
            None
        }
    };

    if event.is_none() {
        tracing::debug!(kind, "Stream message missing required payload fields");
    }
    event
}

fn video_id(payload: &Value) -> Option<String> {
    payload
        .get("video_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_patch(entry: &Value) -> StatusPatch {
    StatusPatch {
        status: entry
            .get("status")
            .and_then(Value::as_str)
            .and_then(PipelineStatus::from_wire),
        progress: entry.get("progress").and_then(Value::as_f64),
    }
}

fn parse_snapshot(payload: &Value) -> Option<StreamEvent> {
    let statuses = payload.get("statuses")?.as_object()?;
    let entries = statuses
        .iter()
        .filter(|(_, entry)| entry.is_object())
        .map(|(video_id, entry)| (video_id.clone(), parse_patch(entry)))
        .collect();
    Some(StreamEvent::Snapshot(entries))
}
