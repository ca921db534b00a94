//! Segment fetching: clip JSON to [`Segment`] lists.
//!
//! A fetch that comes back with a non-success status, a body that is not an
//! array, or no body at all leaves the current list untouched. Requests are
//! stamped with a [`FetchTicket`]; a result whose ticket is no longer current
//! for its video is dropped instead of overwriting a newer list.

use std::collections::HashMap;

use serde_json::Value;

use crate::assets::{value_as_f64, value_as_text};
use crate::types::Segment;

/// Conventional clips location for a video, relative to the API base.
pub fn default_clips_path(video_id: &str) -> String {
    format!(
        "/static/segmentation/{}/clips.json",
        urlencoding::encode(video_id)
    )
}

/// Pick the clips address: the server-provided one if any, else the default.
pub fn clips_location(base: &str, video_id: &str, clips_url: Option<&str>) -> String {
    match clips_url {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => format!("{}{}", base, default_clips_path(video_id)),
    }
}

/// Map a clips body to segments.
///
/// Returns `None` when the body is not an array; the caller must then keep
/// whatever list it already has.
pub fn parse_clips(body: &Value) -> Option<Vec<Segment>> {
    let clips = body.as_array()?;
    Some(clips.iter().map(clip_to_segment).collect())
}

fn first_text(clip: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| clip.get(*key))
        .find(|value| !value.is_null())
        .and_then(value_as_text)
}

fn first_number(clip: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| clip.get(*key))
        .find(|value| !value.is_null())
        .and_then(value_as_f64)
}

fn clip_to_segment(clip: &Value) -> Segment {
    let raw_id = first_text(clip, &["clip_id", "clipId", "id"]).unwrap_or_default();
    let label_id = first_text(clip, &["clip_id", "clipId"]).unwrap_or_default();

    Segment {
        id: format!("clip_{}", raw_id),
        start: first_number(clip, &["t_start", "start"]).unwrap_or(0.0),
        end: first_number(clip, &["t_end", "end"]).unwrap_or(0.0),
        label: format!("Clip {}", label_id),
        score: first_number(clip, &["score"]),
        pos_score: first_number(clip, &["pos_score", "posScore"]),
        neg_score: first_number(clip, &["neg_score", "negScore"]),
    }
}

/// Token identifying one issued segment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub video_id: String,
    pub generation: u64,
}

/// Tracks the current request generation per video.
///
/// Every new request for a video, and every reset of its list, bumps that
/// video's generation. Only the result of the newest request is accepted.
#[derive(Debug, Clone, Default)]
pub struct FetchGenerations {
    current: HashMap<String, u64>,
}

impl FetchGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request, invalidating older ones.
    pub fn issue(&mut self, video_id: &str) -> FetchTicket {
        let generation = self.bump(video_id);
        FetchTicket {
            video_id: video_id.to_string(),
            generation,
        }
    }

    /// Invalidate every outstanding request for a video.
    pub fn invalidate(&mut self, video_id: &str) {
        self.bump(video_id);
    }

    fn bump(&mut self, video_id: &str) -> u64 {
        let generation = self.current.entry(video_id.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// True if `ticket` belongs to the newest request for its video.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.current.get(&ticket.video_id) == Some(&ticket.generation)
    }
}
