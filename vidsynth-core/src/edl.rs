//! Final cut: edit decision list built from a video's predicted segments.

use crate::types::{EdlItem, VideoResource};

/// Lay the video's predicted segments end to end on the target timeline.
pub fn build_edl(video: &VideoResource) -> Vec<EdlItem> {
    let mut cursor = 0.0;
    video
        .predicted_segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let target_start = cursor;
            cursor += segment.duration();
            EdlItem {
                id: format!("edl_{:02}", i + 1),
                source_id: video.id.clone(),
                source_start: segment.start,
                source_end: segment.end,
                target_start,
                target_end: cursor,
            }
        })
        .collect()
}

/// Total length of the cut in seconds.
pub fn total_duration(items: &[EdlItem]) -> f64 {
    items.last().map(|item| item.target_end).unwrap_or(0.0)
}
