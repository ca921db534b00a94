//! Cross-video timeline: every video's predicted segments concatenated in
//! video-list order, each tagged with where it came from.

use std::collections::HashMap;

use crate::types::{FlattenedSegment, VideoResource};

/// Identity of one timeline entry. Segment ids are unique only within their
/// owning video, so the video id is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentRef {
    pub video_id: String,
    pub segment_id: String,
}

impl SegmentRef {
    pub fn new(video_id: impl Into<String>, segment_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            segment_id: segment_id.into(),
        }
    }
}

/// Flattened segment sequence with O(1) lookup by (video id, segment id).
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    segments: Vec<FlattenedSegment>,
    /// video id -> segment id -> global index
    index_by_id: HashMap<String, HashMap<String, usize>>,
}

impl Timeline {
    /// Derive the timeline from the current video list.
    pub fn build(videos: &[VideoResource]) -> Self {
        let capacity = videos.iter().map(|v| v.predicted_segments.len()).sum();
        let mut segments = Vec::with_capacity(capacity);
        let mut index_by_id: HashMap<String, HashMap<String, usize>> =
            HashMap::with_capacity(videos.len());

        for video in videos {
            for segment in &video.predicted_segments {
                let global_index = segments.len();
                // Duplicate ids within one list: the first one wins.
                index_by_id
                    .entry(video.id.clone())
                    .or_default()
                    .entry(segment.id.clone())
                    .or_insert(global_index);
                segments.push(FlattenedSegment {
                    segment: segment.clone(),
                    video_id: video.id.clone(),
                    video_name: video.name.clone(),
                    global_index,
                });
            }
        }

        Self {
            segments,
            index_by_id,
        }
    }

    pub fn segments(&self) -> &[FlattenedSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Position of a video's segment in the flattened sequence.
    pub fn index_of(&self, video_id: &str, segment_id: &str) -> Option<usize> {
        self.index_by_id.get(video_id)?.get(segment_id).copied()
    }

    /// Look up a video's segment by id.
    pub fn get(&self, video_id: &str, segment_id: &str) -> Option<&FlattenedSegment> {
        self.index_of(video_id, segment_id)
            .map(|i| &self.segments[i])
    }

    /// Identity of the entry at `index`.
    pub fn key_at(&self, index: usize) -> Option<SegmentRef> {
        self.segments
            .get(index)
            .map(|flat| SegmentRef::new(flat.video_id.clone(), flat.segment.id.clone()))
    }
}

/// Memoized [`Timeline`] keyed on the revision of its input.
///
/// The owner bumps the revision whenever the video list or any video's
/// predicted segments change; a stale revision forces a full rebuild.
#[derive(Debug, Default)]
pub struct TimelineCache {
    revision: Option<u64>,
    timeline: Timeline,
}

impl TimelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the timeline for `revision`, rebuilding if it changed.
    pub fn get(&mut self, revision: u64, videos: &[VideoResource]) -> &Timeline {
        if self.revision != Some(revision) {
            self.timeline = Timeline::build(videos);
            self.revision = Some(revision);
            tracing::trace!(revision, segments = self.timeline.len(), "Timeline rebuilt");
        }
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::map_asset;
    use crate::types::{AssetRecord, Segment};

    fn segment(id: &str, start: f64) -> Segment {
        Segment {
            id: id.to_string(),
            start,
            end: start + 1.0,
            label: id.to_string(),
            score: None,
            pos_score: None,
            neg_score: None,
        }
    }

    fn video(id: &str, segments: Vec<Segment>) -> VideoResource {
        let mut video = map_asset(
            "",
            &AssetRecord {
                id: id.to_string(),
                name: format!("{id}.mp4"),
                ..Default::default()
            },
        );
        video.predicted_segments = segments;
        video
    }

    #[test]
    fn test_flatten_order_and_indices() {
        let videos = vec![
            video("v1", vec![segment("a", 0.0), segment("b", 2.0)]),
            video("v2", vec![]),
            video("v3", vec![segment("c", 1.0)]),
        ];
        let timeline = Timeline::build(&videos);

        assert_eq!(timeline.len(), 3);
        let order: Vec<_> = timeline
            .segments()
            .iter()
            .map(|s| (s.video_id.as_str(), s.segment.id.as_str(), s.global_index))
            .collect();
        assert_eq!(order, vec![("v1", "a", 0), ("v1", "b", 1), ("v3", "c", 2)]);
        assert_eq!(timeline.segments()[2].video_name, "v3.mp4");
    }

    #[test]
    fn test_length_is_sum_and_indices_strictly_increase() {
        let videos: Vec<_> = (0..5)
            .map(|i| {
                let segments = (0..i).map(|j| segment(&format!("s{i}_{j}"), j as f64)).collect();
                video(&format!("v{i}"), segments)
            })
            .collect();
        let timeline = Timeline::build(&videos);

        let expected: usize = videos.iter().map(|v| v.predicted_segments.len()).sum();
        assert_eq!(timeline.len(), expected);
        assert!(timeline
            .segments()
            .windows(2)
            .all(|pair| pair[0].global_index < pair[1].global_index));
    }

    #[test]
    fn test_lookup_by_id() {
        let videos = vec![video("v1", vec![segment("a", 0.0), segment("b", 2.0)])];
        let timeline = Timeline::build(&videos);
        assert_eq!(timeline.index_of("v1", "b"), Some(1));
        assert_eq!(timeline.get("v1", "a").unwrap().segment.start, 0.0);
        assert!(timeline.get("v1", "zzz").is_none());
        assert!(timeline.get("v2", "a").is_none());
    }

    #[test]
    fn test_lookup_keeps_videos_apart_when_ids_repeat() {
        let videos = vec![
            video(
                "v1",
                vec![segment("clip_0", 0.0), segment("clip_1", 2.0), segment("clip_2", 4.0)],
            ),
            video("v2", vec![segment("clip_0", 1.0), segment("clip_1", 3.0)]),
        ];
        let timeline = Timeline::build(&videos);

        assert_eq!(timeline.index_of("v1", "clip_1"), Some(1));
        assert_eq!(timeline.index_of("v2", "clip_1"), Some(4));
        let flat = timeline.get("v2", "clip_1").unwrap();
        assert_eq!(flat.video_id, "v2");
        assert_eq!(flat.segment.start, 3.0);
        assert_eq!(timeline.key_at(3), Some(SegmentRef::new("v2", "clip_0")));
        assert!(timeline.key_at(5).is_none());
    }

    #[test]
    fn test_cache_rebuilds_only_on_new_revision() {
        let mut videos = vec![video("v1", vec![segment("a", 0.0)])];
        let mut cache = TimelineCache::new();
        assert_eq!(cache.get(1, &videos).len(), 1);

        videos[0].predicted_segments.push(segment("b", 1.0));
        assert_eq!(cache.get(1, &videos).len(), 1);
        assert_eq!(cache.get(2, &videos).len(), 2);
    }

    #[test]
    fn test_empty() {
        let timeline = Timeline::build(&[]);
        assert!(timeline.is_empty());
    }
}
