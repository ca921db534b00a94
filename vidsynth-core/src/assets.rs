//! Asset mapping: raw server records to [`VideoResource`]s.
//!
//! Pure transforms only. Relative media links are prefixed with the configured
//! base address; links that already carry a network scheme are kept verbatim.

use serde_json::Value;

use crate::types::{AssetRecord, VideoResource, VideoStatus};

/// Returns true if `url` already carries an `http://` or `https://` scheme.
pub fn has_network_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Resolve a possibly-relative link against `base`.
///
/// Absent or empty input maps to an empty string.
pub fn resolve_asset_url(base: &str, url: Option<&str>) -> String {
    match url {
        None | Some("") => String::new(),
        Some(url) if has_network_scheme(url) => url.to_string(),
        Some(url) => format!("{}{}", base, url),
    }
}

/// Like [`resolve_asset_url`] but maps an empty result to `None`.
pub fn resolve_optional_url(base: &str, url: Option<&str>) -> Option<String> {
    let resolved = resolve_asset_url(base, url);
    if resolved.is_empty() {
        None
    } else {
        Some(resolved)
    }
}

/// Map one raw record to a video.
///
/// Effective status is the server's when present, else `ready` for segmented
/// assets and `idle` otherwise.
pub fn map_asset(base: &str, asset: &AssetRecord) -> VideoResource {
    let status = asset.status.unwrap_or(if asset.segmented {
        VideoStatus::Ready
    } else {
        VideoStatus::Idle
    });

    VideoResource {
        id: asset.id.clone(),
        name: asset.name.clone(),
        url: resolve_asset_url(base, asset.video_url.as_deref()),
        thumbnail: resolve_optional_url(base, asset.thumb_url.as_deref()),
        duration: asset.duration.unwrap_or(0.0),
        has_gt: asset.has_gt,
        ground_truth: None,
        status,
        segmented: asset.segmented,
        progress: asset.progress,
        clips_url: resolve_optional_url(base, asset.clips_url.as_deref()),
        gt_url: resolve_optional_url(base, asset.gt_url.as_deref()),
        predicted_segments: Vec::new(),
    }
}

/// Map a batch of records, preserving order.
pub fn map_assets(base: &str, assets: &[AssetRecord]) -> Vec<VideoResource> {
    assets.iter().map(|asset| map_asset(base, asset)).collect()
}

/// Decode an asset list body record by record.
///
/// A non-array body yields no records. Fields with the wrong type fall back to
/// their defaults instead of rejecting the record.
pub fn records_from_json(body: &Value) -> Vec<AssetRecord> {
    let Some(items) = body.as_array() else {
        tracing::debug!("Asset list body is not an array, ignoring");
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| {
            serde_json::from_value::<AssetRecord>(item.clone())
                .unwrap_or_else(|_| lenient_record(item))
        })
        .collect()
}

fn lenient_record(item: &Value) -> AssetRecord {
    let text = |key: &str| item.get(key).and_then(value_as_text);
    let number = |key: &str| item.get(key).and_then(value_as_f64);
    let flag = |key: &str| item.get(key).and_then(Value::as_bool).unwrap_or(false);

    let record = AssetRecord {
        id: text("id").unwrap_or_default(),
        name: text("name").unwrap_or_default(),
        video_url: text("video_url"),
        thumb_url: text("thumb_url"),
        duration: number("duration"),
        has_gt: flag("hasGT"),
        segmented: flag("segmented"),
        status: item
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
        progress: number("progress"),
        clips_url: text("clips_url"),
        gt_url: text("gt_url"),
    };
    tracing::debug!(video_id = %record.id, "Decoded malformed asset record leniently");
    record
}

/// Render a JSON string or number as text.
pub(crate) fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a JSON number, or a string holding one.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://api.local";

    fn record(id: &str) -> AssetRecord {
        AssetRecord {
            id: id.to_string(),
            name: format!("{id}.mp4"),
            video_url: Some(format!("/media/{id}.mp4")),
            ..Default::default()
        }
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        for url in ["http://cdn/x.mp4", "https://cdn/x.mp4"] {
            assert_eq!(resolve_asset_url(BASE, Some(url)), url);
        }
    }

    #[test]
    fn test_relative_urls_prefixed_exactly_once() {
        let resolved = resolve_asset_url(BASE, Some("/media/a.mp4"));
        assert_eq!(resolved, "http://api.local/media/a.mp4");
        assert_eq!(resolved.matches(BASE).count(), 1);
    }

    #[test]
    fn test_empty_base_leaves_links_relative() {
        assert_eq!(resolve_asset_url("", Some("/media/a.mp4")), "/media/a.mp4");
    }

    #[test]
    fn test_absent_links() {
        assert_eq!(resolve_asset_url(BASE, None), "");
        assert_eq!(resolve_asset_url(BASE, Some("")), "");
        assert_eq!(resolve_optional_url(BASE, Some("")), None);

        let video = map_asset(BASE, &AssetRecord::default());
        assert_eq!(video.url, "");
        assert!(video.thumbnail.is_none());
        assert!(video.clips_url.is_none());
        assert!(video.gt_url.is_none());
        assert_eq!(video.duration, 0.0);
        assert!(video.predicted_segments.is_empty());
    }

    #[test]
    fn test_effective_status() {
        let mut ready = record("v1");
        ready.status = Some(VideoStatus::Ready);
        ready.segmented = true;
        let idle = record("v2");
        let mut segmented = record("v3");
        segmented.segmented = true;
        let mut explicit = record("v4");
        explicit.segmented = true;
        explicit.status = Some(VideoStatus::Processing);

        let videos = map_assets(BASE, &[ready, idle, segmented, explicit]);
        assert_eq!(videos[0].status, VideoStatus::Ready);
        assert_eq!(videos[1].status, VideoStatus::Idle);
        assert_eq!(videos[2].status, VideoStatus::Ready);
        assert_eq!(videos[3].status, VideoStatus::Processing);
    }

    #[test]
    fn test_map_resolves_every_link() {
        let asset = AssetRecord {
            id: "v1".to_string(),
            name: "one.mp4".to_string(),
            video_url: Some("/media/one.mp4".to_string()),
            thumb_url: Some("https://img/one.jpg".to_string()),
            clips_url: Some("/static/segmentation/v1/clips.json".to_string()),
            gt_url: Some("/static/gt/v1.json".to_string()),
            duration: Some(20.5),
            has_gt: true,
            progress: Some(40.0),
            ..Default::default()
        };
        let video = map_asset(BASE, &asset);
        assert_eq!(video.url, "http://api.local/media/one.mp4");
        assert_eq!(video.thumbnail.as_deref(), Some("https://img/one.jpg"));
        assert_eq!(
            video.clips_url.as_deref(),
            Some("http://api.local/static/segmentation/v1/clips.json")
        );
        assert_eq!(video.gt_url.as_deref(), Some("http://api.local/static/gt/v1.json"));
        assert_eq!(video.duration, 20.5);
        assert_eq!(video.progress, Some(40.0));
        assert!(video.has_gt);
    }

    #[test]
    fn test_records_from_json_keeps_malformed_records() {
        let body = json!([
            {"id": "v1", "name": "a", "video_url": "/a.mp4", "status": "ready", "segmented": true, "hasGT": false},
            {"id": 7, "name": "b", "duration": "12.5", "status": "queued", "segmented": "yes"},
            "not-an-object"
        ]);
        let records = records_from_json(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, Some(VideoStatus::Ready));
        assert_eq!(records[1].id, "7");
        assert_eq!(records[1].duration, Some(12.5));
        assert_eq!(records[1].status, None);
        assert!(!records[1].segmented);
    }

    #[test]
    fn test_records_from_json_non_array() {
        assert!(records_from_json(&json!({"error": "nope"})).is_empty());
    }
}
