//! HTTP client for the pipeline API.
//!
//! Endpoints:
//! - `GET  /api/assets`          asset list
//! - `POST /api/import/videos`   multipart upload, field `files`
//! - `POST /api/segment`         `{video_ids, force}`
//! - `GET  /api/events`          server-sent status stream
//! - clip JSON at a per-video default path or a server-provided address

use std::path::Path;

use reqwest::header::{HeaderValue, ACCEPT};
use serde::Serialize;
use serde_json::Value;

use crate::assets::{map_assets, records_from_json};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::segments::{clips_location, parse_clips};
use crate::types::{Segment, VideoResource};

/// HTTP client for the pipeline API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    /// No overall timeout: the event stream stays open indefinitely
    stream_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or the base is empty.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("api.base_url is required".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            stream_client,
            base_url,
        })
    }

    /// Base address used for requests and link resolution
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and map the asset list.
    pub async fn list_assets(&self) -> Result<Vec<VideoResource>> {
        let url = format!("{}/api/assets", self.base_url);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::api("Request failed", status));
        }

        let body: Value = response.json().await?;
        let records = records_from_json(&body);
        tracing::info!(count = records.len(), "Loaded asset list");
        Ok(map_assets(&self.base_url, &records))
    }

    /// Upload source files for server-side ingestion.
    pub async fn import_videos(&self, paths: &[impl AsRef<Path>]) -> Result<()> {
        let url = format!("{}/api/import/videos", self.base_url);

        let mut form = reqwest::multipart::Form::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.bin".to_string());
            form = form.part(
                "files",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        }

        let response = self.http_client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::api("Upload failed", status));
        }

        tracing::info!(files = paths.len(), "Uploaded source videos");
        Ok(())
    }

    /// Request (re)segmentation of videos.
    pub async fn request_segmentation(&self, video_ids: &[String], force: bool) -> Result<()> {
        let url = format!("{}/api/segment", self.base_url);

        let request = SegmentRequest { video_ids, force };
        let response = self.http_client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::api("Request failed", status));
        }

        tracing::info!(video_ids = ?video_ids, force, "Segmentation requested");
        Ok(())
    }

    /// Fetch a video's predicted segments.
    ///
    /// `Ok(None)` means "leave the current list alone": non-success status,
    /// undecodable body, or a body that is not an array.
    pub async fn fetch_clips(
        &self,
        video_id: &str,
        clips_url: Option<&str>,
    ) -> Result<Option<Vec<Segment>>> {
        let url = clips_location(&self.base_url, video_id, clips_url);
        self.fetch_segment_list(&url).await
    }

    /// Fetch ground-truth segments from a video's `gt_url`.
    ///
    /// Same record format and no-op rules as [`ApiClient::fetch_clips`].
    pub async fn fetch_ground_truth(&self, gt_url: &str) -> Result<Option<Vec<Segment>>> {
        self.fetch_segment_list(gt_url).await
    }

    async fn fetch_segment_list(&self, url: &str) -> Result<Option<Vec<Segment>>> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "Segment list unavailable");
            return Ok(None);
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Segment list body is not JSON");
                return Ok(None);
            }
        };

        let segments = parse_clips(&body);
        if segments.is_none() {
            tracing::debug!(url = %url, "Segment list body is not an array");
        }
        Ok(segments)
    }

    /// Open the status stream; the caller reads the body incrementally.
    pub async fn open_event_stream(&self) -> Result<reqwest::Response> {
        let url = format!("{}/api/events", self.base_url);

        let response = self
            .stream_client
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .send()
            .await
            .map_err(|e| Error::Stream(format!("connect failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Stream(format!("unexpected status {}", status)));
        }
        Ok(response)
    }
}

/// Request body for POST /api/segment
#[derive(Serialize)]
struct SegmentRequest<'a> {
    video_ids: &'a [String],
    force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_base() {
        let config = ApiConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(ApiClient::new(&config).is_err());
    }

    #[test]
    fn test_client_rejects_bad_scheme() {
        let config = ApiConfig {
            base_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(ApiClient::new(&config).is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash_from_base() {
        let config = ApiConfig {
            base_url: "http://api.local/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://api.local");
    }

    #[test]
    fn test_segment_request_body() {
        let ids = vec!["v1".to_string()];
        let body = serde_json::to_value(SegmentRequest {
            video_ids: &ids,
            force: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"video_ids": ["v1"], "force": true}));
    }
}
