//! # vidsynth-core
//!
//! Core library for vidsynth - a dashboard for inspecting a video
//! segmentation pipeline.
//!
//! This library provides:
//! - Domain types for videos, segments, logs and cluster points
//! - The asset mapper and the status reconciler
//! - Segment fetching and the cross-video timeline
//! - The live status stream (server-sent events)
//! - An HTTP client for the pipeline API
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Status for each video comes from three sources:
//! - **Snapshot:** the asset list and the stream's resync message
//! - **Stream:** incremental `status_update` / `task_complete` / `error` events
//! - **Optimistic:** local writes issued when the user starts a run
//!
//! All three go through one [`reconciler::Reconciler`]; the view reads the
//! reconciled status through [`pipeline::PipelineState`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use vidsynth_core::{ApiClient, Config, PipelineState};
//!
//! # async fn run() -> vidsynth_core::Result<()> {
//! let config = Config::load()?;
//! let client = ApiClient::new(&config.api)?;
//!
//! let mut pipeline = PipelineState::new(client.base_url());
//! let videos = client.list_assets().await?;
//! for effect in pipeline.replace_assets(videos) {
//!     println!("{:?}", effect);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use client::ApiClient;
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{PipelineEffect, PipelineState, RunRequest};
pub use reconciler::{Reconciler, StatusPatch, StatusWrite};
pub use stream::{ConnectionState, StreamConsumer, StreamEvent, StreamNotice};
pub use timeline::{SegmentRef, Timeline};
pub use types::*;

// Public modules
pub mod assets;
pub mod client;
pub mod config;
pub mod edl;
pub mod error;
pub mod format;
pub mod logging;
pub mod pipeline;
pub mod playback;
pub mod reconciler;
pub mod sandbox;
pub mod schedule;
pub mod segments;
pub mod semantic;
pub mod strategy;
pub mod stream;
pub mod timeline;
pub mod types;
