//! Application state for the TUI.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;
use vidsynth_core::config::SandboxConfig;
use vidsynth_core::sandbox::Sandbox;
use vidsynth_core::strategy::StrategyField;
use vidsynth_core::{PipelineEffect, PipelineState, StreamNotice};

use crate::worker::{WorkerCommand, WorkerEvent};

mod config_modal;
mod pipeline;
mod sandbox;

/// Top-level view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Four-stage pipeline over the active video
    #[default]
    Pipeline,
    /// Synthetic clustering demo
    Sandbox,
}

/// Stage tab within the pipeline view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Segmentation,
    Semantic,
    Strategy,
    FinalCut,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Segmentation,
        Stage::Semantic,
        Stage::Strategy,
        Stage::FinalCut,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Segmentation => "1 Segmentation",
            Stage::Semantic => "2 Semantic",
            Stage::Strategy => "3 Strategy",
            Stage::FinalCut => "4 Final Cut",
        }
    }
}

/// Project config modal state.
#[derive(Debug, Clone, Default)]
pub struct ConfigModal {
    /// Comma-separated file paths for "Add Sources"
    pub input: String,
    /// An upload is in flight
    pub uploading: bool,
    pub upload_error: Option<String>,
    /// Highlighted row of the video pool
    pub cursor: usize,
}

/// Main application state.
pub struct App {
    pub view_mode: ViewMode,
    pub stage: Stage,
    pub pipeline: PipelineState,
    pub sandbox: Sandbox,
    /// Strategy parameter being edited
    pub strategy_field: StrategyField,
    /// Open project config modal, if any
    pub config_modal: Option<ConfigModal>,
    pub should_quit: bool,
    commands: UnboundedSender<WorkerCommand>,
    /// Bumped on every stream (re)open; notices from older streams are dropped
    stream_epoch: u64,
    rng: StdRng,
}

impl App {
    /// Create a new app that talks to the worker through `commands`.
    pub fn new(
        base_url: &str,
        sandbox: &SandboxConfig,
        commands: UnboundedSender<WorkerCommand>,
    ) -> Self {
        let mut rng = StdRng::from_entropy();
        Self {
            view_mode: ViewMode::Pipeline,
            stage: Stage::Segmentation,
            pipeline: PipelineState::new(base_url),
            sandbox: Sandbox::new(sandbox.point_count, sandbox.default_k, &mut rng),
            strategy_field: StrategyField::UpperThreshold,
            config_modal: None,
            should_quit: false,
            commands,
            stream_epoch: 0,
            rng,
        }
    }

    /// Enter the pipeline view: subscribe to the stream and load assets.
    pub fn start(&mut self) {
        self.open_stream();
        self.load_assets();
    }

    fn send(&self, command: WorkerCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Worker channel closed, command dropped");
        }
    }

    fn load_assets(&mut self) {
        self.pipeline.begin_asset_load();
        self.send(WorkerCommand::LoadAssets);
    }

    fn open_stream(&mut self) {
        self.stream_epoch += 1;
        self.send(WorkerCommand::OpenStream {
            epoch: self.stream_epoch,
        });
    }

    fn close_stream(&mut self) {
        self.stream_epoch += 1;
        self.send(WorkerCommand::CloseStream);
    }

    /// Hand pipeline effects to the worker.
    fn dispatch(&self, effects: Vec<PipelineEffect>) {
        for effect in effects {
            let command = match effect {
                PipelineEffect::FetchSegments { ticket, clips_url } => {
                    WorkerCommand::FetchSegments { ticket, clips_url }
                }
                PipelineEffect::FetchGroundTruth { video_id, gt_url } => {
                    WorkerCommand::FetchGroundTruth { video_id, gt_url }
                }
            };
            self.send(command);
        }
    }

    /// Apply one result from the worker.
    pub fn apply_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Assets(Ok(videos)) => {
                let effects = self.pipeline.replace_assets(videos);
                self.dispatch(effects);
                self.clamp_modal_cursor();
            }
            WorkerEvent::Assets(Err(message)) => {
                self.pipeline.assets_failed(message);
            }
            WorkerEvent::RunFailed { video_id, message } => {
                self.pipeline.run_failed(&video_id, message);
            }
            WorkerEvent::Segments { ticket, segments } => {
                self.pipeline.apply_segments(&ticket, segments);
            }
            WorkerEvent::GroundTruth { video_id, segments } => {
                self.pipeline.apply_ground_truth(&video_id, segments);
            }
            WorkerEvent::ImportFinished(result) => self.finish_import(result),
            WorkerEvent::Stream { epoch, notice } => {
                if epoch != self.stream_epoch || self.view_mode != ViewMode::Pipeline {
                    return;
                }
                match notice {
                    StreamNotice::State(state) => self.pipeline.set_connection(state),
                    StreamNotice::Event(event) => {
                        let effects = self.pipeline.apply_stream_event(event);
                        self.dispatch(effects);
                    }
                }
            }
        }
    }

    /// Advance timers (simulated runs, playback).
    pub fn tick(&mut self, now: Instant) {
        if self.view_mode == ViewMode::Pipeline {
            self.pipeline.tick(now);
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.config_modal.is_some() {
            self.handle_config_modal_key(key);
            return;
        }
        match self.view_mode {
            ViewMode::Pipeline => self.handle_pipeline_key(key),
            ViewMode::Sandbox => self.handle_sandbox_key(key),
        }
    }

    /// Keys shared by both views. Returns true if the key was consumed.
    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.switch_view();
            }
            KeyCode::Char('c') => {
                self.config_modal = Some(ConfigModal {
                    cursor: self.pipeline.active_index().unwrap_or(0),
                    ..Default::default()
                });
            }
            _ => return false,
        }
        true
    }

    fn switch_view(&mut self) {
        match self.view_mode {
            ViewMode::Pipeline => {
                self.pipeline.leave();
                self.close_stream();
                self.view_mode = ViewMode::Sandbox;
            }
            ViewMode::Sandbox => {
                self.view_mode = ViewMode::Pipeline;
                self.start();
            }
        }
        tracing::debug!(view = ?self.view_mode, "View switched");
    }

    fn clamp_modal_cursor(&mut self) {
        let len = self.pipeline.videos().len();
        if let Some(modal) = self.config_modal.as_mut() {
            modal.cursor = modal.cursor.min(len.saturating_sub(1));
        }
    }
}

/// Split the "Add Sources" input into paths.
fn parse_paths(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}
