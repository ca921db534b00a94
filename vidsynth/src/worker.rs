//! Background network worker.
//!
//! The UI thread owns all state. Every network call runs on a dedicated
//! thread with its own tokio runtime; results come back over a std channel
//! that the main loop drains once per frame.

use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle as TaskHandle;
use vidsynth_core::segments::FetchTicket;
use vidsynth_core::{ApiClient, Segment, StreamConsumer, StreamNotice, VideoResource};

/// Requests from the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerCommand {
    LoadAssets,
    RunSegmentation {
        video_ids: Vec<String>,
        force: bool,
    },
    FetchSegments {
        ticket: FetchTicket,
        clips_url: Option<String>,
    },
    FetchGroundTruth {
        video_id: String,
        gt_url: String,
    },
    ImportVideos {
        paths: Vec<PathBuf>,
    },
    /// Open (or reopen) the status stream; notices carry `epoch`
    OpenStream {
        epoch: u64,
    },
    CloseStream,
}

/// Results delivered back to the UI thread.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Assets(std::result::Result<Vec<VideoResource>, String>),
    RunFailed {
        video_id: String,
        message: String,
    },
    Segments {
        ticket: FetchTicket,
        segments: Option<Vec<Segment>>,
    },
    GroundTruth {
        video_id: String,
        segments: Option<Vec<Segment>>,
    },
    ImportFinished(std::result::Result<(), String>),
    Stream {
        epoch: u64,
        notice: StreamNotice,
    },
}

/// Handle to the worker thread.
pub struct Worker {
    commands: mpsc::UnboundedSender<WorkerCommand>,
    events: std_mpsc::Receiver<WorkerEvent>,
    thread: JoinHandle<()>,
}

impl Worker {
    /// Start the worker thread.
    pub fn spawn(client: ApiClient, reconnect: Duration) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = std_mpsc::channel();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to create tokio runtime")?;

        let thread = std::thread::Builder::new()
            .name("vidsynth-worker".to_string())
            .spawn(move || {
                runtime.block_on(dispatch(client, reconnect, command_rx, event_tx));
            })
            .context("failed to spawn worker thread")?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            thread,
        })
    }

    /// Sender for [`WorkerCommand`]s.
    pub fn sender(&self) -> mpsc::UnboundedSender<WorkerCommand> {
        self.commands.clone()
    }

    /// Collect every result delivered since the last call.
    pub fn drain(&self) -> Vec<WorkerEvent> {
        self.events.try_iter().collect()
    }

    /// Stop the worker and wait for its thread.
    ///
    /// The worker exits once every sender is dropped, so callers must drop
    /// their clones from [`Worker::sender`] first.
    pub fn shutdown(self) {
        let Worker {
            commands, thread, ..
        } = self;
        drop(commands);
        if thread.join().is_err() {
            tracing::warn!("Worker thread panicked");
        }
    }
}

async fn dispatch(
    client: ApiClient,
    reconnect: Duration,
    mut commands: mpsc::UnboundedReceiver<WorkerCommand>,
    events: std_mpsc::Sender<WorkerEvent>,
) {
    let mut stream_task: Option<TaskHandle<()>> = None;

    while let Some(command) = commands.recv().await {
        tracing::debug!(command = ?command, "Worker command");
        match command {
            WorkerCommand::OpenStream { epoch } => {
                if let Some(task) = stream_task.take() {
                    task.abort();
                }
                let tx = events.clone();
                let consumer = StreamConsumer::new(client.clone(), reconnect);
                stream_task = Some(tokio::spawn(consumer.run(move |notice| {
                    tx.send(WorkerEvent::Stream { epoch, notice }).is_ok()
                })));
            }
            WorkerCommand::CloseStream => {
                if let Some(task) = stream_task.take() {
                    task.abort();
                    tracing::info!("Status stream closed");
                }
            }
            other => {
                let client = client.clone();
                let tx = events.clone();
                tokio::spawn(async move {
                    if let Some(event) = perform(&client, other).await {
                        let _ = tx.send(event);
                    }
                });
            }
        }
    }

    if let Some(task) = stream_task.take() {
        task.abort();
    }
    tracing::debug!("Worker stopped");
}

/// Run one request-style command.
async fn perform(client: &ApiClient, command: WorkerCommand) -> Option<WorkerEvent> {
    let event = match command {
        WorkerCommand::LoadAssets => {
            WorkerEvent::Assets(client.list_assets().await.map_err(|e| e.to_string()))
        }
        WorkerCommand::RunSegmentation { video_ids, force } => {
            match client.request_segmentation(&video_ids, force).await {
                Ok(()) => return None,
                Err(e) => WorkerEvent::RunFailed {
                    video_id: video_ids.first().cloned().unwrap_or_default(),
                    message: e.to_string(),
                },
            }
        }
        WorkerCommand::FetchSegments { ticket, clips_url } => {
            let segments = client
                .fetch_clips(&ticket.video_id, clips_url.as_deref())
                .await
                .unwrap_or_else(|e| {
                    tracing::debug!(
                        video_id = %ticket.video_id,
                        error = %e,
                        "Segment fetch failed"
                    );
                    None
                });
            WorkerEvent::Segments { ticket, segments }
        }
        WorkerCommand::FetchGroundTruth { video_id, gt_url } => {
            let segments = client
                .fetch_ground_truth(&gt_url)
                .await
                .unwrap_or_else(|e| {
                    tracing::debug!(
                        video_id = %video_id,
                        error = %e,
                        "Ground truth fetch failed"
                    );
                    None
                });
            WorkerEvent::GroundTruth { video_id, segments }
        }
        WorkerCommand::ImportVideos { paths } => WorkerEvent::ImportFinished(
            client
                .import_videos(paths.as_slice())
                .await
                .map_err(|e| e.to_string()),
        ),
        WorkerCommand::OpenStream { .. } | WorkerCommand::CloseStream => return None,
    };
    Some(event)
}
