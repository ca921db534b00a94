//! Live status stream
//!
//! Server-sent events from `GET /api/events`, decoded in three layers:
//!
//! ```text
//! bytes ──> SseDecoder ──> SseMessage.data ──> parse_envelope ──> StreamEvent
//! ```
//!
//! [`StreamConsumer`] owns the connection and its reconnect loop.

mod consumer;
mod events;
mod sse;

pub use consumer::{ConnectionSignal, ConnectionState, StreamConsumer, StreamNotice};
pub use events::{parse_envelope, StreamEvent, DEFAULT_TASK_ERROR};
pub use sse::{SseDecoder, SseMessage};
