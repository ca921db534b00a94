//! Long-lived status stream subscription.
//!
//! `disconnected → connecting → connected → (error → connecting ...)`.
//! After a transport error the consumer waits the current retry delay and
//! reconnects, as a browser `EventSource` would; a server `retry:` field
//! replaces the delay. Already-known statuses are never cleared here.

use std::time::Duration;

use futures_util::StreamExt;

use crate::client::ApiClient;

use super::events::{parse_envelope, StreamEvent};
use super::sse::SseDecoder;

/// Connection state of the status stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Transport failed; a reconnect attempt is scheduled
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        }
    }

    /// Next state after `signal`; returns `None` for transitions that cannot happen.
    pub fn next(self, signal: ConnectionSignal) -> Option<Self> {
        use ConnectionSignal as S;
        use ConnectionState as C;
        match (self, signal) {
            (C::Disconnected | C::Error, S::Connect) => Some(C::Connecting),
            (C::Connecting, S::Opened) => Some(C::Connected),
            (C::Connecting | C::Connected, S::Failed) => Some(C::Error),
            (_, S::Close) => Some(C::Disconnected),
            _ => None,
        }
    }
}

/// Inputs to the connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSignal {
    Connect,
    Opened,
    Failed,
    Close,
}

/// Output of the consumer
#[derive(Debug, Clone, PartialEq)]
pub enum StreamNotice {
    State(ConnectionState),
    Event(StreamEvent),
}

/// Reads `/api/events` until the receiver goes away.
pub struct StreamConsumer {
    client: ApiClient,
    retry: Duration,
    state: ConnectionState,
}

impl StreamConsumer {
    pub fn new(client: ApiClient, retry: Duration) -> Self {
        Self {
            client,
            retry,
            state: ConnectionState::Disconnected,
        }
    }

    /// Current reconnect delay
    pub fn retry(&self) -> Duration {
        self.retry
    }

    fn transition<F>(&mut self, signal: ConnectionSignal, emit: &mut F) -> bool
    where
        F: FnMut(StreamNotice) -> bool,
    {
        match self.state.next(signal) {
            Some(next) => {
                tracing::debug!(from = self.state.as_str(), to = next.as_str(), "Stream state");
                self.state = next;
                emit(StreamNotice::State(next))
            }
            None => true,
        }
    }

    /// Run until `emit` returns false (the receiving side is gone).
    ///
    /// The task is also cancelled by aborting it; no cleanup is required.
    pub async fn run<F>(mut self, mut emit: F)
    where
        F: FnMut(StreamNotice) -> bool + Send,
    {
        loop {
            if !self.transition(ConnectionSignal::Connect, &mut emit) {
                return;
            }

            match self.client.open_event_stream().await {
                Ok(response) => {
                    if !self.transition(ConnectionSignal::Opened, &mut emit) {
                        return;
                    }
                    tracing::info!(base_url = %self.client.base_url(), "Status stream connected");

                    let mut decoder = SseDecoder::new();
                    let mut body = response.bytes_stream();
                    while let Some(chunk) = body.next().await {
                        let bytes = match chunk {
                            Ok(bytes) => bytes,
                            Err(e) => {
                                tracing::warn!(error = %e, "Status stream read failed");
                                break;
                            }
                        };
                        for message in decoder.feed(&bytes) {
                            if !message.is_default_event() {
                                continue;
                            }
                            if let Some(event) = parse_envelope(&message.data) {
                                if !emit(StreamNotice::Event(event)) {
                                    return;
                                }
                            }
                        }
                        if let Some(retry_ms) = decoder.retry_ms() {
                            self.retry = Duration::from_millis(retry_ms);
                        }
                    }
                    tracing::warn!("Status stream ended");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Status stream connect failed");
                }
            }

            if !self.transition(ConnectionSignal::Failed, &mut emit) {
                return;
            }
            tokio::time::sleep(self.retry).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_happy_path() {
        let state = ConnectionState::Disconnected;
        let state = state.next(ConnectionSignal::Connect).unwrap();
        assert_eq!(state, ConnectionState::Connecting);
        let state = state.next(ConnectionSignal::Opened).unwrap();
        assert_eq!(state, ConnectionState::Connected);
        let state = state.next(ConnectionSignal::Failed).unwrap();
        assert_eq!(state, ConnectionState::Error);
        let state = state.next(ConnectionSignal::Connect).unwrap();
        assert_eq!(state, ConnectionState::Connecting);
    }

    #[test]
    fn test_state_machine_rejects_impossible_transitions() {
        assert!(ConnectionState::Disconnected
            .next(ConnectionSignal::Opened)
            .is_none());
        assert!(ConnectionState::Connected
            .next(ConnectionSignal::Connect)
            .is_none());
        assert_eq!(
            ConnectionState::Connected.next(ConnectionSignal::Close),
            Some(ConnectionState::Disconnected)
        );
    }
}
