//! Reconnecting live-update stream.
//!
//! The remote endpoint answers a POST with a long-lived,
//! `text/event-stream`-shaped body. The client reads the body incrementally,
//! splits on newlines, and hands the payload of every `data:`-prefixed line
//! to the subscriber. Connection loss triggers bounded, exponentially
//! backed-off reconnects; `disconnect()` cancels cooperatively from any
//! state, including mid-backoff.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Reconnect attempts before giving up.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// First backoff delay; doubles on each subsequent attempt.
pub const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Connection state, observable by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Connected,
    Backoff,
}

/// What subscribers receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Raw payload of one `data:` line.
    Payload(String),
    /// Terminal: reconnect attempts are exhausted, the stream is down.
    Exhausted { attempts: u32 },
}

/// Source of raw body chunks for one connection attempt. reqwest in
/// production, scripted streams in tests.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn open(
        &self,
        address: &str,
    ) -> Result<BoxStream<'static, Result<Vec<u8>, ClientError>>, ClientError>;
}

/// reqwest-backed [`EventTransport`]: streaming POST with the subscriber's
/// address in the body.
pub struct HttpEventTransport {
    http: reqwest::Client,
    url: String,
}

impl HttpEventTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        // No request timeout here: the body is intentionally long-lived.
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            url: config.stream_url.clone(),
        })
    }
}

#[async_trait]
impl EventTransport for HttpEventTransport {
    async fn open(
        &self,
        address: &str,
    ) -> Result<BoxStream<'static, Result<Vec<u8>, ClientError>>, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "address": address }))
            .send()
            .await?
            .error_for_status()
            .map_err(ClientError::from)?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(ClientError::from))
            .boxed())
    }
}

/// Splits complete lines out of `buffer` and returns the payloads of
/// `data:`-prefixed ones. A partial trailing line stays buffered until the
/// next chunk completes it.
fn drain_events(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(payload) = line.strip_prefix("data:") {
            payloads.push(payload.trim_start().to_string());
        }
    }
    payloads
}

/// Handle on the live-update connection. Owns the background task; dropping
/// the handle or calling [`disconnect`](Self::disconnect) cancels it.
pub struct LiveUpdateStream {
    transport: Arc<dyn EventTransport>,
    state: Arc<Mutex<StreamState>>,
    backoff_base: Duration,
    max_attempts: u32,
    cancel: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl LiveUpdateStream {
    pub fn new(transport: Arc<dyn EventTransport>) -> Self {
        Self::with_retry(transport, BACKOFF_BASE, MAX_RECONNECT_ATTEMPTS)
    }

    /// Overrides the retry schedule. Used by tests; production code keeps the
    /// defaults.
    pub fn with_retry(
        transport: Arc<dyn EventTransport>,
        backoff_base: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(StreamState::Disconnected)),
            backoff_base,
            max_attempts,
            cancel: None,
            task: None,
        }
    }

    pub fn state(&self) -> StreamState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Opens the stream for `address` and delivers updates to `handler`.
    /// An existing connection is torn down first.
    pub fn connect<F>(&mut self, address: &str, handler: F)
    where
        F: Fn(StreamUpdate) + Send + Sync + 'static,
    {
        self.disconnect();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.cancel = Some(cancel_tx);

        let task = tokio::spawn(run_stream(
            Arc::clone(&self.transport),
            address.to_string(),
            Arc::new(handler),
            Arc::clone(&self.state),
            self.backoff_base,
            self.max_attempts,
            cancel_rx,
        ));
        self.task = Some(task);
    }

    /// Cancels any in-flight connection and forces `Disconnected` regardless
    /// of the current state.
    pub fn disconnect(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(true);
        }
        self.task = None;
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = StreamState::Disconnected;
    }
}

impl Drop for LiveUpdateStream {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn set_state(state: &Mutex<StreamState>, value: StreamState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = value;
}

async fn run_stream(
    transport: Arc<dyn EventTransport>,
    address: String,
    handler: Arc<dyn Fn(StreamUpdate) + Send + Sync>,
    state: Arc<Mutex<StreamState>>,
    backoff_base: Duration,
    max_attempts: u32,
    mut cancel: watch::Receiver<bool>,
) {
    let mut attempts = 0u32;
    let mut delay = backoff_base;

    loop {
        set_state(&state, StreamState::Connecting);

        let opened = tokio::select! {
            _ = cancel.changed() => {
                set_state(&state, StreamState::Disconnected);
                return;
            }
            result = transport.open(&address) => result,
        };

        match opened {
            Ok(mut chunks) => {
                debug!(%address, "live update stream connected");
                set_state(&state, StreamState::Connected);
                attempts = 0;
                delay = backoff_base;

                let mut buffer = String::new();
                loop {
                    tokio::select! {
                        _ = cancel.changed() => {
                            set_state(&state, StreamState::Disconnected);
                            return;
                        }
                        chunk = chunks.next() => match chunk {
                            Some(Ok(bytes)) => {
                                buffer.push_str(&String::from_utf8_lossy(&bytes));
                                for payload in drain_events(&mut buffer) {
                                    handler(StreamUpdate::Payload(payload));
                                }
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "live update stream errored");
                                break;
                            }
                            None => {
                                debug!("live update stream ended");
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "live update stream failed to connect");
            }
        }

        attempts += 1;
        if attempts >= max_attempts {
            warn!(attempts, "live update stream giving up");
            handler(StreamUpdate::Exhausted { attempts });
            set_state(&state, StreamState::Disconnected);
            return;
        }

        set_state(&state, StreamState::Backoff);
        tokio::select! {
            _ = cancel.changed() => {
                set_state(&state, StreamState::Disconnected);
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
        delay *= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::mpsc;

    // ─── line parsing ────────────────────────────────────────────────

    #[test]
    fn drain_events_extracts_data_lines() {
        let mut buffer = "data: one\nnoise\ndata:two\n".to_string();
        assert_eq!(drain_events(&mut buffer), vec!["one", "two"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn drain_events_keeps_partial_trailing_line() {
        let mut buffer = "data: complete\ndata: par".to_string();
        assert_eq!(drain_events(&mut buffer), vec!["complete"]);
        assert_eq!(buffer, "data: par");

        buffer.push_str("tial\n");
        assert_eq!(drain_events(&mut buffer), vec!["partial"]);
    }

    #[test]
    fn drain_events_handles_crlf() {
        let mut buffer = "data: a\r\ndata: b\r\n".to_string();
        assert_eq!(drain_events(&mut buffer), vec!["a", "b"]);
    }

    #[test]
    fn drain_events_ignores_non_data_lines() {
        let mut buffer = "event: ping\n: comment\n\n".to_string();
        assert!(drain_events(&mut buffer).is_empty());
    }

    // ─── state machine ───────────────────────────────────────────────

    /// Transport whose first `scripted` opens yield the given chunk lists,
    /// after which every open fails. Counts open calls.
    struct ScriptedTransport {
        scripted: Mutex<Vec<Vec<&'static str>>>,
        opens: AtomicU32,
    }

    impl ScriptedTransport {
        fn failing() -> Self {
            Self {
                scripted: Mutex::new(Vec::new()),
                opens: AtomicU32::new(0),
            }
        }

        fn with_chunks(chunks: Vec<&'static str>) -> Self {
            Self {
                scripted: Mutex::new(vec![chunks]),
                opens: AtomicU32::new(0),
            }
        }

        fn open_count(&self) -> u32 {
            self.opens.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventTransport for ScriptedTransport {
        async fn open(
            &self,
            _address: &str,
        ) -> Result<BoxStream<'static, Result<Vec<u8>, ClientError>>, ClientError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            let next = self.scripted.lock().unwrap().pop();
            match next {
                Some(chunks) => Ok(stream::iter(
                    chunks
                        .into_iter()
                        .map(|c| Ok(c.as_bytes().to_vec()))
                        .collect::<Vec<_>>(),
                )
                .boxed()),
                None => Err(ClientError::Network("connection refused".into())),
            }
        }
    }

    #[tokio::test]
    async fn delivers_payloads_from_connected_stream() {
        let transport = Arc::new(ScriptedTransport::with_chunks(vec![
            "data: first\nda",
            "ta: second\nignored\n",
        ]));
        let mut live = LiveUpdateStream::with_retry(transport, Duration::from_secs(3600), 2);

        let (tx, mut rx) = mpsc::unbounded_channel();
        live.connect("0xabc", move |update| {
            let _ = tx.send(update);
        });

        assert_eq!(rx.recv().await, Some(StreamUpdate::Payload("first".into())));
        assert_eq!(rx.recv().await, Some(StreamUpdate::Payload("second".into())));
        live.disconnect();
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_bounded_attempts() {
        let transport = Arc::new(ScriptedTransport::failing());
        let mut live = LiveUpdateStream::with_retry(
            Arc::clone(&transport) as Arc<dyn EventTransport>,
            Duration::from_secs(1),
            MAX_RECONNECT_ATTEMPTS,
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        live.connect("0xabc", move |update| {
            let _ = tx.send(update);
        });

        // Paused time auto-advances through the 1s/2s/4s/8s backoffs.
        assert_eq!(
            rx.recv().await,
            Some(StreamUpdate::Exhausted {
                attempts: MAX_RECONNECT_ATTEMPTS
            })
        );
        assert_eq!(transport.open_count(), MAX_RECONNECT_ATTEMPTS);

        // Terminal: no further reconnects after exhaustion.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.open_count(), MAX_RECONNECT_ATTEMPTS);
        assert_eq!(live.state(), StreamState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_during_backoff_halts_reconnects() {
        let transport = Arc::new(ScriptedTransport::failing());
        // One-hour backoff: after the first failed open the task sits in
        // Backoff until cancelled.
        let mut live = LiveUpdateStream::with_retry(
            Arc::clone(&transport) as Arc<dyn EventTransport>,
            Duration::from_secs(3600),
            MAX_RECONNECT_ATTEMPTS,
        );

        live.connect("0xabc", |_| {});

        // Wait for the first attempt to fail and the backoff to begin.
        while live.state() != StreamState::Backoff {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(transport.open_count(), 1);

        live.disconnect();
        assert_eq!(live.state(), StreamState::Disconnected);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(transport.open_count(), 1, "no reconnect after disconnect");
    }

    #[tokio::test]
    async fn initial_state_is_disconnected() {
        let live = LiveUpdateStream::new(Arc::new(ScriptedTransport::failing()));
        assert_eq!(live.state(), StreamState::Disconnected);
    }
}
