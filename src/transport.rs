//! Network transport module
//!
//! This module owns the single WebSocket channel to the assistant backend:
//! - Connecting once to a fixed endpoint (no retry, no backoff)
//! - Encoding outbound text into envelopes and writing them to the socket
//! - Decoding inbound envelopes and publishing them to every subscriber
//! - Closing the channel on request
//!
//! Socket failures are logged and published as [`BridgeEvent`]s; nothing here
//! reconnects on its own.

use crate::{protocol, Error, Result};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

/// Capacity of the inbound event channel shared by all subscribers
const EVENT_CAPACITY: usize = 64;

/// Lifecycle of the bridge's channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// `connect` has never been called
    Unconnected,
    /// The socket is open and accepts outbound frames
    Open,
    /// The socket was closed, failed to open, or failed mid-session
    Closed,
}

/// Event published on the bridge's inbound stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The connection was established
    Opened,
    /// A decoded reply payload
    Reply(String),
    /// An inbound frame that was not a valid envelope
    DecodeFailed(String),
    /// A socket-level error
    Error(String),
    /// The connection was closed
    Closed,
}

/// Anything that can carry outbound chat text to the backend
pub trait MessageSink {
    /// Hand `text` to the channel. Returns `false` when the text was dropped.
    fn send_message(&self, text: &str) -> bool;
}

/// Bridge owning one WebSocket connection to the assistant backend
#[derive(Clone)]
pub struct ChatBridge {
    /// WebSocket URL
    endpoint: String,
    /// Current channel state
    state: Arc<Mutex<ConnectionState>>,
    /// Writer half of the live connection, if any
    outbound: Arc<Mutex<Option<mpsc::UnboundedSender<WsMessage>>>>,
    /// Inbound event fan-out
    events: broadcast::Sender<BridgeEvent>,
    /// Bumped on every connect so stale reader tasks don't clobber state
    generation: Arc<AtomicU64>,
}

impl ChatBridge {
    /// Create a bridge for `endpoint` without connecting
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            endpoint: endpoint.into(),
            state: Arc::new(Mutex::new(ConnectionState::Unconnected)),
            outbound: Arc::new(Mutex::new(None)),
            events,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Endpoint this bridge connects to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current channel state
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Whether outbound frames are currently accepted
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Open the connection and start the reader and writer tasks
    ///
    /// A failure is logged, published as [`BridgeEvent::Error`], and leaves the
    /// bridge [`ConnectionState::Closed`] until `connect` is called again. Any
    /// channel that was open before the failed attempt is closed as well.
    /// Calling `connect` while a connection is open replaces it.
    pub async fn connect(&self) -> Result<()> {
        info!("Connecting to {}", self.endpoint);

        let (ws_stream, _) = match connect_async(self.endpoint.as_str()).await {
            Ok(pair) => pair,
            Err(e) => {
                error!("WebSocket error: {}", e);
                self.disconnect();
                *self.state.lock() = ConnectionState::Closed;
                let _ = self.events.send(BridgeEvent::Error(e.to_string()));
                return Err(Error::WebSocket(e));
            }
        };

        self.disconnect();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (mut sink, mut stream) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

        *self.outbound.lock() = Some(tx);
        *self.state.lock() = ConnectionState::Open;
        info!("WebSocket connection established");
        let _ = self.events.send(BridgeEvent::Opened);

        // Writer task
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                let closing = matches!(frame, WsMessage::Close(_));
                if let Err(e) = sink.send(frame).await {
                    error!("WebSocket error: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
            debug!("Writer task finished");
        });

        // Reader task
        let events = self.events.clone();
        let state = self.state.clone();
        let outbound = self.outbound.clone();
        let current = self.generation.clone();
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => match protocol::decode(&text) {
                        Ok(reply) => {
                            debug!("Received reply ({} bytes)", reply.len());
                            let _ = events.send(BridgeEvent::Reply(reply));
                        }
                        Err(e) => {
                            error!("Failed to decode inbound frame: {}", e);
                            let _ = events.send(BridgeEvent::DecodeFailed(e.to_string()));
                        }
                    },
                    Ok(WsMessage::Close(_)) => break,
                    Ok(other) => debug!("Ignoring non-text frame: {:?}", other),
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        if current.load(Ordering::SeqCst) == generation {
                            let _ = events.send(BridgeEvent::Error(e.to_string()));
                        }
                        break;
                    }
                }
            }

            // A replaced connection closes silently
            if current.load(Ordering::SeqCst) != generation {
                debug!("Superseded WebSocket connection closed");
                return;
            }
            *state.lock() = ConnectionState::Closed;
            outbound.lock().take();
            info!("WebSocket connection closed");
            let _ = events.send(BridgeEvent::Closed);
        });

        Ok(())
    }

    /// Encode `text` as an envelope and transmit it
    ///
    /// When the channel is not open the text is dropped with a warning; it is
    /// neither queued nor retried.
    pub fn send_message(&self, text: &str) -> bool {
        let guard = self.outbound.lock();
        let sender = match (&*guard, self.state()) {
            (Some(sender), ConnectionState::Open) => sender,
            _ => {
                warn!("WebSocket is not open");
                return false;
            }
        };

        let frame = match protocol::encode(text) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode outbound message: {}", e);
                return false;
            }
        };

        if sender.send(WsMessage::Text(frame)).is_err() {
            warn!("WebSocket is not open");
            return false;
        }
        true
    }

    /// Subscribe to the inbound event stream
    ///
    /// Every subscriber sees every event published after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Close the channel if one is present. Does nothing otherwise.
    pub fn disconnect(&self) {
        let Some(sender) = self.outbound.lock().take() else {
            debug!("Disconnect requested with no open channel");
            return;
        };

        info!("Closing WebSocket connection");
        let _ = sender.send(WsMessage::Close(None));
        *self.state.lock() = ConnectionState::Closed;
    }
}

impl MessageSink for ChatBridge {
    fn send_message(&self, text: &str) -> bool {
        ChatBridge::send_message(self, text)
    }
}
