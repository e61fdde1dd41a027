//! Concierge - a terminal chat client for a hotel virtual assistant
//!
//! This library provides the two halves of the client:
//! - `transport` - the bridge owning the single WebSocket channel
//! - `conversation` - the message list, typing indicator and reply state machine
//!
//! plus the presentation helpers (`format`), the cosmetic online status
//! simulation (`status`), settings (`config`) and the terminal front-end (`tui`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod conversation;
pub mod format;
pub mod protocol;
pub mod status;
pub mod transport;
pub mod tui;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Result type alias for Concierge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Concierge operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Inbound frame could not be decoded into an envelope
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid or unreadable settings
    #[error("Config error: {0}")]
    Config(String),

    /// Conversation export failure
    #[error("Export error: {0}")]
    Export(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Install the global tracing subscriber, writing plain-text events to `writer`.
///
/// The filter is taken from `RUST_LOG` and defaults to `info`. Returns an error
/// if a global subscriber is already installed.
pub fn init_logging<W>(writer: W) -> Result<()>
where
    W: Write + Send + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(writer))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install logger: {}", e)))
}
