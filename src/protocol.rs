//! Protocol module
//!
//! This module defines the wire format spoken with the assistant backend:
//! - A single-field JSON envelope `{"message": "..."}` used in both directions
//! - Encoding of outbound text and decoding of inbound frames
//! - The default endpoint the bridge connects to

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Endpoint used when no other is configured
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8765";

/// Envelope wrapping every frame exchanged with the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    /// Text payload
    pub message: String,
}

impl Envelope {
    /// Create a new envelope around `message`
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Encode the envelope as a JSON text frame
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }

    /// Decode an envelope from an inbound JSON text frame
    ///
    /// Fails with [`Error::Decode`] when the frame is not JSON, is not an object,
    /// or lacks a string `message` field. Extra fields are ignored.
    pub fn from_json(frame: &str) -> Result<Self> {
        serde_json::from_str(frame)
            .map_err(|e| Error::Decode(format!("Invalid envelope: {}", e)))
    }
}

/// Encode outbound text into a JSON envelope frame
pub fn encode(text: &str) -> Result<String> {
    Envelope::new(text).to_json()
}

/// Decode an inbound frame and return its text payload
pub fn decode(frame: &str) -> Result<String> {
    Envelope::from_json(frame).map(|envelope| envelope.message)
}
