//! Conversation export
//!
//! Produces a read-only snapshot of the conversation as pretty-printed JSON and
//! writes it to `chat-export-YYYY-MM-DD.json` in a target directory.

use crate::conversation::message::ChatMessage;
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// One exported message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// ISO-8601 creation time
    pub timestamp: String,
    /// "User" or "AI Assistant"
    pub sender: String,
    /// Message text
    pub message: String,
}

impl From<&ChatMessage> for ExportEntry {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            timestamp: msg.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            sender: msg.author.label().to_string(),
            message: msg.content.clone(),
        }
    }
}

/// Build export entries for `messages`, in order
pub fn snapshot(messages: &[ChatMessage]) -> Vec<ExportEntry> {
    messages.iter().map(ExportEntry::from).collect()
}

/// Render export entries as indented JSON
pub fn to_json(entries: &[ExportEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).map_err(Error::from)
}

/// File name for an export taken at `now`
pub fn file_name(now: DateTime<Utc>) -> String {
    format!("chat-export-{}.json", now.format("%Y-%m-%d"))
}

/// Write `json` into `dir` under the export file name for `now`
///
/// Creates `dir` if needed and returns the path written. An existing export
/// from the same day is overwritten.
pub fn write_to_dir<P: AsRef<Path>>(dir: P, json: &str, now: DateTime<Utc>) -> Result<PathBuf> {
    let dir = dir.as_ref();

    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Export(format!("Failed to create export directory: {}", e)))?;

    let path = dir.join(file_name(now));
    std::fs::write(&path, json)
        .map_err(|e| Error::Export(format!("Failed to write export: {}", e)))?;

    info!("Exported conversation to {}", path.display());
    Ok(path)
}
