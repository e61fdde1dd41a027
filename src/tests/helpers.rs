//! Shared test helpers

use crate::config::Settings;
use crate::conversation::Conversation;
use crate::transport::MessageSink;
use crate::tui::App;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use tempfile::TempDir;

/// Sink that records every text it is handed
pub struct RecordingSink {
    /// Texts handed to the sink, in order
    pub sent: RefCell<Vec<String>>,
    /// Whether to report the text as transmitted
    pub accept: bool,
}

impl RecordingSink {
    /// Sink behaving like an open channel
    pub fn open() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            accept: true,
        }
    }

    /// Sink behaving like a closed channel
    pub fn closed() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            accept: false,
        }
    }

    /// Snapshot of the recorded texts
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl MessageSink for RecordingSink {
    fn send_message(&self, text: &str) -> bool {
        self.sent.borrow_mut().push(text.to_string());
        self.accept
    }
}

/// Conversation with a deterministic random source
pub fn seeded_conversation(seed: u64) -> Conversation {
    Conversation::with_rng(StdRng::seed_from_u64(seed))
}

/// Helper to create an App exporting into a temporary directory
/// Returns (App, TempDir) - the TempDir must be kept alive for the test duration
pub fn create_test_app() -> (App, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = Settings {
        export_dir: temp_dir.path().to_path_buf(),
        scroll_delay_ms: 100,
        ..Settings::default()
    };
    let app = App::with_conversation(seeded_conversation(7), &settings);
    (app, temp_dir)
}
