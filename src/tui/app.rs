//! Main TUI application state and logic

use crate::config::Settings;
use crate::conversation::{Conversation, ConversationEvent, QUICK_SUGGESTIONS};
use crate::transport::{BridgeEvent, ConnectionState, MessageSink};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Application state
pub struct App {
    /// The conversation being displayed
    pub conversation: Conversation,
    /// Input buffer for message composition
    pub input: String,
    /// Highlighted quick suggestion, if any
    pub selected_suggestion: Option<usize>,
    /// Lines scrolled up from the newest message (0 = bottom)
    pub scroll_back: usize,
    /// State of the bridge's channel as last reported
    pub connection: ConnectionState,
    /// Status message shown in the help line
    pub status_message: Option<String>,
    /// Should quit
    pub should_quit: bool,
    /// Animation frame counter
    pub tick: u64,
    /// When the view should next jump to the newest message
    follow_at: Option<Instant>,
    /// Set by the conversation listener when messages are appended
    appended: Arc<AtomicBool>,
    /// Directory exports are written to
    export_dir: PathBuf,
    /// Delay before following a new message
    scroll_delay: Duration,
}

impl App {
    /// Create the application with a fresh conversation
    pub fn new(settings: &Settings) -> Self {
        Self::with_conversation(Conversation::new(), settings)
    }

    /// Create the application around an existing conversation
    pub fn with_conversation(mut conversation: Conversation, settings: &Settings) -> Self {
        conversation.set_dark_theme(settings.dark_theme);

        let appended = Arc::new(AtomicBool::new(false));
        let flag = appended.clone();
        conversation.subscribe(move |event| {
            if *event == ConversationEvent::MessagesChanged {
                flag.store(true, Ordering::SeqCst);
            }
        });

        Self {
            conversation,
            input: String::new(),
            selected_suggestion: None,
            scroll_back: 0,
            connection: ConnectionState::Unconnected,
            status_message: None,
            should_quit: false,
            tick: 0,
            follow_at: None,
            appended,
            export_dir: settings.export_dir.clone(),
            scroll_delay: Duration::from_millis(settings.scroll_delay_ms),
        }
    }

    /// Add character to input
    pub fn add_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Remove last character from input
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Send the input buffer through `sink`
    pub fn submit_input(&mut self, sink: &dyn MessageSink) {
        if self.input.trim().is_empty() {
            return;
        }

        if self.conversation.send_message(&self.input, sink) {
            self.input.clear();
            self.status_message = None;
        } else if self.conversation.is_awaiting_reply() {
            self.status_message = Some("Please wait for the assistant to reply".to_string());
        }
    }

    /// Highlight the next quick suggestion
    pub fn next_suggestion(&mut self) {
        self.selected_suggestion = Some(match self.selected_suggestion {
            Some(i) => (i + 1) % QUICK_SUGGESTIONS.len(),
            None => 0,
        });
    }

    /// Highlight the previous quick suggestion
    pub fn previous_suggestion(&mut self) {
        self.selected_suggestion = Some(match self.selected_suggestion {
            Some(0) | None => QUICK_SUGGESTIONS.len() - 1,
            Some(i) => i - 1,
        });
    }

    /// Send the highlighted quick suggestion through `sink`
    pub fn send_suggestion(&mut self, sink: &dyn MessageSink) {
        let Some(index) = self.selected_suggestion else {
            return;
        };

        if self.conversation.send_message(QUICK_SUGGESTIONS[index], sink) {
            self.selected_suggestion = None;
            self.status_message = None;
        } else {
            self.status_message = Some("Please wait for the assistant to reply".to_string());
        }
    }

    /// React to an event from the bridge
    pub fn handle_bridge_event(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Opened => {
                self.connection = ConnectionState::Open;
                self.status_message = None;
            }
            BridgeEvent::Closed => {
                self.connection = ConnectionState::Closed;
                self.status_message = Some("Disconnected from the assistant".to_string());
            }
            BridgeEvent::Error(e) => {
                self.connection = ConnectionState::Closed;
                self.status_message = Some(format!("Connection error: {}", e));
            }
            BridgeEvent::Reply(_) | BridgeEvent::DecodeFailed(_) => {}
        }

        self.conversation.apply(event);
    }

    /// Recover after the bridge stream skipped `skipped` events
    ///
    /// A reply may have been among them, so an outstanding wait is resolved
    /// with the unreadable-reply notice instead of leaving the typing
    /// indicator up.
    pub fn handle_lagged(&mut self, skipped: u64) {
        warn!("Dropped {} bridge events", skipped);
        self.status_message = Some(format!("Missed {} updates from the assistant", skipped));
        if self.conversation.is_awaiting_reply() {
            self.conversation
                .handle_decode_failure(&format!("{} bridge events dropped", skipped));
        }
    }

    /// Apply a simulated status change
    pub fn set_online(&mut self, online: bool) {
        self.conversation.set_online(online);
    }

    /// Clear the conversation and the input
    pub fn clear_conversation(&mut self) {
        self.conversation.clear_conversation();
        self.input.clear();
        self.scroll_back = 0;
        self.status_message = Some("Conversation cleared".to_string());
    }

    /// Flip between light and dark theme
    pub fn toggle_theme(&mut self) {
        self.conversation.toggle_theme();
    }

    /// Write the conversation export and report where it went
    pub fn export_conversation(&mut self) -> Option<PathBuf> {
        match self.conversation.export_to_dir(&self.export_dir) {
            Ok(path) => {
                self.status_message = Some(format!("Exported to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                error!("Export failed: {}", e);
                self.status_message = Some(format!("Export failed: {}", e));
                None
            }
        }
    }

    /// Scroll message history up
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
        self.follow_at = None;
    }

    /// Scroll message history down
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Advance timers: schedule and perform the deferred jump to the newest message
    pub fn update(&mut self, now: Instant) {
        if self.appended.swap(false, Ordering::SeqCst) {
            self.follow_at = Some(now + self.scroll_delay);
        }

        if let Some(at) = self.follow_at {
            if now >= at {
                self.scroll_back = 0;
                self.follow_at = None;
            }
        }
    }

    /// Advance the animation counter
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent, sink: &dyn MessageSink) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('l') if ctrl => self.clear_conversation(),
            KeyCode::Char('t') if ctrl => self.toggle_theme(),
            KeyCode::Char('e') if ctrl => {
                self.export_conversation();
            }
            KeyCode::Char('s') if ctrl => self.send_suggestion(sink),
            KeyCode::Tab => self.next_suggestion(),
            KeyCode::BackTab => self.previous_suggestion(),
            KeyCode::Enter => self.submit_input(sink),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            KeyCode::Char(c) if !ctrl => self.add_char(c),
            _ => {}
        }
    }

    /// Request shutdown
    pub fn quit(&mut self) {
        info!("Quit requested");
        self.should_quit = true;
    }
}
