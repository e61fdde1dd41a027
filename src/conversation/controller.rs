//! Conversation state and the reply state machine

use crate::conversation::export::{self, ExportEntry};
use crate::conversation::message::ChatMessage;
use crate::transport::{BridgeEvent, MessageSink};
use crate::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Greetings, one of which opens every conversation
pub const WELCOME_MESSAGES: [&str; 3] = [
    "Welcome to Embassy Suites Niagara Falls – Fallsview! 🌊 I'm your virtual assistant, here to help you with hotel amenities, booking policies, dining options, and anything else you need during your stay.",
    "Hi there! 👋 Looking for details about check-in times, breakfast, parking, or nearby attractions? I'm your Embassy Suites chatbot – here to make your visit smooth and enjoyable!",
    "Greetings from Embassy Suites Niagara Falls! 🏨 Whether you’re planning your stay, exploring our dining services, or have questions about our suites, I'm here to help you every step of the way.",
];

/// Canned questions offered next to the input box
pub const QUICK_SUGGESTIONS: [&str; 6] = [
    "How can you help me?",
    "What time is check-in?",
    "Can I cancel my reservation for free?",
    "Do you allow pets?",
    "Is parking available?",
    "How much is the security deposit?",
];

/// Assistant notice appended when a reply could not be decoded
pub const UNREADABLE_REPLY_NOTICE: &str =
    "Sorry, I couldn't read the assistant's reply. Please try asking again.";

/// Change notification delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEvent {
    /// The message list changed
    MessagesChanged,
    /// The typing indicator changed
    TypingChanged(bool),
    /// The simulated online flag changed
    OnlineChanged(bool),
    /// The theme flag changed
    ThemeChanged(bool),
}

/// Callback invoked after every state change
pub type Listener = Box<dyn Fn(&ConversationEvent) + Send>;

/// Conversation state container
///
/// Holds the ordered message list, the awaiting-reply flag (which doubles as
/// the typing indicator), the simulated online flag and the theme flag. At
/// most one pending placeholder exists, and only while awaiting a reply.
pub struct Conversation {
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
    online: bool,
    dark_theme: bool,
    rng: StdRng,
    listeners: Vec<Listener>,
}

impl Conversation {
    /// Start a conversation with a random welcome message
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Start a conversation drawing ids and greetings from `rng`
    pub fn with_rng(rng: StdRng) -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            awaiting_reply: false,
            online: true,
            dark_theme: false,
            rng,
            listeners: Vec::new(),
        };
        conversation.add_welcome_message();
        conversation
    }

    /// Register a listener for state changes
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&ConversationEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&self, event: ConversationEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    fn set_awaiting_reply(&mut self, awaiting: bool) {
        if self.awaiting_reply != awaiting {
            self.awaiting_reply = awaiting;
            self.notify(ConversationEvent::TypingChanged(awaiting));
        }
    }

    /// Append one greeting chosen uniformly at random
    pub fn add_welcome_message(&mut self) {
        let index = self.rng.gen_range(0..WELCOME_MESSAGES.len());
        let welcome = ChatMessage::assistant(&mut self.rng, WELCOME_MESSAGES[index]);
        self.messages.push(welcome);
        self.notify(ConversationEvent::MessagesChanged);
    }

    /// Send user text through `sink`
    ///
    /// Rejected without side effects when the trimmed text is empty or a reply
    /// is already awaited. Otherwise appends the user's message and a pending
    /// placeholder, enters the awaiting-reply state and hands the text to the
    /// sink. Returns whether the text was accepted.
    pub fn send_message(&mut self, text: &str, sink: &dyn MessageSink) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if self.awaiting_reply {
            debug!("Ignoring send while awaiting a reply");
            return false;
        }

        let user_message = ChatMessage::user(&mut self.rng, text);
        let placeholder = ChatMessage::pending(&mut self.rng);
        self.messages.push(user_message);
        self.messages.push(placeholder);
        self.notify(ConversationEvent::MessagesChanged);
        self.set_awaiting_reply(true);

        if !sink.send_message(text) {
            warn!("Message was not transmitted; still awaiting a reply");
        }
        true
    }

    /// Resolve the awaited reply with `text`
    ///
    /// Removes the pending placeholder and appends the assistant's reply. A
    /// reply that arrives while idle is appended as-is.
    pub fn receive_reply(&mut self, text: impl Into<String>) {
        self.remove_pending();
        let reply = ChatMessage::assistant(&mut self.rng, text);
        self.messages.push(reply);
        self.notify(ConversationEvent::MessagesChanged);
        self.set_awaiting_reply(false);
    }

    /// Resolve the awaited reply after an undecodable inbound frame
    ///
    /// Clears the placeholder and appends a notice instead of leaving the
    /// typing indicator stuck.
    pub fn handle_decode_failure(&mut self, reason: &str) {
        warn!("Reply could not be decoded: {}", reason);
        self.remove_pending();
        let notice = ChatMessage::assistant(&mut self.rng, UNREADABLE_REPLY_NOTICE);
        self.messages.push(notice);
        self.notify(ConversationEvent::MessagesChanged);
        self.set_awaiting_reply(false);
    }

    /// Apply an inbound bridge event. Returns whether the conversation changed.
    pub fn apply(&mut self, event: &BridgeEvent) -> bool {
        match event {
            BridgeEvent::Reply(text) => {
                self.receive_reply(text.as_str());
                true
            }
            BridgeEvent::DecodeFailed(reason) => {
                self.handle_decode_failure(reason);
                true
            }
            BridgeEvent::Opened | BridgeEvent::Error(_) | BridgeEvent::Closed => false,
        }
    }

    fn remove_pending(&mut self) {
        self.messages.retain(|m| !m.is_pending);
    }

    /// Discard every message and start over with a fresh greeting
    pub fn clear_conversation(&mut self) {
        info!("Clearing conversation ({} messages)", self.messages.len());
        self.messages.clear();
        self.set_awaiting_reply(false);
        self.add_welcome_message();
    }

    /// Flip the theme flag and return the new value
    pub fn toggle_theme(&mut self) -> bool {
        self.dark_theme = !self.dark_theme;
        self.notify(ConversationEvent::ThemeChanged(self.dark_theme));
        self.dark_theme
    }

    /// Set the theme flag without notifying
    pub fn set_dark_theme(&mut self, dark: bool) {
        self.dark_theme = dark;
    }

    /// Set the simulated online flag
    pub fn set_online(&mut self, online: bool) {
        if self.online != online {
            self.online = online;
            self.notify(ConversationEvent::OnlineChanged(online));
        }
    }

    /// Export snapshot of the current messages
    pub fn export_entries(&self) -> Vec<ExportEntry> {
        export::snapshot(&self.messages)
    }

    /// Export snapshot rendered as indented JSON
    pub fn export_conversation(&self) -> Result<String> {
        export::to_json(&self.export_entries())
    }

    /// Write the export snapshot into `dir` and return the file path
    pub fn export_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let json = self.export_conversation()?;
        export::write_to_dir(dir, &json, Utc::now())
    }

    /// Messages in display order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages after the opening greeting
    pub fn message_count(&self) -> usize {
        self.messages.len().saturating_sub(1)
    }

    /// The pending placeholder, if any
    pub fn pending_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_pending)
    }

    /// Whether a reply is awaited (the typing indicator)
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Simulated online flag
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Theme flag
    pub fn is_dark_theme(&self) -> bool {
        self.dark_theme
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
