//! Conversation module
//!
//! This module holds the client-side conversation:
//! - `message` - Chat message structure and id generation
//! - `controller` - State container, reply state machine and listeners
//! - `export` - JSON export snapshot and file naming

pub mod controller;
pub mod export;
pub mod message;

// Re-export commonly used types
pub use controller::{
    Conversation, ConversationEvent, Listener, QUICK_SUGGESTIONS, UNREADABLE_REPLY_NOTICE,
    WELCOME_MESSAGES,
};
pub use export::ExportEntry;
pub use message::{Author, ChatMessage};
