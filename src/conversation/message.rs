//! Chat message structures

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of a generated message id
const ID_LEN: usize = 9;

/// Alphabet used for message ids (lowercase base 36)
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    /// The person using the client
    User,
    /// The virtual assistant
    Assistant,
}

impl Author {
    /// Label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "AI Assistant",
        }
    }
}

/// One entry in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Client-generated id, unique on a best-effort basis
    pub id: String,
    /// Message text
    pub content: String,
    /// Author of the message
    pub author: Author,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Placeholder shown while a reply is awaited
    pub is_pending: bool,
}

impl ChatMessage {
    /// Create a message written by the user
    pub fn user<R: Rng + ?Sized>(rng: &mut R, content: impl Into<String>) -> Self {
        Self::new(rng, content.into(), Author::User, false)
    }

    /// Create a message written by the assistant
    pub fn assistant<R: Rng + ?Sized>(rng: &mut R, content: impl Into<String>) -> Self {
        Self::new(rng, content.into(), Author::Assistant, false)
    }

    /// Create the empty placeholder shown while the assistant composes a reply
    pub fn pending<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng, String::new(), Author::Assistant, true)
    }

    fn new<R: Rng + ?Sized>(rng: &mut R, content: String, author: Author, is_pending: bool) -> Self {
        Self {
            id: generate_id(rng),
            content,
            author,
            created_at: Utc::now(),
            is_pending,
        }
    }

    /// Whether the user wrote this message
    pub fn is_from_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Generate a short random base-36 id
///
/// Collisions are possible, just unlikely within one session.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
