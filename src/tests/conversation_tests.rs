use super::helpers::{seeded_conversation, RecordingSink};
use crate::conversation::export::{file_name, snapshot, write_to_dir, ExportEntry};
use crate::conversation::message::generate_id;
use crate::conversation::*;
use crate::transport::BridgeEvent;
use chrono::{SubsecRound, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// Message tests

#[test]
fn test_generate_id_shape() {
    let mut rng = StdRng::seed_from_u64(42);
    let id = generate_id(&mut rng);
    assert_eq!(id.len(), 9);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}

#[test]
fn test_generate_id_varies() {
    let mut rng = StdRng::seed_from_u64(42);
    let ids: Vec<String> = (0..50).map(|_| generate_id(&mut rng)).collect();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_message_constructors() {
    let mut rng = StdRng::seed_from_u64(3);

    let user = ChatMessage::user(&mut rng, "Hello");
    assert_eq!(user.author, Author::User);
    assert!(user.is_from_user());
    assert!(!user.is_pending);

    let reply = ChatMessage::assistant(&mut rng, "Hi!");
    assert_eq!(reply.author, Author::Assistant);
    assert!(!reply.is_pending);

    let pending = ChatMessage::pending(&mut rng);
    assert_eq!(pending.author, Author::Assistant);
    assert!(pending.is_pending);
    assert!(pending.content.is_empty());
}

#[test]
fn test_author_labels() {
    assert_eq!(Author::User.label(), "User");
    assert_eq!(Author::Assistant.label(), "AI Assistant");
}

// Controller tests

#[test]
fn test_new_conversation_starts_with_welcome() {
    let conversation = seeded_conversation(1);

    assert_eq!(conversation.messages().len(), 1);
    let welcome = &conversation.messages()[0];
    assert_eq!(welcome.author, Author::Assistant);
    assert!(WELCOME_MESSAGES.contains(&welcome.content.as_str()));
    assert!(!conversation.is_awaiting_reply());
    assert!(conversation.is_online());
    assert!(!conversation.is_dark_theme());
    assert_eq!(conversation.message_count(), 0);
}

#[test]
fn test_welcome_selection_covers_all_greetings() {
    let mut seen = std::collections::HashSet::new();
    for seed in 0..200 {
        let conversation = seeded_conversation(seed);
        seen.insert(conversation.messages()[0].content.clone());
    }
    assert_eq!(seen.len(), WELCOME_MESSAGES.len());
}

#[test]
fn test_send_appends_user_message_and_placeholder() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();

    assert!(conversation.send_message("Hello", &sink));

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].content, "Hello");
    assert_eq!(messages[1].author, Author::User);
    assert!(messages[2].is_pending);
    assert!(conversation.is_awaiting_reply());
    assert_eq!(sink.sent(), vec!["Hello".to_string()]);
}

#[test]
fn test_send_trims_input() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();

    assert!(conversation.send_message("  Do you allow pets?\n", &sink));

    assert_eq!(conversation.messages()[1].content, "Do you allow pets?");
    assert_eq!(sink.sent(), vec!["Do you allow pets?".to_string()]);
}

#[test]
fn test_send_empty_is_rejected() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();

    assert!(!conversation.send_message("", &sink));
    assert!(!conversation.send_message("   \t\n", &sink));

    assert_eq!(conversation.messages().len(), 1);
    assert!(!conversation.is_awaiting_reply());
    assert!(sink.sent().is_empty());
}

#[test]
fn test_send_while_awaiting_is_rejected() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();

    assert!(conversation.send_message("First", &sink));
    assert!(!conversation.send_message("Second", &sink));
    assert!(!conversation.send_message("Third", &sink));

    assert_eq!(conversation.messages().len(), 3);
    assert_eq!(conversation.messages().iter().filter(|m| m.is_pending).count(), 1);
    assert!(conversation.is_awaiting_reply());
    assert_eq!(sink.sent(), vec!["First".to_string()]);
}

#[test]
fn test_send_over_closed_channel_still_awaits() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::closed();

    assert!(conversation.send_message("Hello", &sink));
    assert!(conversation.is_awaiting_reply());
    assert!(conversation.pending_message().is_some());
}

#[test]
fn test_reply_resolves_placeholder() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();
    let welcome = conversation.messages()[0].content.clone();

    conversation.send_message("Hello", &sink);
    conversation.receive_reply("Hi! How can I help?");

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content, welcome);
    assert_eq!(messages[1].content, "Hello");
    assert_eq!(messages[1].author, Author::User);
    assert_eq!(messages[2].content, "Hi! How can I help?");
    assert_eq!(messages[2].author, Author::Assistant);
    assert!(!messages[2].is_pending);
    assert!(conversation.pending_message().is_none());
    assert!(!conversation.is_awaiting_reply());
    assert_eq!(conversation.message_count(), 2);
}

#[test]
fn test_send_allowed_again_after_reply() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();

    conversation.send_message("One", &sink);
    conversation.receive_reply("Reply one");
    assert!(conversation.send_message("Two", &sink));

    assert_eq!(conversation.messages().len(), 5);
    assert_eq!(sink.sent(), vec!["One".to_string(), "Two".to_string()]);
}

#[test]
fn test_reply_while_idle_is_appended() {
    let mut conversation = seeded_conversation(1);

    conversation.receive_reply("Unprompted notice");

    assert_eq!(conversation.messages().len(), 2);
    assert_eq!(conversation.messages()[1].content, "Unprompted notice");
    assert!(!conversation.is_awaiting_reply());
}

#[test]
fn test_decode_failure_clears_typing_indicator() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();

    conversation.send_message("Hello", &sink);
    conversation.handle_decode_failure("Invalid envelope");

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].content, UNREADABLE_REPLY_NOTICE);
    assert!(conversation.pending_message().is_none());
    assert!(!conversation.is_awaiting_reply());
}

#[test]
fn test_apply_bridge_events() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();
    conversation.send_message("Hello", &sink);

    assert!(!conversation.apply(&BridgeEvent::Opened));
    assert!(!conversation.apply(&BridgeEvent::Error("reset".to_string())));
    assert!(!conversation.apply(&BridgeEvent::Closed));
    assert!(conversation.is_awaiting_reply());

    assert!(conversation.apply(&BridgeEvent::Reply("Hi".to_string())));
    assert!(!conversation.is_awaiting_reply());

    conversation.send_message("Again", &sink);
    assert!(conversation.apply(&BridgeEvent::DecodeFailed("bad".to_string())));
    assert!(!conversation.is_awaiting_reply());
}

#[test]
fn test_clear_conversation_leaves_single_welcome() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();

    conversation.send_message("One", &sink);
    conversation.receive_reply("Reply");
    conversation.send_message("Two", &sink);
    conversation.clear_conversation();

    assert_eq!(conversation.messages().len(), 1);
    assert!(WELCOME_MESSAGES.contains(&conversation.messages()[0].content.as_str()));
    assert!(!conversation.is_awaiting_reply());
    assert!(conversation.pending_message().is_none());
}

#[test]
fn test_toggle_theme() {
    let mut conversation = seeded_conversation(1);
    let before = conversation.messages().to_vec();

    assert!(conversation.toggle_theme());
    assert!(conversation.is_dark_theme());
    assert!(!conversation.toggle_theme());
    assert!(!conversation.is_dark_theme());

    assert_eq!(conversation.messages(), before.as_slice());
}

#[test]
fn test_set_online() {
    let mut conversation = seeded_conversation(1);
    conversation.set_online(false);
    assert!(!conversation.is_online());
    conversation.set_online(true);
    assert!(conversation.is_online());
}

#[test]
fn test_listeners_receive_events() {
    let mut conversation = seeded_conversation(1);
    let events = Arc::new(Mutex::new(Vec::new()));
    let recorded = events.clone();
    conversation.subscribe(move |event| {
        recorded.lock().expect("lock poisoned").push(*event);
    });

    let sink = RecordingSink::open();
    conversation.send_message("Hello", &sink);
    conversation.receive_reply("Hi");
    conversation.toggle_theme();
    conversation.set_online(false);
    conversation.set_online(false);

    let events = events.lock().expect("lock poisoned").clone();
    assert_eq!(
        events,
        vec![
            ConversationEvent::MessagesChanged,
            ConversationEvent::TypingChanged(true),
            ConversationEvent::MessagesChanged,
            ConversationEvent::TypingChanged(false),
            ConversationEvent::ThemeChanged(true),
            ConversationEvent::OnlineChanged(false),
        ]
    );
}

#[test]
fn test_rejected_send_notifies_nobody() {
    let mut conversation = seeded_conversation(1);
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    conversation.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let sink = RecordingSink::open();
    conversation.send_message("   ", &sink);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

// Export tests

#[test]
fn test_export_matches_messages() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();
    conversation.send_message("Hello", &sink);
    conversation.receive_reply("Hi there");

    let entries = conversation.export_entries();
    assert_eq!(entries.len(), conversation.messages().len());

    for (entry, msg) in entries.iter().zip(conversation.messages()) {
        assert_eq!(entry.sender == "User", msg.author == Author::User);
        assert_eq!(entry.message, msg.content);
    }
    assert_eq!(entries[0].sender, "AI Assistant");
    assert_eq!(entries[1].sender, "User");
}

#[test]
fn test_export_includes_pending_placeholder() {
    let mut conversation = seeded_conversation(1);
    let sink = RecordingSink::open();
    conversation.send_message("Hello", &sink);

    let entries = conversation.export_entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].message, "");
}

#[test]
fn test_export_json_is_indented_array() {
    let conversation = seeded_conversation(1);
    let json = conversation.export_conversation().expect("Failed to export");

    assert!(json.starts_with("[\n  {"));
    let parsed: Vec<ExportEntry> = serde_json::from_str(&json).expect("Export should parse");
    assert_eq!(parsed, conversation.export_entries());
}

#[test]
fn test_export_timestamp_is_iso8601() {
    let conversation = seeded_conversation(1);
    let entries = snapshot(conversation.messages());

    let parsed = chrono::DateTime::parse_from_rfc3339(&entries[0].timestamp)
        .expect("Timestamp should be RFC 3339");
    assert_eq!(
        parsed.with_timezone(&Utc),
        conversation.messages()[0].created_at.trunc_subsecs(3)
    );
    assert!(entries[0].timestamp.ends_with('Z'));
}

#[test]
fn test_export_file_name() {
    let now = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 0).unwrap();
    assert_eq!(file_name(now), "chat-export-2026-03-09.json");
}

#[test]
fn test_export_writes_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let conversation = seeded_conversation(1);

    let path = conversation
        .export_to_dir(temp_dir.path())
        .expect("Failed to export");

    assert_eq!(path.parent(), Some(temp_dir.path()));
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(file_name(Utc::now()).as_str()));

    let written = std::fs::read_to_string(&path).expect("Failed to read export");
    assert_eq!(written, conversation.export_conversation().expect("Failed to export"));
}

#[test]
fn test_write_to_dir_creates_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let nested = temp_dir.path().join("exports").join("today");
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

    let path = write_to_dir(&nested, "[]", now).expect("Failed to write");
    assert_eq!(path, nested.join("chat-export-2026-01-02.json"));
    assert!(path.exists());
}

#[test]
fn test_export_is_pure() {
    let conversation = seeded_conversation(1);
    let before = conversation.messages().to_vec();
    let _ = conversation.export_conversation();
    assert_eq!(conversation.messages(), before.as_slice());
}
