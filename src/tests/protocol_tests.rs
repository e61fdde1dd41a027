use crate::protocol::*;
use crate::Error;

#[test]
fn test_encode_wraps_text_in_envelope() {
    let frame = encode("What time is check-in?").expect("Failed to encode");
    assert_eq!(frame, r#"{"message":"What time is check-in?"}"#);
}

#[test]
fn test_encode_escapes_json_characters() {
    let frame = encode("say \"hi\"\nnow").expect("Failed to encode");
    let value: serde_json::Value = serde_json::from_str(&frame).expect("Frame should be JSON");
    assert_eq!(value["message"], "say \"hi\"\nnow");
    assert_eq!(value.as_object().map(|o| o.len()), Some(1));
}

#[test]
fn test_decode_extracts_message() {
    let text = decode(r#"{"message":"Check-in is at 4 PM."}"#).expect("Failed to decode");
    assert_eq!(text, "Check-in is at 4 PM.");
}

#[test]
fn test_decode_ignores_extra_fields() {
    let text = decode(r#"{"message":"ok","id":3}"#).expect("Failed to decode");
    assert_eq!(text, "ok");
}

#[test]
fn test_decode_rejects_invalid_json() {
    let result = decode("not json");
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[test]
fn test_decode_rejects_missing_message_field() {
    let result = decode(r#"{"reply":"hello"}"#);
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[test]
fn test_decode_rejects_non_string_message() {
    let result = decode(r#"{"message":42}"#);
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[test]
fn test_default_endpoint() {
    assert_eq!(DEFAULT_ENDPOINT, "ws://127.0.0.1:8765");
}

#[test]
fn test_unicode_survives_envelope() {
    let original = "Welcome 🌊 – Fallsview";
    let frame = Envelope::new(original).to_json().expect("Failed to encode");
    let decoded = Envelope::from_json(&frame).expect("Failed to decode");
    assert_eq!(decoded.message, original);
}
