//! Tests for context snapshots

use super::*;
use chrono::TimeZone;
use serde_json::json;

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
}

#[test]
fn test_builder_populates_known_fields() {
    let snapshot = ContextSnapshot::new()
        .with_timestamp(fixed_time())
        .with_active_window("main.rs - editor", "Code", Some("file:///main.rs"))
        .with_clipboard("let x = 1;")
        .with_speech("what does this do", fixed_time());

    assert_eq!(snapshot.timestamp(), Some("2024-03-01T12:30:00.000Z"));
    assert_eq!(
        snapshot.active_window(),
        Some(ActiveWindow {
            title: "main.rs - editor",
            app: "Code",
            url: Some("file:///main.rs"),
        })
    );
    assert_eq!(snapshot.clipboard_content(), Some("let x = 1;"));
    assert_eq!(snapshot.speech_text(), Some("what does this do"));
}

#[test]
fn test_unknown_fields_are_preserved() {
    let snapshot = ContextSnapshot::new()
        .with_field("screen", json!({"width": 1920, "height": 1080}))
        .with_clipboard("x");

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("screen"), Some(&json!({"width": 1920, "height": 1080})));
}

#[test]
fn test_missing_fields_read_as_none() {
    let snapshot = ContextSnapshot::new();

    assert!(snapshot.is_empty());
    assert!(snapshot.timestamp().is_none());
    assert!(snapshot.active_window().is_none());
    assert!(snapshot.clipboard_content().is_none());
    assert!(snapshot.speech_text().is_none());
}

#[test]
fn test_wrongly_typed_fields_read_as_none() {
    let snapshot = ContextSnapshot::from_value(json!({
        "active_window": "not an object",
        "clipboard_content": 42,
        "audio": {"text": ["nope"]},
    }))
    .unwrap();

    assert!(snapshot.active_window().is_none());
    assert!(snapshot.clipboard_content().is_none());
    assert!(snapshot.speech_text().is_none());
}

#[test]
fn test_partial_window_defaults_to_empty_strings() {
    let snapshot = ContextSnapshot::from_value(json!({
        "active_window": {"title": "Inbox", "url": ""},
    }))
    .unwrap();

    let window = snapshot.active_window().unwrap();
    assert_eq!(window.title, "Inbox");
    assert_eq!(window.app, "");
    assert!(window.url.is_none(), "Blank URL should read as absent");
}

#[test]
fn test_empty_clipboard_reads_as_none() {
    let snapshot = ContextSnapshot::new().with_clipboard("");
    assert!(snapshot.clipboard_content().is_none());
}

#[test]
fn test_from_value_rejects_non_objects() {
    assert!(ContextSnapshot::from_value(json!([1, 2, 3])).is_none());
    assert!(ContextSnapshot::from_value(json!("text")).is_none());
    assert!(ContextSnapshot::from_value(json!({})).is_some());
}

#[test]
fn test_serializes_as_plain_object() {
    let snapshot = ContextSnapshot::new().with_clipboard("hello");
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value, json!({"clipboard_content": "hello"}));

    let back: ContextSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(back, snapshot);
}
