//! Purpose: Cross-module contract coverage for the line-JSON accessor.
//! Exports: Integration tests only.
//! Role: Verify the accessor, reporter seam, and event schema work together.
//! Invariants: Tests never install a process-wide tracing subscriber.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use jotfile::{FailureEvent, LineJsonFile, Mode, Reporter, failure_event_json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    id: u64,
    label: String,
    tags: Vec<String>,
}

#[derive(Clone, Default)]
struct RecordingReporter {
    events: Rc<RefCell<Vec<FailureEvent>>>,
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &FailureEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[test]
fn typed_round_trip_recovers_written_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("entries.jsonl");
    fs::write(&path, b"").expect("seed");

    let entries = vec![
        Entry {
            id: 1,
            label: "first".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        },
        Entry {
            id: 2,
            label: "second".to_string(),
            tags: Vec::new(),
        },
    ];

    let mut accessor = LineJsonFile::new();
    assert!(accessor.open(&path, Mode::Write));
    for entry in &entries {
        let line = serde_json::to_string(entry).expect("encode");
        assert!(accessor.write_line(&format!("{line}\n")));
    }
    assert!(accessor.close());

    assert!(accessor.open(&path, Mode::Read));
    let records = accessor.read_all().expect("records");
    let decoded: Vec<Entry> = records
        .into_iter()
        .map(|record| serde_json::from_value(record).expect("decode"))
        .collect();
    assert_eq!(decoded, entries);
}

#[test]
fn read_write_mode_preserves_content_and_appends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("entries.jsonl");
    fs::write(&path, b"{\"a\":1}\n").expect("seed");

    let mut accessor = LineJsonFile::new();
    assert!(accessor.open(&path, Mode::ReadWrite));
    let records = accessor.read_all().expect("records");
    assert_eq!(records.len(), 1);
    assert!(accessor.write_line("{\"b\":2}\n"));
    assert!(accessor.close());

    assert!(accessor.open(&path, Mode::Read));
    let records = accessor.read_all().expect("records");
    assert_eq!(
        records,
        vec![
            serde_json::json!({"a": 1}),
            serde_json::json!({"b": 2}),
        ]
    );
}

#[test]
fn non_utf8_lines_do_not_abort_the_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mixed.jsonl");
    let mut contents = b"{\"a\":1}\n".to_vec();
    contents.extend_from_slice(&[0xff, 0xfe, b'\n']);
    contents.extend_from_slice(b"{\"b\":2}\n");
    fs::write(&path, &contents).expect("seed");

    let mut accessor = LineJsonFile::new();
    assert!(accessor.open(&path, Mode::Read));
    let records = accessor.read_all().expect("records");
    assert_eq!(
        records,
        vec![
            serde_json::json!({"a": 1}),
            Value::Null,
            serde_json::json!({"b": 2}),
        ]
    );
}

#[cfg(unix)]
#[test]
fn substituted_reporter_receives_schema_stable_events() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("not-a-file");
    fs::create_dir(&path).expect("mkdir");

    let reporter = RecordingReporter::default();
    let events = Rc::clone(&reporter.events);
    let mut accessor = LineJsonFile::with_reporter(Box::new(reporter));

    assert!(accessor.open(&path, Mode::Read));
    assert_eq!(accessor.read_all(), None);

    let events = events.borrow();
    assert_eq!(events.len(), 1);

    let value = failure_event_json(&events[0]);
    let obj = value
        .get("failure")
        .and_then(Value::as_object)
        .expect("failure envelope");
    for key in ["kind", "time", "method", "message", "error", "details"] {
        assert!(obj.contains_key(key), "missing key {key}");
    }
    assert_eq!(
        obj.get("method").and_then(Value::as_str),
        Some("read_all")
    );
    assert_eq!(
        obj.get("kind").and_then(Value::as_str),
        Some("read-failure")
    );
}
