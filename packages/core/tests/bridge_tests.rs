//! Event delivery through the real trampolines
//!
//! This test suite covers:
//! - Structured vs raw decoding of engine payloads
//! - Arrival order, including delivery from an engine-owned thread
//! - Default no-op handler
//! - Containment of handler panics
//! - Disconnect notification reaching the user handler
//! - Isolation of a dropped client's late callbacks

mod common;

use common::FakeEngine;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use whatsfly_core::{Client, ClientConfiguration, Event, EventHandler, FnHandler};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
    disconnects: AtomicUsize,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventHandler for Recorder {
    fn on_event(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn on_disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

fn client_with(engine: &Arc<FakeEngine>, recorder: &Arc<Recorder>) -> Client {
    Client::new(
        engine.clone(),
        ClientConfiguration::new(),
        Some(recorder.clone() as Arc<dyn EventHandler>),
    )
    .unwrap()
}

/// JSON payloads arrive structured, anything else arrives raw
#[test]
fn test_structured_and_raw_payloads() {
    let engine = FakeEngine::new();
    let recorder = Arc::new(Recorder::default());
    let client = client_with(&engine, &recorder);
    let id = client.handle().id();

    engine.fire_event(id, br#"{"type":"message","from":"123"}"#);
    engine.fire_event(id, b"pairing code: 1234-5678");
    engine.fire_event(id, &[0xc3, 0x28]);
    engine.fire_null_event(id);

    let events = recorder.events();
    assert_eq!(events.len(), 4, "no event may be dropped");
    assert_eq!(events[0], Event::Structured(json!({"type": "message", "from": "123"})));
    assert_eq!(events[0].kind(), Some("message"));
    assert_eq!(events[1], Event::Raw("pairing code: 1234-5678".into()));
    assert!(events[2].is_raw());
    assert_eq!(events[3], Event::Raw(String::new()));
}

/// Events from an engine thread reach the handler in arrival order
#[test]
fn test_order_preserved_from_engine_thread() {
    let engine = FakeEngine::new();
    let recorder = Arc::new(Recorder::default());
    let client = client_with(&engine, &recorder);
    let id = client.handle().id();

    let pusher = {
        let engine = engine.clone();
        std::thread::spawn(move || {
            for n in 0..100 {
                engine.fire_event(id, format!(r#"{{"type":"tick","n":{n}}}"#).as_bytes());
            }
        })
    };
    pusher.join().unwrap();

    let seen: Vec<u64> = recorder
        .events()
        .iter()
        .map(|e| e.as_structured().unwrap()["n"].as_u64().unwrap())
        .collect();
    assert_eq!(seen, (0..100).collect::<Vec<u64>>());
}

/// Without a handler, events are silently discarded
#[test]
fn test_missing_handler_discards_events() {
    let engine = FakeEngine::new();
    let client = Client::new(engine.clone(), ClientConfiguration::new(), None).unwrap();
    let id = client.handle().id();

    engine.fire_event(id, br#"{"type":"message"}"#);
    engine.fire_disconnect(id);
}

/// A panicking handler does not take the bridge down
#[test]
fn test_handler_panic_is_contained() {
    let engine = FakeEngine::new();
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = delivered.clone();
    let handler = FnHandler(move |event: Event| {
        counter.fetch_add(1, Ordering::SeqCst);
        if event.kind() == Some("boom") {
            panic!("handler failure");
        }
    });
    let client = Client::new(
        engine.clone(),
        ClientConfiguration::new(),
        Some(Arc::new(handler) as Arc<dyn EventHandler>),
    )
    .unwrap();
    let id = client.handle().id();

    engine.fire_event(id, br#"{"type":"boom"}"#);
    engine.fire_event(id, br#"{"type":"after"}"#);

    assert_eq!(delivered.load(Ordering::SeqCst), 2);
}

/// Engine-initiated disconnects reach the user handler
#[test]
fn test_disconnect_reaches_handler() {
    let engine = FakeEngine::new();
    let recorder = Arc::new(Recorder::default());
    let client = client_with(&engine, &recorder);
    let id = client.handle().id();

    client.connect().unwrap();
    engine.fire_disconnect(id);

    assert_eq!(recorder.disconnects.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.connection_state(),
        whatsfly_core::ConnectionState::Disconnected
    );
}

/// Each client gets its own events even when several are alive
#[test]
fn test_events_are_routed_per_client() {
    let engine = FakeEngine::new();
    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());
    let a = client_with(&engine, &first);
    let b = client_with(&engine, &second);

    engine.fire_event(a.handle().id(), b"for a");
    engine.fire_event(b.handle().id(), b"for b");
    engine.fire_event(b.handle().id(), b"also for b");

    assert_eq!(first.events(), vec![Event::Raw("for a".into())]);
    assert_eq!(
        second.events(),
        vec![Event::Raw("for b".into()), Event::Raw("also for b".into())]
    );
}

/// Late callbacks for a dropped client never reach the client created after it
#[test]
fn test_late_callbacks_do_not_leak_into_next_client() {
    let engine = FakeEngine::new();
    let stale = Arc::new(Recorder::default());
    let a = client_with(&engine, &stale);
    let a_id = a.handle().id();
    drop(a);

    let fresh = Arc::new(Recorder::default());
    let b = client_with(&engine, &fresh);
    b.connect().unwrap();

    engine.fire_event(a_id, b"late event for a");
    engine.fire_disconnect(a_id);

    assert!(fresh.events().is_empty());
    assert_eq!(fresh.disconnects.load(Ordering::SeqCst), 0);
    assert_eq!(
        b.connection_state(),
        whatsfly_core::ConnectionState::Connected
    );
    assert!(stale.events().is_empty());
}
