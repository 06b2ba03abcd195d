//! Event bridge between the engine's callback threads and user handlers.
//!
//! The handler is invoked synchronously on whichever thread the engine uses
//! to deliver the event. There is no queue in between: a slow handler stalls
//! native event delivery for as long as it runs, so handlers should return
//! quickly and move heavy work onto their own threads.

mod slots;

pub use slots::BridgeSlot;

use serde_json::Value;
use std::fmt;

/// An engine event after best-effort decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The payload parsed as a JSON document.
    Structured(Value),
    /// The payload as text, when it could not be parsed.
    Raw(String),
}

impl Event {
    /// The top-level `"type"` field of a structured event.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Event::Structured(value) => value.get("type").and_then(Value::as_str),
            Event::Raw(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Event::Structured(value) => Some(value),
            Event::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Event::Raw(_))
    }

    /// Text form of the payload, re-serializing structured values.
    pub fn to_text(&self) -> String {
        match self {
            Event::Structured(value) => value.to_string(),
            Event::Raw(text) => text.clone(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Capability injected at client construction.
///
/// Registration is fixed for the lifetime of the client; build a new client
/// to change handlers.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: Event);

    fn on_disconnect(&self) {}
}

/// Installed when the caller does not supply a handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl EventHandler for NoopHandler {
    fn on_event(&self, _event: Event) {}
}

/// Adapts a closure into an [`EventHandler`] that ignores disconnects.
pub struct FnHandler<F>(pub F);

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(Event) + Send + Sync,
{
    fn on_event(&self, event: Event) {
        (self.0)(event)
    }
}
