// Маршалинг аргументов через нативную границу

use crate::bridge::Event;
use crate::config::Config;
use crate::error::{Result, WhatsflyError};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;

/// Encode a string as a NUL-terminated buffer.
///
/// The bytes are passed through untouched; a string that already contains a
/// NUL cannot be represented and is rejected rather than truncated.
pub fn encode_text(field: &'static str, value: &str) -> Result<CString> {
    CString::new(value).map_err(|e| WhatsflyError::InvalidArgument {
        field,
        reason: format!("contains a NUL byte at offset {}", e.nul_position()),
    })
}

pub fn encode_path(field: &'static str, path: &Path) -> Result<CString> {
    let text = path.to_str().ok_or_else(|| WhatsflyError::InvalidArgument {
        field,
        reason: format!("path {} is not valid UTF-8", path.display()),
    })?;
    encode_text(field, text)
}

pub fn encode_flag(flag: bool) -> u8 {
    u8::from(flag)
}

/// `true` iff the engine returned the configured success sentinel.
pub fn decode_outcome(code: c_int) -> bool {
    code == Config::global().send_success_code
}

/// Decode a serialized event, never failing.
///
/// Valid UTF-8 that parses as JSON becomes [`Event::Structured`]; anything
/// else is delivered as [`Event::Raw`] (lossily decoded if needed).
pub fn decode_event(bytes: &[u8]) -> Event {
    match std::str::from_utf8(bytes) {
        Ok(text) => match serde_json::from_str(text) {
            Ok(value) => Event::Structured(value),
            Err(e) => {
                tracing::warn!("Event payload is not JSON, passing raw text through: {}", e);
                Event::Raw(text.to_owned())
            }
        },
        Err(e) => {
            tracing::warn!("Event payload is not valid UTF-8 ({}), decoding lossily", e);
            Event::Raw(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Decode an event straight from the pointer handed to `on_event`.
///
/// # Safety
///
/// `payload` must be NULL or point to a NUL-terminated buffer that stays
/// valid for the duration of the call.
pub unsafe fn decode_event_ptr(payload: *const c_char) -> Event {
    if payload.is_null() {
        tracing::warn!("Native engine delivered a NULL event payload");
        return Event::Raw(String::new());
    }
    decode_event(CStr::from_ptr(payload).to_bytes())
}
