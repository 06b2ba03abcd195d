// Trampoline slots
//
// Engine callbacks carry no user data, so every live client owns one slot
// with its own pair of `extern "C"` entry points. The engine may keep calling
// a released slot's entry points, so slots are handed out round-robin and a
// released slot is the last candidate for reuse.

use super::EventHandler;
use crate::config::{Config, MAX_BRIDGE_SLOTS};
use crate::error::{Result, WhatsflyError};
use crate::marshal;
use crate::native::{DisconnectCallback, EventCallback};
use once_cell::sync::Lazy;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type SlotCell = RwLock<Option<Arc<dyn EventHandler>>>;

static SLOTS: Lazy<Vec<SlotCell>> =
    Lazy::new(|| (0..MAX_BRIDGE_SLOTS).map(|_| RwLock::new(None)).collect());

/// Where the next free-slot scan starts; only ever moves forward.
static NEXT_SLOT: AtomicUsize = AtomicUsize::new(0);

extern "C" fn on_event_trampoline<const SLOT: usize>(payload: *const c_char) {
    dispatch_event(SLOT, payload);
}

extern "C" fn on_disconnect_trampoline<const SLOT: usize>() {
    dispatch_disconnect(SLOT);
}

macro_rules! trampoline_table {
    ($($slot:literal)*) => {
        const EVENT_TRAMPOLINES: [EventCallback; MAX_BRIDGE_SLOTS] =
            [$(on_event_trampoline::<$slot>,)*];
        const DISCONNECT_TRAMPOLINES: [DisconnectCallback; MAX_BRIDGE_SLOTS] =
            [$(on_disconnect_trampoline::<$slot>,)*];
    };
}

trampoline_table!(
    0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
    16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
);

fn handler_at(slot: usize) -> Option<Arc<dyn EventHandler>> {
    SLOTS[slot]
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

// Nothing may unwind out of here: the caller is native code.
fn dispatch_event(slot: usize, payload: *const c_char) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: the engine hands over a NUL-terminated buffer valid for this call.
        let event = unsafe { marshal::decode_event_ptr(payload) };
        match handler_at(slot) {
            Some(handler) => handler.on_event(event),
            None => tracing::warn!("Dropping event for unbound bridge slot {}", slot),
        }
    }));
    if outcome.is_err() {
        tracing::error!("Event handler panicked on bridge slot {}", slot);
    }
}

fn dispatch_disconnect(slot: usize) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match handler_at(slot) {
        Some(handler) => handler.on_disconnect(),
        None => tracing::warn!("Dropping disconnect for unbound bridge slot {}", slot),
    }));
    if outcome.is_err() {
        tracing::error!("Disconnect handler panicked on bridge slot {}", slot);
    }
}

/// Exclusive binding of a handler to one trampoline pair.
///
/// The slot is released when this value is dropped.
#[derive(Debug)]
pub struct BridgeSlot {
    index: usize,
}

impl BridgeSlot {
    /// Bind `handler` to the first free slot after the last one handed out.
    pub fn bind(handler: Arc<dyn EventHandler>) -> Result<Self> {
        let limit = Config::global().max_clients.min(MAX_BRIDGE_SLOTS);
        let start = NEXT_SLOT.load(Ordering::SeqCst);
        for offset in 0..limit {
            let index = (start + offset) % limit;
            let mut guard = SLOTS[index].write().unwrap_or_else(PoisonError::into_inner);
            if guard.is_none() {
                *guard = Some(handler);
                NEXT_SLOT.store((index + 1) % limit, Ordering::SeqCst);
                tracing::debug!("Bound event handler to bridge slot {}", index);
                return Ok(Self { index });
            }
        }
        Err(WhatsflyError::TooManyClients { limit })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn on_event(&self) -> EventCallback {
        EVENT_TRAMPOLINES[self.index]
    }

    pub fn on_disconnect(&self) -> DisconnectCallback {
        DISCONNECT_TRAMPOLINES[self.index]
    }
}

impl Drop for BridgeSlot {
    fn drop(&mut self) {
        *SLOTS[self.index]
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!("Released bridge slot {}", self.index);
    }
}
