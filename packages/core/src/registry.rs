//! Handle registry: one native client per [`ClientHandle`], never reused.

use crate::bridge::{BridgeSlot, EventHandler};
use crate::config::ClientConfiguration;
use crate::error::{Result, WhatsflyError};
use crate::marshal;
use crate::native::{NativeClientId, NativeEngine};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Live ids, keyed by engine instance since ids are only unique per engine.
static LIVE_HANDLES: Lazy<Mutex<HashSet<(usize, NativeClientId)>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

fn engine_key(engine: &Arc<dyn NativeEngine>) -> usize {
    Arc::as_ptr(engine) as *const () as usize
}

/// Exclusive owner of a native client id and its bridge slot.
pub struct ClientHandle {
    id: NativeClientId,
    engine: Arc<dyn NativeEngine>,
    invalidated: AtomicBool,
    // Dropped after the handle leaves the live set.
    slot: BridgeSlot,
}

impl ClientHandle {
    /// Ask the engine for a new client wired to `handler`.
    pub fn create(
        engine: Arc<dyn NativeEngine>,
        config: &ClientConfiguration,
        handler: Arc<dyn EventHandler>,
    ) -> Result<Self> {
        let phone = marshal::encode_text("phone_number", &config.phone_number)?;
        let media_path = match &config.media_path {
            Some(path) => marshal::encode_path("media_path", path)?,
            None => marshal::encode_text("media_path", "")?,
        };

        // Bind first: the engine may start calling back before it returns.
        let slot = BridgeSlot::bind(handler)?;

        let id = engine.new_client(&phone, &media_path, slot.on_disconnect(), slot.on_event());
        if id < 0 {
            tracing::error!("Native engine refused to create a client: {}", id);
            return Err(WhatsflyError::NativeInit { code: id });
        }

        let key = (engine_key(&engine), id);
        let inserted = LIVE_HANDLES
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        if !inserted {
            // The id is owned by a live handle, so it cannot be disconnected
            // from here without tearing that client down. Whatever the engine
            // allocated under it stays with the owner and is released by it.
            tracing::error!(
                "Native engine returned client id {} which is still live; leaving it to its owner",
                id
            );
            return Err(WhatsflyError::NativeInit { code: id });
        }

        tracing::info!("Created native client {} on bridge slot {}", id, slot.index());
        Ok(Self {
            id,
            engine,
            invalidated: AtomicBool::new(false),
            slot,
        })
    }

    pub fn id(&self) -> NativeClientId {
        self.id
    }

    pub fn engine(&self) -> &dyn NativeEngine {
        self.engine.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        !self.invalidated.load(Ordering::SeqCst)
    }

    /// The native id, or `HandleInvalidated`.
    pub fn ensure_valid(&self) -> Result<NativeClientId> {
        if self.is_valid() {
            Ok(self.id)
        } else {
            Err(WhatsflyError::HandleInvalidated { id: self.id })
        }
    }

    /// Mark the handle unusable. Returns `true` only for the call that
    /// actually invalidated it.
    pub fn invalidate(&self) -> bool {
        if self.invalidated.swap(true, Ordering::SeqCst) {
            return false;
        }
        LIVE_HANDLES
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(engine_key(&self.engine), self.id));
        tracing::debug!("Invalidated native client {}", self.id);
        true
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.invalidate();
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("id", &self.id)
            .field("slot", &self.slot.index())
            .field("valid", &self.is_valid())
            .finish()
    }
}
