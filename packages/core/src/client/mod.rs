//! Client lifecycle: construction, connect/disconnect and the message pump.
//!
//! A [`Client`] owns exactly one native session. Lifecycle calls are not
//! meant to race each other on the same client; callers serialize them.
//! Sends may be issued from any thread while the engine delivers events on
//! its own.

mod lifecycle;
mod retrieval;
mod send;

pub use lifecycle::ConnectionState;
pub use send::{Destination, MediaAttachment, SendOutcome, SendRequest};

use crate::bridge::{EventHandler, NoopHandler};
use crate::config::ClientConfiguration;
use crate::error::{Result, WhatsflyError};
use crate::media;
use crate::native::{self, NativeClientId, NativeEngine};
use crate::registry::ClientHandle;
use lifecycle::{LifecycleHandler, SharedState};
use std::sync::Arc;

pub struct Client {
    config: ClientConfiguration,
    state: Arc<SharedState>,
    handle: ClientHandle,
}

impl Client {
    /// Provision media directories and create the native client.
    ///
    /// Without a handler, events are discarded.
    pub fn new(
        engine: Arc<dyn NativeEngine>,
        config: ClientConfiguration,
        handler: Option<Arc<dyn EventHandler>>,
    ) -> Result<Self> {
        if let Some(root) = &config.media_path {
            media::provision(root)?;
        }

        let state = SharedState::new();
        let handler = Arc::new(LifecycleHandler {
            state: state.clone(),
            inner: handler.unwrap_or_else(|| Arc::new(NoopHandler)),
        });
        let handle = ClientHandle::create(engine, &config, handler)?;

        Ok(Self {
            config,
            state,
            handle,
        })
    }

    /// Same as [`Client::new`], using the engine installed by
    /// [`native::load_engine`].
    pub fn with_loaded_engine(
        config: ClientConfiguration,
        handler: Option<Arc<dyn EventHandler>>,
    ) -> Result<Self> {
        Self::new(native::engine()?, config, handler)
    }

    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    /// The wrapper's local view; it is not a connectivity probe.
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    fn ensure_usable(&self) -> Result<NativeClientId> {
        let id = self.handle.ensure_valid()?;
        if self.state.get() == ConnectionState::Disconnected {
            return Err(WhatsflyError::HandleInvalidated { id });
        }
        Ok(id)
    }

    /// Connect to the network. Blocks for as long as the engine does; there
    /// is no timeout. Outcome is observed through events.
    pub fn connect(&self) -> Result<()> {
        let id = self.ensure_usable()?;
        {
            let mut state = self.state.lock();
            match *state {
                ConnectionState::Connected | ConnectionState::Connecting => {
                    tracing::debug!("Native client {} is already {:?}", id, *state);
                    return Ok(());
                }
                _ => *state = ConnectionState::Connecting,
            }
        }

        tracing::info!("Connecting native client {}", id);
        self.handle.engine().connect(id);

        let mut state = self.state.lock();
        if *state == ConnectionState::Connecting {
            *state = ConnectionState::Connected;
            tracing::info!("Native client {} connected", id);
        } else {
            tracing::warn!("Native client {} ended up {:?} while connecting", id, *state);
        }
        Ok(())
    }

    /// Tear down the session and invalidate the handle. Idempotent.
    pub fn disconnect(&self) -> Result<()> {
        let Ok(id) = self.handle.ensure_valid() else {
            tracing::debug!("Native client {} already disconnected", self.handle.id());
            return Ok(());
        };

        tracing::info!("Disconnecting native client {}", id);
        self.handle.engine().disconnect(id);
        *self.state.lock() = ConnectionState::Disconnected;
        self.handle.invalidate();
        Ok(())
    }

    /// Let the engine deliver queued events on the calling thread.
    ///
    /// This is an alternative to relying purely on asynchronous callbacks.
    /// Pick one mode per client: mixing both can deliver an event twice or
    /// leave it stuck in the queue.
    pub fn run_message_thread(&self) -> Result<()> {
        let id = self.ensure_usable()?;
        tracing::debug!("Pumping message thread for native client {}", id);
        self.handle.engine().run_message_thread(id);
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            let _ = self.disconnect();
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("handle", &self.handle)
            .field("state", &self.connection_state())
            .finish()
    }
}
