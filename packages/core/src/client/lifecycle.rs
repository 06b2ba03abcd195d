use crate::bridge::{Event, EventHandler};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Состояние подключения клиента
///
/// `Disconnected` is terminal: a fresh client is needed to reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    /// The native connect call is in flight.
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug)]
pub(crate) struct SharedState(Mutex<ConnectionState>);

impl SharedState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(ConnectionState::Uninitialized)))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self) -> ConnectionState {
        *self.lock()
    }
}

/// Sits between the bridge and the user handler so that an engine-initiated
/// disconnect is recorded before the user hears about it.
pub(crate) struct LifecycleHandler {
    pub(crate) state: Arc<SharedState>,
    pub(crate) inner: Arc<dyn EventHandler>,
}

impl EventHandler for LifecycleHandler {
    fn on_event(&self, event: Event) {
        self.inner.on_event(event);
    }

    fn on_disconnect(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), ConnectionState::Disconnected);
        tracing::info!("Native engine disconnected the client (was {:?})", previous);
        self.inner.on_disconnect();
    }
}
