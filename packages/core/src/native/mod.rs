//! Foreign call surface of the native engine.
//!
//! The engine is an opaque shared library; everything it offers is the fixed
//! set of entry points mirrored by [`NativeEngine`]. Strings are passed as
//! NUL-terminated UTF-8, flags as `u8` 0/1 and results as `c_int`.

pub mod library;

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

pub use library::{default_library_name, engine, install_engine, load_default_engine, load_engine, DynamicEngine};

/// Identifier handed out by `new_whatsapp_client_wrapper`.
pub type NativeClientId = c_int;

/// `on_disconnect` entry point, no arguments.
pub type DisconnectCallback = extern "C" fn();

/// `on_event` entry point, one NUL-terminated serialized event.
pub type EventCallback = extern "C" fn(*const c_char);

/// Default success sentinel for send operations, see `Config::send_success_code`.
pub const SEND_SUCCESS: c_int = 1;

/// Safe mirror of the engine's exported functions.
///
/// Implementations must be callable from any thread. Callbacks passed to
/// [`NativeEngine::new_client`] may be invoked on engine-owned threads for as
/// long as the client exists.
pub trait NativeEngine: Send + Sync {
    /// Create a client. A negative return value means the engine refused.
    fn new_client(
        &self,
        phone_number: &CStr,
        media_path: &CStr,
        on_disconnect: DisconnectCallback,
        on_event: EventCallback,
    ) -> NativeClientId;

    /// May block until the engine has connected or given up.
    fn connect(&self, id: NativeClientId);

    fn disconnect(&self, id: NativeClientId);

    /// Drain queued events on the calling thread.
    fn run_message_thread(&self, id: NativeClientId);

    fn send_message(&self, id: NativeClientId, phone: &CStr, message: &CStr, is_group: u8) -> c_int;

    fn send_image(
        &self,
        id: NativeClientId,
        phone: &CStr,
        path: &CStr,
        caption: &CStr,
        is_group: u8,
    ) -> c_int;

    fn send_video(
        &self,
        id: NativeClientId,
        phone: &CStr,
        path: &CStr,
        caption: &CStr,
        is_group: u8,
    ) -> c_int;

    /// Exported by the engine but not wired up on the Rust side.
    fn send_audio(&self, id: NativeClientId, phone: &CStr, path: &CStr, is_group: u8) -> c_int;

    fn send_document(
        &self,
        id: NativeClientId,
        phone: &CStr,
        path: &CStr,
        caption: &CStr,
        is_group: u8,
    ) -> c_int;
}
