//! Runtime loading of the precompiled engine.
//!
//! Nothing is loaded implicitly: callers pick a path (or let [`Config`]
//! resolve one) and call [`load_engine`] / [`load_default_engine`] once per
//! process.

use super::{DisconnectCallback, EventCallback, NativeClientId, NativeEngine};
use crate::config::Config;
use crate::error::{Result, WhatsflyError};
use libloading::Library;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Process-wide engine, installed explicitly
static ENGINE: OnceLock<Arc<dyn NativeEngine>> = OnceLock::new();

type NewClientFn =
    unsafe extern "C" fn(*const c_char, *const c_char, DisconnectCallback, EventCallback) -> c_int;
type ClientFn = unsafe extern "C" fn(c_int);
type SendTextFn = unsafe extern "C" fn(c_int, *const c_char, *const c_char, u8) -> c_int;
type SendMediaFn =
    unsafe extern "C" fn(c_int, *const c_char, *const c_char, *const c_char, u8) -> c_int;
type SendAudioFn = unsafe extern "C" fn(c_int, *const c_char, *const c_char, u8) -> c_int;

/// Engine backed by a shared library opened with `libloading`.
///
/// All symbols are resolved in [`DynamicEngine::load`], so a library missing
/// any entry point is rejected up front instead of on first use.
pub struct DynamicEngine {
    path: PathBuf,
    new_client: NewClientFn,
    connect: ClientFn,
    disconnect: ClientFn,
    message_thread: ClientFn,
    send_message: SendTextFn,
    send_image: SendMediaFn,
    send_video: SendMediaFn,
    send_audio: SendAudioFn,
    send_document: SendMediaFn,
    // Must outlive every function pointer above.
    _library: Library,
}

impl DynamicEngine {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let load_error = |reason: String| WhatsflyError::EngineLoad {
            path: path.clone(),
            reason,
        };

        // SAFETY: opening the library runs its initializers; the engine is
        // trusted native code by construction.
        let library = unsafe { Library::new(&path) }.map_err(|e| load_error(e.to_string()))?;

        macro_rules! symbol {
            ($ty:ty, $name:literal) => {{
                // SAFETY: the declared type matches the engine's exported C signature.
                let symbol = unsafe { library.get::<$ty>($name) }.map_err(|e| {
                    load_error(format!(
                        "missing symbol {}: {}",
                        String::from_utf8_lossy(&$name[..$name.len() - 1]),
                        e
                    ))
                })?;
                *symbol
            }};
        }

        let new_client = symbol!(NewClientFn, b"new_whatsapp_client_wrapper\0");
        let connect = symbol!(ClientFn, b"connect_wrapper\0");
        let disconnect = symbol!(ClientFn, b"disconnect_wrapper\0");
        let message_thread = symbol!(ClientFn, b"message_thread_wrapper\0");
        let send_message = symbol!(SendTextFn, b"send_message_wrapper\0");
        let send_image = symbol!(SendMediaFn, b"send_image_wrapper\0");
        let send_video = symbol!(SendMediaFn, b"send_video_wrapper\0");
        let send_audio = symbol!(SendAudioFn, b"send_audio_wrapper\0");
        let send_document = symbol!(SendMediaFn, b"send_document_wrapper\0");

        let engine = Self {
            path,
            new_client,
            connect,
            disconnect,
            message_thread,
            send_message,
            send_image,
            send_video,
            send_audio,
            send_document,
            _library: library,
        };

        tracing::info!("Loaded native engine from {}", engine.path.display());
        Ok(engine)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for DynamicEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicEngine").field("path", &self.path).finish()
    }
}

// SAFETY (for every call below): the pointers come from `CStr`s that outlive
// the call, and the engine copies what it keeps.
impl NativeEngine for DynamicEngine {
    fn new_client(
        &self,
        phone_number: &CStr,
        media_path: &CStr,
        on_disconnect: DisconnectCallback,
        on_event: EventCallback,
    ) -> NativeClientId {
        unsafe { (self.new_client)(phone_number.as_ptr(), media_path.as_ptr(), on_disconnect, on_event) }
    }

    fn connect(&self, id: NativeClientId) {
        unsafe { (self.connect)(id) }
    }

    fn disconnect(&self, id: NativeClientId) {
        unsafe { (self.disconnect)(id) }
    }

    fn run_message_thread(&self, id: NativeClientId) {
        unsafe { (self.message_thread)(id) }
    }

    fn send_message(&self, id: NativeClientId, phone: &CStr, message: &CStr, is_group: u8) -> c_int {
        unsafe { (self.send_message)(id, phone.as_ptr(), message.as_ptr(), is_group) }
    }

    fn send_image(&self, id: NativeClientId, phone: &CStr, path: &CStr, caption: &CStr, is_group: u8) -> c_int {
        unsafe { (self.send_image)(id, phone.as_ptr(), path.as_ptr(), caption.as_ptr(), is_group) }
    }

    fn send_video(&self, id: NativeClientId, phone: &CStr, path: &CStr, caption: &CStr, is_group: u8) -> c_int {
        unsafe { (self.send_video)(id, phone.as_ptr(), path.as_ptr(), caption.as_ptr(), is_group) }
    }

    fn send_audio(&self, id: NativeClientId, phone: &CStr, path: &CStr, is_group: u8) -> c_int {
        unsafe { (self.send_audio)(id, phone.as_ptr(), path.as_ptr(), is_group) }
    }

    fn send_document(&self, id: NativeClientId, phone: &CStr, path: &CStr, caption: &CStr, is_group: u8) -> c_int {
        unsafe { (self.send_document)(id, phone.as_ptr(), path.as_ptr(), caption.as_ptr(), is_group) }
    }
}

/// File name produced by the engine build for the current platform,
/// e.g. `whatsmeow-linux-amd64.dylib`.
pub fn default_library_name() -> String {
    library_name_for(std::env::consts::OS, std::env::consts::ARCH)
}

fn library_name_for(os: &str, arch: &str) -> String {
    let arch = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    };
    format!("whatsmeow-{}-{}.dylib", os, arch)
}

/// Install an engine for the whole process. Only the first install wins.
pub fn install_engine(engine: Arc<dyn NativeEngine>) -> Result<()> {
    ENGINE.set(engine).map_err(|_| WhatsflyError::EngineLoad {
        path: PathBuf::new(),
        reason: "an engine is already loaded".to_string(),
    })
}

/// Load the engine library at `path` and install it process-wide.
pub fn load_engine(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if ENGINE.get().is_some() {
        return Err(WhatsflyError::EngineLoad {
            path: path.to_path_buf(),
            reason: "an engine is already loaded".to_string(),
        });
    }
    install_engine(Arc::new(DynamicEngine::load(path)?))
}

/// Load the engine from the location resolved by [`Config::global`].
pub fn load_default_engine() -> Result<()> {
    load_engine(Config::global().resolved_engine_path())
}

/// The installed engine, or `EngineNotLoaded`.
pub fn engine() -> Result<Arc<dyn NativeEngine>> {
    ENGINE.get().cloned().ok_or(WhatsflyError::EngineNotLoaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_name_maps_architectures() {
        assert_eq!(library_name_for("linux", "x86_64"), "whatsmeow-linux-amd64.dylib");
        assert_eq!(library_name_for("macos", "aarch64"), "whatsmeow-macos-arm64.dylib");
        assert_eq!(library_name_for("windows", "x86"), "whatsmeow-windows-x86.dylib");
    }

    #[test]
    fn test_load_missing_library_reports_path() {
        let err = DynamicEngine::load("/definitely/not/here/whatsmeow.dylib").unwrap_err();
        match err {
            WhatsflyError::EngineLoad { path, .. } => {
                assert_eq!(path, PathBuf::from("/definitely/not/here/whatsmeow.dylib"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
