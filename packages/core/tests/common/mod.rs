//! In-process stand-in for the native engine.
//!
//! Records every call, returns fabricated codes and can push events or
//! disconnects through the callbacks it was handed, exactly like the real
//! engine does from its own threads.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use whatsfly_core::native::{DisconnectCallback, EventCallback, NativeClientId};
use whatsfly_core::NativeEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NewClient { phone: String, media_path: String },
    Connect(NativeClientId),
    Disconnect(NativeClientId),
    MessageThread(NativeClientId),
    SendMessage { id: NativeClientId, phone: String, message: String, group: u8 },
    SendImage { id: NativeClientId, phone: String, path: String, caption: String, group: u8 },
    SendVideo { id: NativeClientId, phone: String, path: String, caption: String, group: u8 },
    SendAudio { id: NativeClientId, phone: String, path: String, group: u8 },
    SendDocument { id: NativeClientId, phone: String, path: String, caption: String, group: u8 },
}

pub struct FakeEngine {
    next_id: AtomicI32,
    forced_id: Mutex<Option<NativeClientId>>,
    send_code: AtomicI32,
    disconnect_during_connect: AtomicBool,
    calls: Mutex<Vec<Call>>,
    callbacks: Mutex<HashMap<NativeClientId, (DisconnectCallback, EventCallback)>>,
}

fn text(value: &CStr) -> String {
    value.to_str().expect("fake engine expects UTF-8").to_string()
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI32::new(0),
            forced_id: Mutex::new(None),
            send_code: AtomicI32::new(whatsfly_core::SEND_SUCCESS),
            disconnect_during_connect: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            callbacks: Mutex::new(HashMap::new()),
        })
    }

    /// Make `new_client` return `id` from now on.
    pub fn force_client_id(&self, id: NativeClientId) {
        *self.forced_id.lock().unwrap() = Some(id);
    }

    pub fn set_send_code(&self, code: c_int) {
        self.send_code.store(code, Ordering::SeqCst);
    }

    /// Simulate the network dropping while `connect` is in flight.
    pub fn disconnect_while_connecting(&self) {
        self.disconnect_during_connect.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn callbacks_for(&self, id: NativeClientId) -> (DisconnectCallback, EventCallback) {
        *self
            .callbacks
            .lock()
            .unwrap()
            .get(&id)
            .expect("no client with that id")
    }

    /// Push a raw payload through the client's `on_event` callback.
    pub fn fire_event(&self, id: NativeClientId, payload: &[u8]) {
        let (_, on_event) = self.callbacks_for(id);
        let payload = CString::new(payload.to_vec()).expect("payload without NUL");
        on_event(payload.as_ptr());
    }

    pub fn fire_null_event(&self, id: NativeClientId) {
        let (_, on_event) = self.callbacks_for(id);
        on_event(std::ptr::null());
    }

    pub fn fire_disconnect(&self, id: NativeClientId) {
        let (on_disconnect, _) = self.callbacks_for(id);
        on_disconnect();
    }
}

impl NativeEngine for FakeEngine {
    fn new_client(
        &self,
        phone_number: &CStr,
        media_path: &CStr,
        on_disconnect: DisconnectCallback,
        on_event: EventCallback,
    ) -> NativeClientId {
        self.record(Call::NewClient {
            phone: text(phone_number),
            media_path: text(media_path),
        });
        let id = match *self.forced_id.lock().unwrap() {
            Some(id) => id,
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        if id >= 0 {
            self.callbacks.lock().unwrap().insert(id, (on_disconnect, on_event));
        }
        id
    }

    fn connect(&self, id: NativeClientId) {
        self.record(Call::Connect(id));
        if self.disconnect_during_connect.load(Ordering::SeqCst) {
            self.fire_disconnect(id);
        }
    }

    fn disconnect(&self, id: NativeClientId) {
        self.record(Call::Disconnect(id));
    }

    fn run_message_thread(&self, id: NativeClientId) {
        self.record(Call::MessageThread(id));
    }

    fn send_message(&self, id: NativeClientId, phone: &CStr, message: &CStr, is_group: u8) -> c_int {
        self.record(Call::SendMessage {
            id,
            phone: text(phone),
            message: text(message),
            group: is_group,
        });
        self.send_code.load(Ordering::SeqCst)
    }

    fn send_image(&self, id: NativeClientId, phone: &CStr, path: &CStr, caption: &CStr, is_group: u8) -> c_int {
        self.record(Call::SendImage {
            id,
            phone: text(phone),
            path: text(path),
            caption: text(caption),
            group: is_group,
        });
        self.send_code.load(Ordering::SeqCst)
    }

    fn send_video(&self, id: NativeClientId, phone: &CStr, path: &CStr, caption: &CStr, is_group: u8) -> c_int {
        self.record(Call::SendVideo {
            id,
            phone: text(phone),
            path: text(path),
            caption: text(caption),
            group: is_group,
        });
        self.send_code.load(Ordering::SeqCst)
    }

    fn send_audio(&self, id: NativeClientId, phone: &CStr, path: &CStr, is_group: u8) -> c_int {
        self.record(Call::SendAudio {
            id,
            phone: text(phone),
            path: text(path),
            group: is_group,
        });
        self.send_code.load(Ordering::SeqCst)
    }

    fn send_document(&self, id: NativeClientId, phone: &CStr, path: &CStr, caption: &CStr, is_group: u8) -> c_int {
        self.record(Call::SendDocument {
            id,
            phone: text(phone),
            path: text(path),
            caption: text(caption),
            group: is_group,
        });
        self.send_code.load(Ordering::SeqCst)
    }
}
