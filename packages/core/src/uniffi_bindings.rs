use crate::bridge::{Event, EventHandler};
use crate::client::{Client, ConnectionState};
use crate::config::{ClientConfiguration, Config};
use crate::error::WhatsflyError;
use crate::native;
use std::sync::Arc;

// Foreign event handler - matches UDL `callback interface EventListener`
// Note: We use UDL definition, not derive macro
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: EventPayload);
    fn on_disconnect(&self);
}

// Event as seen by foreign code (serde_json::Value can't cross UniFFI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Structured { json: String, kind: Option<String> },
    Raw { text: String },
}

impl From<Event> for EventPayload {
    fn from(event: Event) -> Self {
        match event {
            Event::Structured(value) => EventPayload::Structured {
                kind: value.get("type").and_then(|v| v.as_str()).map(str::to_string),
                json: value.to_string(),
            },
            Event::Raw(text) => EventPayload::Raw { text },
        }
    }
}

// Client options - matches UDL dictionary (defaults live in the UDL)
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub phone_number: String,
    pub media_path: String,
    pub machine: String,
    pub browser: String,
}

impl From<ClientOptions> for ClientConfiguration {
    fn from(options: ClientOptions) -> Self {
        ClientConfiguration::new()
            .with_phone_number(options.phone_number)
            .with_media_path(options.media_path)
            .with_device(options.machine, options.browser)
    }
}

struct ForeignHandler(Box<dyn EventListener>);

impl EventHandler for ForeignHandler {
    fn on_event(&self, event: Event) {
        self.0.on_event(event.into());
    }

    fn on_disconnect(&self) {
        self.0.on_disconnect();
    }
}

// UniFFI wraps this in Arc automatically
pub struct WhatsApp {
    inner: Client,
}

// UniFFI interface implementation (exported via UDL, not proc-macros)
impl WhatsApp {
    /// Create a client on the process-wide engine.
    pub fn new(
        options: ClientOptions,
        listener: Option<Box<dyn EventListener>>,
    ) -> Result<Self, WhatsflyError> {
        let handler = listener.map(|l| Arc::new(ForeignHandler(l)) as Arc<dyn EventHandler>);
        let inner = Client::with_loaded_engine(options.into(), handler)?;
        Ok(Self { inner })
    }

    pub fn connect(&self) -> Result<(), WhatsflyError> {
        self.inner.connect()
    }

    pub fn disconnect(&self) -> Result<(), WhatsflyError> {
        self.inner.disconnect()
    }

    pub fn run_message_thread(&self) -> Result<(), WhatsflyError> {
        self.inner.run_message_thread()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.connection_state()
    }

    pub fn send_message(&self, phone: String, message: String, group: bool) -> Result<bool, WhatsflyError> {
        Ok(self.inner.send_message(&phone, &message, group)?.is_success())
    }

    pub fn send_image(
        &self,
        phone: String,
        image_path: String,
        caption: String,
        group: bool,
    ) -> Result<bool, WhatsflyError> {
        Ok(self.inner.send_image(&phone, image_path, non_empty(&caption), group)?.is_success())
    }

    pub fn send_video(
        &self,
        phone: String,
        video_path: String,
        caption: String,
        group: bool,
    ) -> Result<bool, WhatsflyError> {
        Ok(self.inner.send_video(&phone, video_path, non_empty(&caption), group)?.is_success())
    }

    pub fn send_audio(&self, phone: String, audio_path: String, group: bool) -> Result<bool, WhatsflyError> {
        Ok(self.inner.send_audio(&phone, audio_path, group)?.is_success())
    }

    pub fn send_document(
        &self,
        phone: String,
        document_path: String,
        caption: String,
        group: bool,
    ) -> Result<bool, WhatsflyError> {
        Ok(self.inner.send_document(&phone, document_path, non_empty(&caption), group)?.is_success())
    }

    pub fn get_all_chats(&self) -> Result<Vec<String>, WhatsflyError> {
        Ok(self.inner.get_all_chats()?.iter().map(|chat| chat.to_string()).collect())
    }

    pub fn get_all_chat_ids(&self) -> Result<Vec<String>, WhatsflyError> {
        self.inner.get_all_chat_ids()
    }

    pub fn get_unread_messages_in_chat(
        &self,
        chat_id: String,
        include_me: bool,
        include_notifications: bool,
    ) -> Result<Vec<String>, WhatsflyError> {
        let unread = self
            .inner
            .get_unread_messages_in_chat(&chat_id, include_me, include_notifications)?;
        Ok(unread.iter().map(Event::to_text).collect())
    }

    pub fn get_contacts(&self) -> Result<Vec<String>, WhatsflyError> {
        Ok(self.inner.get_contacts()?.iter().map(|contact| contact.to_string()).collect())
    }

    pub fn chat_send_seen(&self, chat_id: String) -> Result<(), WhatsflyError> {
        self.inner.chat_send_seen(&chat_id)
    }

    pub fn check_number_status(&self, number_id: String) -> Result<bool, WhatsflyError> {
        self.inner.check_number_status(&number_id)
    }

    pub fn subscribe_new_messages(&self, observer: Box<dyn EventListener>) -> Result<(), WhatsflyError> {
        self.inner.subscribe_new_messages(Arc::new(ForeignHandler(observer)))
    }

    pub fn unsubscribe_new_messages(&self, observer: Box<dyn EventListener>) -> Result<(), WhatsflyError> {
        self.inner.unsubscribe_new_messages(Arc::new(ForeignHandler(observer)))
    }

    pub fn is_connected(&self) -> Result<bool, WhatsflyError> {
        self.inner.is_connected()
    }
}

// Empty caption from foreign code means "no caption"
fn non_empty(caption: &str) -> Option<&str> {
    if caption.is_empty() {
        None
    } else {
        Some(caption)
    }
}

// ============================================
// Namespace functions
// ============================================

pub fn load_engine(path: String) -> Result<(), WhatsflyError> {
    native::load_engine(path)
}

pub fn load_default_engine() -> Result<(), WhatsflyError> {
    native::load_default_engine()
}

pub fn is_engine_loaded() -> bool {
    native::engine().is_ok()
}

pub fn default_engine_library_name() -> String {
    native::default_library_name()
}

pub fn media_subdirectories() -> Vec<String> {
    Config::global()
        .media_subdirectories
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn init_logging(default_level: String) {
    crate::utils::logging::init_logging(&default_level);
}
