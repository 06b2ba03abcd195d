// Whatsfly Core
// Client lifecycle and event bridge over the native whatsmeow engine

#![warn(clippy::all)]

pub mod uniffi_bindings;

// Re-export UniFFI types at crate root so scaffolding can find them
pub use uniffi_bindings::{
    default_engine_library_name, init_logging, is_engine_loaded, load_default_engine, load_engine,
    media_subdirectories, ClientOptions, EventListener, EventPayload, WhatsApp,
};

// Include UniFFI scaffolding generated from whatsfly_core.udl
uniffi::include_scaffolding!("whatsfly_core");

// Модули
pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod marshal;
pub mod media;
pub mod native;
pub mod registry;
pub mod utils;

// Re-exports для удобства
pub use bridge::{Event, EventHandler, FnHandler, NoopHandler};
pub use client::{Client, ConnectionState, Destination, MediaAttachment, SendOutcome, SendRequest};
pub use config::{ClientConfiguration, Config};
pub use error::WhatsflyError;
pub use native::{NativeEngine, SEND_SUCCESS};
