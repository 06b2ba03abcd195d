// API для отправки сообщений

use super::Client;
use crate::error::{Result, WhatsflyError};
use crate::marshal;
use std::ffi::CString;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

/// Phone number or group id, plus whether it names a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: String,
    pub group: bool,
}

impl Destination {
    pub fn phone(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: false,
        }
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: true,
        }
    }
}

/// A local file to upload. Existence and format are checked by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub path: PathBuf,
    pub caption: Option<String>,
}

impl MediaAttachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    fn encode(&self) -> Result<(CString, CString)> {
        let path = marshal::encode_path("path", &self.path)?;
        let caption = marshal::encode_text("caption", self.caption.as_deref().unwrap_or(""))?;
        Ok((path, caption))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendRequest {
    Text { to: Destination, body: String },
    Image { to: Destination, media: MediaAttachment },
    Video { to: Destination, media: MediaAttachment },
    Document { to: Destination, media: MediaAttachment },
}

impl SendRequest {
    pub fn destination(&self) -> &Destination {
        match self {
            SendRequest::Text { to, .. }
            | SendRequest::Image { to, .. }
            | SendRequest::Video { to, .. }
            | SendRequest::Document { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SendRequest::Text { .. } => "text",
            SendRequest::Image { .. } => "image",
            SendRequest::Video { .. } => "video",
            SendRequest::Document { .. } => "document",
        }
    }
}

/// Result of one send. The engine reports nothing beyond its return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Failed { code: i32 },
}

impl SendOutcome {
    pub fn from_code(code: c_int) -> Self {
        if marshal::decode_outcome(code) {
            SendOutcome::Sent
        } else {
            SendOutcome::Failed { code }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

impl From<SendOutcome> for bool {
    fn from(outcome: SendOutcome) -> Self {
        outcome.is_success()
    }
}

impl Client {
    /// Send one request; a blocking round trip to the engine.
    pub fn send(&self, request: &SendRequest) -> Result<SendOutcome> {
        let id = self.ensure_usable()?;
        let engine = self.handle.engine();
        let to = request.destination();
        let phone = marshal::encode_text("phone", &to.id)?;
        let group = marshal::encode_flag(to.group);

        let code = match request {
            SendRequest::Text { body, .. } => {
                let message = marshal::encode_text("message", body)?;
                engine.send_message(id, &phone, &message, group)
            }
            SendRequest::Image { media, .. } => {
                let (path, caption) = media.encode()?;
                engine.send_image(id, &phone, &path, &caption, group)
            }
            SendRequest::Video { media, .. } => {
                let (path, caption) = media.encode()?;
                engine.send_video(id, &phone, &path, &caption, group)
            }
            SendRequest::Document { media, .. } => {
                let (path, caption) = media.encode()?;
                engine.send_document(id, &phone, &path, &caption, group)
            }
        };

        let outcome = SendOutcome::from_code(code);
        match outcome {
            SendOutcome::Sent => tracing::debug!("Sent {} to {}", request.kind(), to.id),
            SendOutcome::Failed { code } => {
                tracing::warn!("Engine failed to send {} to {} (code {})", request.kind(), to.id, code)
            }
        }
        Ok(outcome)
    }

    pub fn send_message(&self, phone: &str, message: &str, group: bool) -> Result<SendOutcome> {
        self.send(&SendRequest::Text {
            to: destination(phone, group),
            body: message.to_string(),
        })
    }

    pub fn send_image(
        &self,
        phone: &str,
        image_path: impl AsRef<Path>,
        caption: Option<&str>,
        group: bool,
    ) -> Result<SendOutcome> {
        self.send(&SendRequest::Image {
            to: destination(phone, group),
            media: attachment(image_path.as_ref(), caption),
        })
    }

    pub fn send_video(
        &self,
        phone: &str,
        video_path: impl AsRef<Path>,
        caption: Option<&str>,
        group: bool,
    ) -> Result<SendOutcome> {
        self.send(&SendRequest::Video {
            to: destination(phone, group),
            media: attachment(video_path.as_ref(), caption),
        })
    }

    pub fn send_document(
        &self,
        phone: &str,
        document_path: impl AsRef<Path>,
        caption: Option<&str>,
        group: bool,
    ) -> Result<SendOutcome> {
        self.send(&SendRequest::Document {
            to: destination(phone, group),
            media: attachment(document_path.as_ref(), caption),
        })
    }

    /// Audio is not supported; never reaches the engine.
    pub fn send_audio(
        &self,
        _phone: &str,
        _audio_path: impl AsRef<Path>,
        _group: bool,
    ) -> Result<SendOutcome> {
        Err(WhatsflyError::not_implemented("send_audio"))
    }
}

fn destination(id: &str, group: bool) -> Destination {
    Destination {
        id: id.to_string(),
        group,
    }
}

fn attachment(path: &Path, caption: Option<&str>) -> MediaAttachment {
    MediaAttachment {
        path: path.to_path_buf(),
        caption: caption.map(str::to_string),
    }
}
