use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the wrapper layer.
///
/// Exported to foreign code as a flat UniFFI error: bindings see the variant
/// name and the `Display` message, never the fields.
#[derive(Error, Debug)]
pub enum WhatsflyError {
    #[error("Native engine is not loaded; call load_engine first")]
    EngineNotLoaded,

    #[error("Failed to load native engine from {path}: {reason}")]
    EngineLoad { path: PathBuf, reason: String },

    #[error("Native engine refused to create a client (code {code})")]
    NativeInit { code: i32 },

    #[error("All {limit} bridge slots are in use")]
    TooManyClients { limit: usize },

    #[error("Client handle {id} is no longer valid")]
    HandleInvalidated { id: i32 },

    #[error("Invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("Failed to provision media directory {path}: {source}")]
    MediaProvisioning {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },
}

impl WhatsflyError {
    pub(crate) fn not_implemented(operation: &'static str) -> Self {
        WhatsflyError::NotImplemented { operation }
    }
}

pub type Result<T> = std::result::Result<T, WhatsflyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_piece() {
        let err = WhatsflyError::not_implemented("get_contacts");
        assert_eq!(err.to_string(), "get_contacts is not implemented");

        let err = WhatsflyError::InvalidArgument {
            field: "message",
            reason: "contains a NUL byte at offset 3".into(),
        };
        assert!(err.to_string().contains("`message`"));
    }

    #[test]
    fn test_media_error_keeps_io_source() {
        use std::error::Error as _;

        let err = WhatsflyError::MediaProvisioning {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
