//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while decoding or validating wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Text frame was empty.
    #[error("empty packet")]
    EmptyPacket,

    /// Leading packet type digit is not a known Engine.IO type.
    #[error("unknown engine.io packet type: {0:?}")]
    UnknownEngineType(char),

    /// Leading packet type digit is not a known Socket.IO type.
    #[error("unknown socket.io packet type: {0:?}")]
    UnknownSocketType(char),

    /// Packet body was not valid JSON or had the wrong shape.
    #[error("malformed {context}: {reason}")]
    Malformed {
        /// What was being decoded.
        context: &'static str,
        /// Decoder error message.
        reason: String,
    },

    /// A required string field was empty.
    #[error("event {event}: field `{field}` must not be empty")]
    EmptyField {
        /// Event name.
        event: &'static str,
        /// Field that was empty.
        field: &'static str,
    },
}

impl ProtocolError {
    pub(crate) fn malformed(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Malformed { context, reason: err.to_string() }
    }
}
