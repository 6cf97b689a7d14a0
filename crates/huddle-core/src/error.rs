//! Error types for the session state machine.
//!
//! Every error is a rejection: the operation that produced it left the session
//! exactly as it was and emitted nothing. Callers at the interaction boundary
//! usually treat these as "action unavailable" rather than failures.

use thiserror::Error;

/// Rejected session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Join attempted while already in a room.
    #[error("already joined room {room_id}")]
    AlreadyJoined {
        /// Room currently joined.
        room_id: String,
    },

    /// Operation requires a joined room.
    #[error("not joined to a room")]
    NotJoined,

    /// Join attempted with an empty room id.
    #[error("room id must not be empty")]
    EmptyRoomId,

    /// Join attempted with an empty display name.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// Send attempted with an empty body.
    #[error("message body must not be empty")]
    EmptyBody,

    /// Inbound message addressed to a room other than the joined one.
    #[error("message for room {received} while joined to {joined}")]
    ForeignRoom {
        /// Room currently joined.
        joined: String,
        /// Room named by the message.
        received: String,
    },
}
