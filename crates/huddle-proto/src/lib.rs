//! Huddle wire protocol.
//!
//! Defines the event contract shared with the room server: the names of the
//! events each side emits, the JSON payload shapes they carry, and the
//! Socket.IO/Engine.IO text packets that frame them on a WebSocket.
//!
//! Everything in this crate is pure data transformation. No I/O happens here;
//! the transport feeds raw text frames in and takes encoded text frames out.
//!
//! # Event contract
//!
//! | Direction | Name              | Payload                          |
//! |-----------|-------------------|----------------------------------|
//! | out       | `join_room`       | room id (string)                 |
//! | out       | `leave_room`      | room id (string)                 |
//! | out       | `send_message`    | [`ChatMessage`]                  |
//! | out       | `typing`          | [`TypingNotice`]                 |
//! | in        | `receive_message` | [`ChatMessage`]                  |
//! | in        | `hear_typing`     | [`PeerTyping`]                   |

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod event;
pub mod packet;

pub use errors::{ProtocolError, Result};
pub use event::{ChatMessage, InboundEvent, OutboundEvent, PeerTyping, TypingNotice, names};
pub use packet::{EnginePacket, OpenHandshake, SocketPacket};
