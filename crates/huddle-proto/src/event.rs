//! Room events and their JSON payloads.
//!
//! Field names on the wire are fixed by the room server and do not follow Rust
//! naming, so every payload struct renames its fields explicitly. Payloads are
//! validated on decode: a message without an author, body, or room is
//! rejected instead of being handed to the session state machine.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// Event names used on the wire.
pub mod names {
    /// Client asks to join a room. Payload: room id string.
    pub const JOIN_ROOM: &str = "join_room";
    /// Client asks to leave a room. Payload: room id string.
    pub const LEAVE_ROOM: &str = "leave_room";
    /// Client broadcasts a message to its room.
    pub const SEND_MESSAGE: &str = "send_message";
    /// Client advertises that its user is typing.
    pub const TYPING: &str = "typing";
    /// Server delivers a message from the room.
    pub const RECEIVE_MESSAGE: &str = "receive_message";
    /// Server delivers a peer's typing signal.
    pub const HEAR_TYPING: &str = "hear_typing";
}

/// A chat message.
///
/// Immutable once created. The same shape is used for locally sent messages
/// and messages delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the author.
    pub author: String,
    /// Message text. Never empty.
    #[serde(rename = "message")]
    pub body: String,
    /// Human-readable local time of day at which the author sent it.
    #[serde(rename = "time")]
    pub timestamp: String,
    /// Room the message belongs to.
    #[serde(rename = "room")]
    pub room_id: String,
}

impl ChatMessage {
    /// Create a message.
    pub fn new(
        author: impl Into<String>,
        body: impl Into<String>,
        timestamp: impl Into<String>,
        room_id: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            timestamp: timestamp.into(),
            room_id: room_id.into(),
        }
    }

    fn validate(&self, event: &'static str) -> Result<()> {
        require_non_empty(event, "author", &self.author)?;
        require_non_empty(event, "message", &self.body)?;
        require_non_empty(event, "room", &self.room_id)
    }
}

/// Outbound typing signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingNotice {
    /// Display name of the local user.
    pub author: String,
    /// Room the user is typing in.
    #[serde(rename = "room")]
    pub room_id: String,
}

/// Inbound typing signal from a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerTyping {
    /// Display name of the typing peer.
    pub author: String,
    /// Typing flag as reported by the server.
    #[serde(rename = "isTyped")]
    pub is_typed: bool,
}

impl PeerTyping {
    /// Typing signal for `author`.
    pub fn new(author: impl Into<String>) -> Self {
        Self { author: author.into(), is_typed: true }
    }
}

/// Events a client emits to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Request to join a room.
    JoinRoom {
        /// Room to join.
        room_id: String,
    },
    /// Request to leave a room.
    LeaveRoom {
        /// Room to leave.
        room_id: String,
    },
    /// Broadcast a message to the room.
    SendMessage(ChatMessage),
    /// Advisory typing signal.
    Typing(TypingNotice),
}

impl OutboundEvent {
    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => names::JOIN_ROOM,
            Self::LeaveRoom { .. } => names::LEAVE_ROOM,
            Self::SendMessage(_) => names::SEND_MESSAGE,
            Self::Typing(_) => names::TYPING,
        }
    }

    /// JSON payload of this event.
    pub fn payload(&self) -> Result<Value> {
        match self {
            Self::JoinRoom { room_id } | Self::LeaveRoom { room_id } => {
                Ok(Value::String(room_id.clone()))
            },
            Self::SendMessage(message) => to_value(self.name(), message),
            Self::Typing(notice) => to_value(self.name(), notice),
        }
    }

    /// Decode an event emitted by a client (server side of the contract).
    ///
    /// Returns `Ok(None)` for event names outside the contract.
    pub fn decode(name: &str, payload: Value) -> Result<Option<Self>> {
        let event = match name {
            names::JOIN_ROOM => {
                let room_id = room_id_from(names::JOIN_ROOM, payload)?;
                Self::JoinRoom { room_id }
            },
            names::LEAVE_ROOM => {
                let room_id = room_id_from(names::LEAVE_ROOM, payload)?;
                Self::LeaveRoom { room_id }
            },
            names::SEND_MESSAGE => {
                let message: ChatMessage = from_value(names::SEND_MESSAGE, payload)?;
                message.validate(names::SEND_MESSAGE)?;
                Self::SendMessage(message)
            },
            names::TYPING => {
                let notice: TypingNotice = from_value(names::TYPING, payload)?;
                require_non_empty(names::TYPING, "author", &notice.author)?;
                require_non_empty(names::TYPING, "room", &notice.room_id)?;
                Self::Typing(notice)
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Events the server delivers to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A message from the room.
    ReceiveMessage(ChatMessage),
    /// A peer's typing signal.
    HearTyping(PeerTyping),
}

impl InboundEvent {
    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveMessage(_) => names::RECEIVE_MESSAGE,
            Self::HearTyping(_) => names::HEAR_TYPING,
        }
    }

    /// JSON payload of this event.
    pub fn payload(&self) -> Result<Value> {
        match self {
            Self::ReceiveMessage(message) => to_value(self.name(), message),
            Self::HearTyping(typing) => to_value(self.name(), typing),
        }
    }

    /// Decode an event delivered by the server.
    ///
    /// Returns `Ok(None)` for event names this client has no handler for.
    /// Payloads with missing or empty required fields are rejected.
    pub fn decode(name: &str, payload: Value) -> Result<Option<Self>> {
        let event = match name {
            names::RECEIVE_MESSAGE => {
                let message: ChatMessage = from_value(names::RECEIVE_MESSAGE, payload)?;
                message.validate(names::RECEIVE_MESSAGE)?;
                Self::ReceiveMessage(message)
            },
            names::HEAR_TYPING => {
                let typing: PeerTyping = from_value(names::HEAR_TYPING, payload)?;
                require_non_empty(names::HEAR_TYPING, "author", &typing.author)?;
                Self::HearTyping(typing)
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

fn room_id_from(event: &'static str, payload: Value) -> Result<String> {
    match payload {
        Value::String(room_id) => {
            require_non_empty(event, "room", &room_id)?;
            Ok(room_id)
        },
        other => Err(ProtocolError::Malformed {
            context: event,
            reason: format!("expected room id string, got {other}"),
        }),
    }
}

fn require_non_empty(event: &'static str, field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() { Err(ProtocolError::EmptyField { event, field }) } else { Ok(()) }
}

fn to_value<T: Serialize>(event: &'static str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ProtocolError::malformed(event, e))
}

fn from_value<T: DeserializeOwned>(event: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ProtocolError::malformed(event, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chat_message_uses_wire_field_names() {
        let message = ChatMessage::new("alice", "hello", "3:04:05 PM", "12345");
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            json!({"author": "alice", "message": "hello", "time": "3:04:05 PM", "room": "12345"})
        );
    }

    #[test]
    fn join_and_leave_carry_bare_room_id() {
        let join = OutboundEvent::JoinRoom { room_id: "12345".into() };
        let leave = OutboundEvent::LeaveRoom { room_id: "12345".into() };

        assert_eq!(join.name(), "join_room");
        assert_eq!(join.payload().unwrap(), json!("12345"));
        assert_eq!(leave.name(), "leave_room");
        assert_eq!(leave.payload().unwrap(), json!("12345"));
    }

    #[test]
    fn typing_notice_payload() {
        let typing = OutboundEvent::Typing(TypingNotice {
            author: "alice".into(),
            room_id: "12345".into(),
        });

        assert_eq!(typing.name(), "typing");
        assert_eq!(typing.payload().unwrap(), json!({"author": "alice", "room": "12345"}));
    }

    #[test]
    fn decode_receive_message() {
        let payload = json!({"author": "bob", "message": "hi", "time": "9:00:00 AM", "room": "r1"});
        let event = InboundEvent::decode("receive_message", payload).unwrap();

        assert_eq!(
            event,
            Some(InboundEvent::ReceiveMessage(ChatMessage::new("bob", "hi", "9:00:00 AM", "r1")))
        );
    }

    #[test]
    fn decode_hear_typing() {
        let payload = json!({"author": "bob", "isTyped": true});
        let event = InboundEvent::decode("hear_typing", payload).unwrap();

        assert_eq!(event, Some(InboundEvent::HearTyping(PeerTyping::new("bob"))));
    }

    #[test]
    fn decode_unknown_event_is_ignored() {
        let event = InboundEvent::decode("user_count", json!(3)).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let payload = json!({"author": "bob", "time": "9:00:00 AM", "room": "r1"});
        let err = InboundEvent::decode("receive_message", payload).unwrap_err();

        assert!(matches!(err, ProtocolError::Malformed { context: "receive_message", .. }));
    }

    #[test]
    fn decode_rejects_empty_body() {
        let payload = json!({"author": "bob", "message": "", "time": "9:00:00 AM", "room": "r1"});
        let err = InboundEvent::decode("receive_message", payload).unwrap_err();

        assert_eq!(err, ProtocolError::EmptyField { event: "receive_message", field: "message" });
    }

    #[test]
    fn decode_rejects_non_object_typing() {
        let err = InboundEvent::decode("hear_typing", json!("bob")).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { .. }));
    }

    #[test]
    fn server_side_decode_of_join() {
        let event = OutboundEvent::decode("join_room", json!("lobby")).unwrap();
        assert_eq!(event, Some(OutboundEvent::JoinRoom { room_id: "lobby".into() }));

        let err = OutboundEvent::decode("join_room", json!({"room": "lobby"})).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { context: "join_room", .. }));
    }
}
