//! Property-based tests for the packet decoder.
//!
//! The transport feeds every text frame the server sends through
//! [`EnginePacket::parse`] and [`InboundEvent::decode`]. Neither may panic on
//! hostile input, and anything they accept must satisfy the payload
//! validation rules.

use huddle_proto::{EnginePacket, InboundEvent, SocketPacket};
use proptest::prelude::*;
use serde_json::json;

/// Text frames that look roughly like Socket.IO traffic.
fn frame_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[0-6]{1,2}[\\[\\]{}\",:a-z0-9/ ]{0,40}",
        ("[a-z_]{1,16}", any::<String>(), any::<String>()).prop_map(|(name, author, body)| {
            let args = json!([name, {"author": author, "message": body, "time": "", "room": "r"}]);
            format!("42{args}")
        }),
    ]
}

proptest! {
    #[test]
    fn prop_parse_never_panics(text in frame_strategy()) {
        let _ = EnginePacket::parse(&text);
    }

    #[test]
    fn prop_accepted_messages_are_complete(text in frame_strategy()) {
        if let Ok(EnginePacket::Message(SocketPacket::Event { name, payload, .. })) =
            EnginePacket::parse(&text)
            && let Ok(Some(InboundEvent::ReceiveMessage(message))) =
                InboundEvent::decode(&name, payload)
        {
            prop_assert!(!message.author.is_empty());
            prop_assert!(!message.body.is_empty());
            prop_assert!(!message.room_id.is_empty());
        }
    }

    #[test]
    fn prop_typing_requires_author(author in ".{0,8}") {
        let result = InboundEvent::decode("hear_typing", json!({"author": author, "isTyped": true}));
        prop_assert_eq!(result.is_ok(), !author.is_empty());
    }
}
