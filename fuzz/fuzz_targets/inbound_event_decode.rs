//! Fuzz target for InboundEvent::decode
//!
//! Decodes arbitrary JSON payloads under both known and unknown event names.
//!
//! # Invariants
//!
//! - Unknown event names decode to `None`, never an error
//! - A decoded event re-encodes to a payload that decodes to the same event

#![no_main]

use arbitrary::Arbitrary;
use huddle_proto::{InboundEvent, names};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum NameChoice {
    ReceiveMessage,
    HearTyping,
    Other(String),
}

#[derive(Debug, Arbitrary)]
struct Input {
    name: NameChoice,
    payload: String,
}

fuzz_target!(|input: Input| {
    let name = match &input.name {
        NameChoice::ReceiveMessage => names::RECEIVE_MESSAGE,
        NameChoice::HearTyping => names::HEAR_TYPING,
        NameChoice::Other(other) => other.as_str(),
    };
    let known = name == names::RECEIVE_MESSAGE || name == names::HEAR_TYPING;

    let Ok(payload) = serde_json::from_str::<serde_json::Value>(&input.payload) else {
        return;
    };

    match InboundEvent::decode(name, payload) {
        Ok(Some(event)) => {
            assert!(known, "unknown event {name:?} decoded");
            assert_eq!(event.name(), name);

            let payload = event.payload().expect("decoded event must re-encode");
            let again = InboundEvent::decode(event.name(), payload).expect("re-encoded event must decode");
            assert_eq!(again, Some(event));
        }
        Ok(None) => assert!(!known, "known event {name:?} ignored"),
        Err(_) => assert!(known, "unknown event {name:?} rejected"),
    }
});
