//! Fuzz target for EnginePacket::parse
//!
//! Feeds arbitrary text frames through the Engine.IO/Socket.IO parser to find:
//! - Parser panics on truncated or malformed packets
//! - Ack id overflow
//! - Encodings the parser cannot read back
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use huddle_proto::EnginePacket;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // WebSocket text frames are UTF-8; anything else never reaches the parser
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(packet) = EnginePacket::parse(text) {
        // Whatever parses must re-encode into something parseable
        let encoded = packet.encode();
        assert!(
            EnginePacket::parse(&encoded).is_ok(),
            "re-encoded packet failed to parse: {encoded:?}"
        );
    }
});
