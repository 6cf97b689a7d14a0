//! Fuzz target for the Presence state machine
//!
//! # Strategy
//!
//! - Authors: a handful of short names so notices collide
//! - Time: small and large clock jumps, including exactly one window
//! - Policies: shared and per-author decay
//!
//! # Invariants
//!
//! - No author appears twice in the typing set
//! - Typing flag, typing set, and pending deadline always agree
//! - A deadline is never in the past after a tick
//! - A full quiet window always empties the set

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use huddle_core::{DecayPolicy, Presence};
use huddle_proto::PeerTyping;
use libfuzzer_sys::fuzz_target;

const WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Arbitrary)]
enum PresenceOp {
    Notice { author: u8 },
    Advance { millis: u16 },
    AdvanceWindow,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    per_author: bool,
    ops: Vec<PresenceOp>,
}

fuzz_target!(|input: Input| {
    let policy = if input.per_author { DecayPolicy::PerAuthor } else { DecayPolicy::Shared };
    let mut presence: Presence<Duration> = Presence::new(policy, WINDOW);
    let mut now = Duration::ZERO;

    for op in input.ops {
        match op {
            PresenceOp::Notice { author } => {
                let author = format!("peer-{}", author % 8);
                presence.on_peer_typing(&PeerTyping::new(author.as_str()), now);
            }
            PresenceOp::Advance { millis } => {
                now += Duration::from_millis(u64::from(millis));
                presence.tick(now);
                if let Some(deadline) = presence.next_deadline() {
                    assert!(deadline > now, "deadline {deadline:?} not after {now:?}");
                }
            }
            PresenceOp::AdvanceWindow => {
                now += WINDOW;
                presence.tick(now);
                assert!(!presence.is_someone_typing(), "typing survived a quiet window");
            }
            PresenceOp::Clear => presence.clear(),
        }

        let peers: Vec<&str> = presence.typing_peers().collect();
        let mut unique = peers.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), peers.len(), "duplicate typing peer in {peers:?}");

        assert_eq!(presence.is_someone_typing(), !peers.is_empty());
        assert_eq!(presence.next_deadline().is_some(), !peers.is_empty());
    }
});
