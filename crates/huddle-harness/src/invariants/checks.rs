//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// A client that is not in a room has an empty message log.
pub struct LogEmptyWhenNotJoined;

impl Invariant for LogEmptyWhenNotJoined {
    fn name(&self) -> &'static str {
        "log_empty_when_not_joined"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.room_id.is_none() && !client.messages.is_empty() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: not joined but holds {} messages",
                        client.id,
                        client.messages.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Every logged message belongs to the joined room.
pub struct MessagesMatchRoom;

impl Invariant for MessagesMatchRoom {
    fn name(&self) -> &'static str {
        "messages_match_room"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let Some(room_id) = client.room_id.as_deref() else { continue };
            if let Some(stray) = client.messages.iter().find(|m| m.room_id != room_id) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: joined {room_id} but logged message for {}",
                        client.id, stray.room_id
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The "someone is typing" flag and pending decay agree with the typing set.
///
/// The flag is true iff the set is non-empty, and a decay timer is pending iff
/// the set is non-empty. A pending timer over an empty set, or a populated set
/// with nothing scheduled to clear it, are both bugs.
pub struct TypingFlagMatchesPeers;

impl Invariant for TypingFlagMatchesPeers {
    fn name(&self) -> &'static str {
        "typing_flag_matches_peers"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let populated = !client.typing.is_empty();
            if client.someone_typing != populated || client.decay_pending != populated {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: typing {:?} but flag={} decay_pending={}",
                        client.id, client.typing, client.someone_typing, client.decay_pending
                    ),
                });
            }
        }
        Ok(())
    }
}

/// No author appears twice in a typing set.
pub struct NoDuplicateTypingPeers;

impl Invariant for NoDuplicateTypingPeers {
    fn name(&self) -> &'static str {
        "no_duplicate_typing_peers"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let mut seen = HashSet::new();
            if let Some(dup) = client.typing.iter().find(|author| !seen.insert(author.as_str())) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {}: {dup} listed twice in {:?}", client.id, client.typing),
                });
            }
        }
        Ok(())
    }
}

/// Nobody is shown typing while the client is not in a room.
pub struct NoPresenceOutsideRoom;

impl Invariant for NoPresenceOutsideRoom {
    fn name(&self) -> &'static str {
        "no_presence_outside_room"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.room_id.is_none() && !client.typing.is_empty() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {}: not joined but typing {:?}", client.id, client.typing),
                });
            }
        }
        Ok(())
    }
}

/// The UI shows exactly the client's room, log, and typing set.
///
/// Skipped for snapshots taken without a view.
pub struct ViewMatchesClient;

impl Invariant for ViewMatchesClient {
    fn name(&self) -> &'static str {
        "view_matches_client"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let Some(view) = &client.view else { continue };

            let mismatch = if view.room_id != client.room_id {
                Some(format!("room {:?} vs {:?}", view.room_id, client.room_id))
            } else if view.messages != client.messages {
                Some(format!("{} messages vs {}", view.messages.len(), client.messages.len()))
            } else if view.typing != client.typing {
                Some(format!("typing {:?} vs {:?}", view.typing, client.typing))
            } else {
                None
            };

            if let Some(detail) = mismatch {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {}: view disagrees: {detail}", client.id),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use huddle_proto::ChatMessage;

    use super::*;
    use crate::invariants::{ClientSnapshot, ViewSnapshot};

    fn single(client: ClientSnapshot) -> SystemSnapshot {
        SystemSnapshot::single(client)
    }

    #[test]
    fn messages_without_room_violate() {
        let mut client = ClientSnapshot::new(1);
        client.messages.push(ChatMessage::new("bob", "hi", "9:00:00 AM", "r1"));

        assert!(LogEmptyWhenNotJoined.check(&single(client)).is_err());
    }

    #[test]
    fn stray_room_message_violates() {
        let mut client = ClientSnapshot::new(1).with_room("r1", "alice");
        client.messages.push(ChatMessage::new("bob", "hi", "9:00:00 AM", "r2"));

        assert!(MessagesMatchRoom.check(&single(client)).is_err());
    }

    #[test]
    fn flag_must_follow_set() {
        let mut client = ClientSnapshot::new(1).with_room("r1", "alice").with_typing(["bob"]);
        assert!(TypingFlagMatchesPeers.check(&single(client.clone())).is_ok());

        client.decay_pending = false;
        assert!(TypingFlagMatchesPeers.check(&single(client)).is_err());
    }

    #[test]
    fn duplicate_peer_violates() {
        let client = ClientSnapshot::new(1).with_room("r1", "alice").with_typing(["bob", "bob"]);
        assert!(NoDuplicateTypingPeers.check(&single(client)).is_err());
    }

    #[test]
    fn typing_without_room_violates() {
        let client = ClientSnapshot::new(1).with_typing(["bob"]);
        assert!(NoPresenceOutsideRoom.check(&single(client)).is_err());
    }

    #[test]
    fn view_must_match() {
        let mut client = ClientSnapshot::new(1).with_room("r1", "alice");
        client.view = Some(ViewSnapshot::default());

        assert!(ViewMatchesClient.check(&single(client)).is_err());
    }
}
