//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use huddle_app::App;
use huddle_client::{Client, Environment};
use huddle_proto::ChatMessage;

/// Snapshot of the entire system state.
///
/// Contains observable state from one or more clients for invariant checking.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, client: ClientSnapshot) {
        self.clients.push(client);
    }
}

/// What the UI shows for the joined room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Room shown. `None` if the UI shows no room.
    pub room_id: Option<String>,
    /// Messages shown.
    pub messages: Vec<ChatMessage>,
    /// Typing peers shown.
    pub typing: Vec<String>,
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client identifier.
    pub id: u64,
    /// Joined room. `None` if not joined.
    pub room_id: Option<String>,
    /// Display name. `None` if not joined.
    pub display_name: Option<String>,
    /// Message log.
    pub messages: Vec<ChatMessage>,
    /// Peers in the typing set, in arrival order.
    pub typing: Vec<String>,
    /// The derived "someone is typing" flag.
    pub someone_typing: bool,
    /// Whether any decay timer is pending.
    pub decay_pending: bool,
    /// UI view, when the client runs under an [`App`].
    pub view: Option<ViewSnapshot>,
}

impl ClientSnapshot {
    /// Create a new client snapshot.
    pub fn new(id: u64) -> Self {
        Self { id, ..Default::default() }
    }

    /// Capture a client's session and presence state.
    pub fn from_client<E: Environment>(id: u64, client: &Client<E>) -> Self {
        let session = client.session();
        let presence = client.presence();

        Self {
            id,
            room_id: session.room_id().map(str::to_string),
            display_name: session.display_name().map(str::to_string),
            messages: session.messages().to_vec(),
            typing: presence.typing_peers().map(str::to_string).collect(),
            someone_typing: presence.is_someone_typing(),
            decay_pending: presence.next_deadline().is_some(),
            view: None,
        }
    }

    /// Attach the UI view of `app`.
    #[must_use]
    pub fn with_view(mut self, app: &App) -> Self {
        self.view = Some(match app.room() {
            Some(room) => ViewSnapshot {
                room_id: Some(room.room_id.clone()),
                messages: room.messages.clone(),
                typing: room.typing.clone(),
            },
            None => ViewSnapshot::default(),
        });
        self
    }

    /// Set the joined room.
    #[must_use]
    pub fn with_room(mut self, room_id: &str, display_name: &str) -> Self {
        self.room_id = Some(room_id.to_string());
        self.display_name = Some(display_name.to_string());
        self
    }

    /// Set the typing set and the flags derived from it.
    #[must_use]
    pub fn with_typing<S: Into<String>>(mut self, peers: impl IntoIterator<Item = S>) -> Self {
        self.typing = peers.into_iter().map(Into::into).collect();
        self.someone_typing = !self.typing.is_empty();
        self.decay_pending = !self.typing.is_empty();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot() {
        let snapshot = SystemSnapshot::empty();
        assert!(snapshot.clients.is_empty());
    }

    #[test]
    fn client_snapshot_builder() {
        let client = ClientSnapshot::new(42).with_room("12345", "alice").with_typing(["bob"]);

        assert_eq!(client.id, 42);
        assert_eq!(client.room_id.as_deref(), Some("12345"));
        assert_eq!(client.typing, vec!["bob".to_string()]);
        assert!(client.someone_typing);
        assert!(client.decay_pending);
    }
}
