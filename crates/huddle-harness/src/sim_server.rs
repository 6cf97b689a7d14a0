//! In-process room server.
//!
//! `SimServer` plays the part of the room server for simulated clients. It
//! relays events the way the production server does:
//!
//! - `join_room` / `leave_room` move the sender in and out of a room. A
//!   connection is in at most one room.
//! - `send_message` is relayed as `receive_message` to everyone else in the
//!   sender's room. The sender never gets its own message back.
//! - `typing` is relayed as `hear_typing` to everyone else in the room.
//!
//! Handles are cheap clones over shared state so several drivers can talk to
//! one server.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use huddle_proto::{InboundEvent, OutboundEvent, PeerTyping};

/// Server-side connection identifier.
pub type ClientId = u64;

#[derive(Debug, Default)]
struct Connection {
    room: Option<String>,
    inbox: VecDeque<InboundEvent>,
}

#[derive(Debug, Default)]
struct ServerState {
    connections: BTreeMap<ClientId, Connection>,
    next_id: ClientId,
    /// Every event accepted from a client, in arrival order.
    log: Vec<(ClientId, OutboundEvent)>,
}

/// Simulated room server.
#[derive(Debug, Clone, Default)]
pub struct SimServer {
    state: Arc<Mutex<ServerState>>,
}

impl SimServer {
    /// Create a server with no connections.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept a new connection.
    pub fn connect(&self) -> ClientId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.connections.insert(id, Connection::default());
        tracing::debug!(client = id, "sim connection accepted");
        id
    }

    /// Drop a connection. It leaves its room and its inbox is discarded.
    pub fn disconnect(&self, id: ClientId) {
        if self.lock().connections.remove(&id).is_some() {
            tracing::debug!(client = id, "sim connection closed");
        }
    }

    /// Whether `id` is still connected.
    pub fn is_connected(&self, id: ClientId) -> bool {
        self.lock().connections.contains_key(&id)
    }

    /// Accept an event from a client and relay it.
    ///
    /// Events from unknown connections are ignored.
    pub fn deliver(&self, from: ClientId, event: OutboundEvent) {
        let mut state = self.lock();
        if !state.connections.contains_key(&from) {
            tracing::debug!(client = from, event = event.name(), "event from closed connection");
            return;
        }
        state.log.push((from, event.clone()));

        match event {
            OutboundEvent::JoinRoom { room_id } => {
                if let Some(conn) = state.connections.get_mut(&from) {
                    conn.room = Some(room_id);
                }
            },
            OutboundEvent::LeaveRoom { room_id } => {
                if let Some(conn) = state.connections.get_mut(&from)
                    && conn.room.as_deref() == Some(room_id.as_str())
                {
                    conn.room = None;
                }
            },
            OutboundEvent::SendMessage(message) => {
                let room_id = message.room_id.clone();
                state.broadcast(from, &room_id, &InboundEvent::ReceiveMessage(message));
            },
            OutboundEvent::Typing(notice) => {
                let event = InboundEvent::HearTyping(PeerTyping::new(notice.author));
                state.broadcast(from, &notice.room_id, &event);
            },
        }
    }

    /// Push an event straight into a client's inbox, bypassing relay rules.
    pub fn inject(&self, to: ClientId, event: InboundEvent) {
        if let Some(conn) = self.lock().connections.get_mut(&to) {
            conn.inbox.push_back(event);
        }
    }

    /// Next event waiting for `id`.
    pub fn recv(&self, id: ClientId) -> Option<InboundEvent> {
        self.lock().connections.get_mut(&id).and_then(|conn| conn.inbox.pop_front())
    }

    /// Whether events are waiting for `id`.
    pub fn has_inbound(&self, id: ClientId) -> bool {
        self.lock().connections.get(&id).is_some_and(|conn| !conn.inbox.is_empty())
    }

    /// Room `id` is currently in.
    pub fn room_of(&self, id: ClientId) -> Option<String> {
        self.lock().connections.get(&id).and_then(|conn| conn.room.clone())
    }

    /// Connections currently in `room_id`, in connection order.
    pub fn members(&self, room_id: &str) -> Vec<ClientId> {
        self.lock()
            .connections
            .iter()
            .filter(|(_, conn)| conn.room.as_deref() == Some(room_id))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Events received from clients so far.
    pub fn log(&self) -> Vec<(ClientId, OutboundEvent)> {
        self.lock().log.clone()
    }
}

impl ServerState {
    fn broadcast(&mut self, from: ClientId, room_id: &str, event: &InboundEvent) {
        let in_room = self.connections.get(&from).and_then(|conn| conn.room.as_deref());
        if in_room != Some(room_id) {
            tracing::debug!(client = from, room = room_id, "relay to a room the sender is not in");
            return;
        }

        for (id, conn) in &mut self.connections {
            if *id != from && conn.room.as_deref() == Some(room_id) {
                conn.inbox.push_back(event.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use huddle_proto::{ChatMessage, TypingNotice};

    use super::*;

    fn join(server: &SimServer, id: ClientId, room: &str) {
        server.deliver(id, OutboundEvent::JoinRoom { room_id: room.into() });
    }

    #[test]
    fn messages_reach_everyone_but_the_sender() {
        let server = SimServer::new();
        let (a, b, c) = (server.connect(), server.connect(), server.connect());
        join(&server, a, "r1");
        join(&server, b, "r1");
        join(&server, c, "r2");

        let message = ChatMessage::new("alice", "hi", "9:00:00 AM", "r1");
        server.deliver(a, OutboundEvent::SendMessage(message.clone()));

        assert_eq!(server.recv(b), Some(InboundEvent::ReceiveMessage(message)));
        assert_eq!(server.recv(a), None);
        assert_eq!(server.recv(c), None);
    }

    #[test]
    fn typing_is_relayed_as_hear_typing() {
        let server = SimServer::new();
        let (a, b) = (server.connect(), server.connect());
        join(&server, a, "r1");
        join(&server, b, "r1");

        server.deliver(a, OutboundEvent::Typing(TypingNotice {
            author: "alice".into(),
            room_id: "r1".into(),
        }));

        assert_eq!(server.recv(b), Some(InboundEvent::HearTyping(PeerTyping::new("alice"))));
    }

    #[test]
    fn leave_and_disconnect_remove_membership() {
        let server = SimServer::new();
        let (a, b) = (server.connect(), server.connect());
        join(&server, a, "r1");
        join(&server, b, "r1");
        assert_eq!(server.members("r1"), vec![a, b]);

        server.deliver(a, OutboundEvent::LeaveRoom { room_id: "r1".into() });
        assert_eq!(server.members("r1"), vec![b]);

        server.disconnect(b);
        assert!(server.members("r1").is_empty());
        assert!(!server.is_connected(b));
    }

    #[test]
    fn relay_requires_membership() {
        let server = SimServer::new();
        let (a, b) = (server.connect(), server.connect());
        join(&server, b, "r1");

        let message = ChatMessage::new("alice", "hi", "9:00:00 AM", "r1");
        server.deliver(a, OutboundEvent::SendMessage(message));

        assert_eq!(server.recv(b), None);
    }
}
