//! Room session state machine.
//!
//! Owns room membership, the local display name, and the ordered log of
//! messages visible to the user.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────┐   join    ┌────────┐
//! │ NotJoined │──────────>│ Joined │──┐ send / message received
//! └───────────┘           └────────┘<─┘
//!       ^                      │
//!       └──────── leave ───────┘
//! ```
//!
//! Join and leave are optimistic: the outbound intent is returned and local
//! state changes immediately, without waiting for the server. Sent messages
//! are appended to the log at once and never wait for an echo.
//!
//! # Invariants
//!
//! - The message log is empty whenever the session is not joined.
//! - The log is append-only while joined. Messages are never reordered or
//!   deduplicated; arrival order is display order.
//! - A rejected operation changes nothing and emits nothing.

use chrono::NaiveTime;
use huddle_proto::{ChatMessage, OutboundEvent};

use crate::error::SessionError;

/// Membership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No room joined.
    NotJoined,
    /// Joined to a room; sending and receiving are possible.
    Joined,
}

/// Room session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Joined room. `None` when not joined.
    room_id: Option<String>,
    /// Display name chosen at join. `None` when not joined.
    display_name: Option<String>,
    /// Messages in arrival order.
    messages: Vec<ChatMessage>,
}

impl Session {
    /// Create a session in [`SessionState::NotJoined`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current membership state.
    pub fn state(&self) -> SessionState {
        if self.room_id.is_some() { SessionState::Joined } else { SessionState::NotJoined }
    }

    /// Whether a room is joined.
    pub fn is_joined(&self) -> bool {
        self.room_id.is_some()
    }

    /// Joined room. `None` if not joined.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Display name for this session. `None` if not joined.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Message log in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Join `room_id` as `display_name`.
    ///
    /// Returns the `join_room` intent. The room counts as joined as soon as
    /// this returns.
    ///
    /// # Errors
    ///
    /// - `SessionError::AlreadyJoined` if a room is already joined
    /// - `SessionError::EmptyRoomId` / `SessionError::EmptyDisplayName` for
    ///   empty arguments
    pub fn join(
        &mut self,
        room_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<OutboundEvent, SessionError> {
        if let Some(current) = &self.room_id {
            return Err(SessionError::AlreadyJoined { room_id: current.clone() });
        }

        let room_id = room_id.into();
        let display_name = display_name.into();
        if room_id.is_empty() {
            return Err(SessionError::EmptyRoomId);
        }
        if display_name.is_empty() {
            return Err(SessionError::EmptyDisplayName);
        }

        tracing::debug!(room = %room_id, name = %display_name, "joining room");

        self.room_id = Some(room_id.clone());
        self.display_name = Some(display_name);
        Ok(OutboundEvent::JoinRoom { room_id })
    }

    /// Leave the joined room.
    ///
    /// Returns the `leave_room` intent and resets the session to its initial
    /// state unconditionally; no server confirmation is awaited.
    ///
    /// # Errors
    ///
    /// - `SessionError::NotJoined` if no room is joined
    pub fn leave(&mut self) -> Result<OutboundEvent, SessionError> {
        let room_id = self.room_id.take().ok_or(SessionError::NotJoined)?;

        tracing::debug!(room = %room_id, dropped = self.messages.len(), "leaving room");

        self.display_name = None;
        self.messages.clear();
        Ok(OutboundEvent::LeaveRoom { room_id })
    }

    /// Send `body` to the joined room.
    ///
    /// The message is stamped with the display name, room, and `timestamp`,
    /// appended to the log immediately, and returned as a `send_message`
    /// intent.
    ///
    /// # Errors
    ///
    /// - `SessionError::NotJoined` if no room is joined
    /// - `SessionError::EmptyBody` if `body` is empty
    pub fn send_message(
        &mut self,
        body: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<OutboundEvent, SessionError> {
        let (Some(room_id), Some(author)) = (&self.room_id, &self.display_name) else {
            return Err(SessionError::NotJoined);
        };

        let body = body.into();
        if body.is_empty() {
            return Err(SessionError::EmptyBody);
        }

        let message = ChatMessage::new(author.clone(), body, timestamp, room_id.clone());
        self.messages.push(message.clone());
        Ok(OutboundEvent::SendMessage(message))
    }

    /// Append a message delivered by the server.
    ///
    /// # Errors
    ///
    /// - `SessionError::NotJoined` if no room is joined
    /// - `SessionError::ForeignRoom` if the message names a different room
    pub fn on_message_received(&mut self, message: ChatMessage) -> Result<(), SessionError> {
        let joined = self.room_id.as_deref().ok_or(SessionError::NotJoined)?;
        if message.room_id != joined {
            return Err(SessionError::ForeignRoom {
                joined: joined.to_string(),
                received: message.room_id,
            });
        }

        self.messages.push(message);
        Ok(())
    }
}

/// Render a time of day the way message stamps are displayed, e.g.
/// `3:04:05 PM`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%-I:%M:%S %p").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn joined(room: &str, name: &str) -> Session {
        let mut session = Session::new();
        session.join(room, name).unwrap();
        session
    }

    #[test]
    fn new_session_is_not_joined() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::NotJoined);
        assert!(session.messages().is_empty());
        assert_eq!(session.room_id(), None);
    }

    #[test]
    fn join_emits_intent_and_sets_state() {
        let mut session = Session::new();
        let event = session.join("12345", "alice").unwrap();

        assert_eq!(event, OutboundEvent::JoinRoom { room_id: "12345".into() });
        assert_eq!(session.state(), SessionState::Joined);
        assert_eq!(session.room_id(), Some("12345"));
        assert_eq!(session.display_name(), Some("alice"));
    }

    #[test]
    fn join_rejects_empty_fields() {
        let mut session = Session::new();

        assert_eq!(session.join("", "alice"), Err(SessionError::EmptyRoomId));
        assert_eq!(session.join("12345", ""), Err(SessionError::EmptyDisplayName));
        assert_eq!(session, Session::new());
    }

    #[test]
    fn join_while_joined_is_rejected() {
        let mut session = joined("a", "alice");
        let before = session.clone();

        let err = session.join("b", "bob").unwrap_err();

        assert_eq!(err, SessionError::AlreadyJoined { room_id: "a".into() });
        assert_eq!(session, before);
    }

    #[test]
    fn leave_resets_to_initial_state() {
        let mut session = joined("12345", "alice");
        session.send_message("hello", "1:00:00 PM").unwrap();

        let event = session.leave().unwrap();

        assert_eq!(event, OutboundEvent::LeaveRoom { room_id: "12345".into() });
        assert_eq!(session, Session::new());
    }

    #[test]
    fn leave_without_room_is_rejected() {
        let mut session = Session::new();
        assert_eq!(session.leave(), Err(SessionError::NotJoined));
    }

    #[test]
    fn send_appends_immediately() {
        let mut session = joined("12345", "alice");
        let event = session.send_message("hello", "1:00:00 PM").unwrap();

        let expected = ChatMessage::new("alice", "hello", "1:00:00 PM", "12345");
        assert_eq!(session.messages(), [expected.clone()]);
        assert_eq!(event, OutboundEvent::SendMessage(expected));
    }

    #[test]
    fn send_while_not_joined_changes_nothing() {
        let mut session = Session::new();

        assert_eq!(session.send_message("hello", "1:00:00 PM"), Err(SessionError::NotJoined));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn send_empty_body_is_rejected() {
        let mut session = joined("12345", "alice");
        assert_eq!(session.send_message("", "1:00:00 PM"), Err(SessionError::EmptyBody));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn received_messages_interleave_with_local_sends() {
        let mut session = joined("r", "alice");
        let m1 = ChatMessage::new("bob", "one", "t1", "r");
        let m2 = ChatMessage::new("carol", "two", "t2", "r");

        session.on_message_received(m1.clone()).unwrap();
        session.send_message("mine", "t3").unwrap();
        session.on_message_received(m2.clone()).unwrap();

        let bodies: Vec<_> = session.messages().iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["one", "mine", "two"]);
    }

    #[test]
    fn duplicate_deliveries_are_kept() {
        let mut session = joined("r", "alice");
        let message = ChatMessage::new("bob", "same", "t", "r");

        session.on_message_received(message.clone()).unwrap();
        session.on_message_received(message).unwrap();

        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn foreign_room_messages_are_dropped() {
        let mut session = joined("r", "alice");
        let err = session.on_message_received(ChatMessage::new("bob", "x", "t", "other"));

        assert_eq!(
            err,
            Err(SessionError::ForeignRoom { joined: "r".into(), received: "other".into() })
        );
        assert!(session.messages().is_empty());
    }

    #[test]
    fn messages_before_join_are_dropped() {
        let mut session = Session::new();
        let err = session.on_message_received(ChatMessage::new("bob", "x", "t", "r"));

        assert_eq!(err, Err(SessionError::NotJoined));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn time_of_day_format() {
        let afternoon = NaiveTime::from_hms_opt(15, 4, 5).unwrap();
        let morning = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let midnight = NaiveTime::from_hms_opt(0, 0, 7).unwrap();

        assert_eq!(format_time_of_day(afternoon), "3:04:05 PM");
        assert_eq!(format_time_of_day(morning), "9:30:00 AM");
        assert_eq!(format_time_of_day(midnight), "12:00:07 AM");
    }
}
