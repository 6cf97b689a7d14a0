//! Client state machine.
//!
//! The `Client` owns the session and presence for one chat room and keeps the
//! two consistent: leaving the room clears presence before the leave returns,
//! and typing notices are only tracked while a room is joined.

use std::time::Duration;

use huddle_core::{
    DEFAULT_DECAY_WINDOW, DecayPolicy, Environment, Presence, Session, SessionError,
    format_time_of_day,
};
use huddle_proto::{ChatMessage, InboundEvent, OutboundEvent, PeerTyping};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent},
};

/// Client configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// How long a typing indicator lasts without a fresh notice.
    pub decay_window: Duration,
    /// Whether typing indicators decay together or per author.
    pub decay_policy: DecayPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { decay_window: DEFAULT_DECAY_WINDOW, decay_policy: DecayPolicy::default() }
    }
}

/// Client for a single-room chat server.
pub struct Client<E: Environment> {
    /// Environment for time.
    env: E,

    /// Whether the transport currently has a connection.
    connected: bool,

    /// Room membership and message log.
    session: Session,

    /// Typing peers in the joined room.
    presence: Presence<E::Instant>,
}

impl<E: Environment> Client<E> {
    /// Create a disconnected client that has not joined a room.
    pub fn new(env: E, config: ClientConfig) -> Self {
        Self {
            env,
            connected: false,
            session: Session::new(),
            presence: Presence::new(config.decay_policy, config.decay_window),
        }
    }

    /// Whether a transport connection exists.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Presence state.
    pub fn presence(&self) -> &Presence<E::Instant> {
        &self.presence
    }

    /// When the next presence timer fires. `None` if nothing is pending.
    pub fn next_deadline(&self) -> Option<E::Instant> {
        self.presence.next_deadline()
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connected => Ok(self.handle_connected()),
            ClientEvent::Disconnected => {
                tracing::debug!(joined = self.session.is_joined(), "transport disconnected");
                self.connected = false;
                Ok(Vec::new())
            },
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
            ClientEvent::JoinRoom { room_id, display_name } => {
                self.handle_join_room(room_id, display_name)
            },
            ClientEvent::LeaveRoom => self.handle_leave_room(),
            ClientEvent::SendMessage { body } => self.handle_send_message(body),
            ClientEvent::LocalTyping => self.handle_local_typing(),
            ClientEvent::Inbound(InboundEvent::ReceiveMessage(message)) => {
                Ok(self.handle_message_received(message))
            },
            ClientEvent::Inbound(InboundEvent::HearTyping(typing)) => {
                Ok(self.handle_peer_typing(&typing))
            },
        }
    }

    fn require_connected(&self) -> Result<(), ClientError> {
        if self.connected { Ok(()) } else { Err(ClientError::NotConnected) }
    }

    /// A fresh connection has no room on the server side, so a room kept
    /// across a disconnect is joined again.
    fn handle_connected(&mut self) -> Vec<ClientAction> {
        self.connected = true;

        match self.session.room_id() {
            Some(room_id) => {
                tracing::debug!(room = %room_id, "reconnected, rejoining room");
                vec![ClientAction::Emit(OutboundEvent::JoinRoom { room_id: room_id.to_string() })]
            },
            None => {
                tracing::debug!("transport connected");
                Vec::new()
            },
        }
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        if self.presence.tick(now) {
            tracing::trace!("typing indicators decayed");
            vec![self.presence_changed()]
        } else {
            Vec::new()
        }
    }

    fn handle_join_room(
        &mut self,
        room_id: String,
        display_name: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.require_connected()?;

        let emit = self.session.join(room_id.clone(), display_name.clone())?;
        Ok(vec![ClientAction::Emit(emit), ClientAction::RoomJoined { room_id, display_name }])
    }

    fn handle_leave_room(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        self.require_connected()?;

        let room_id = self.session.room_id().unwrap_or_default().to_string();
        let was_typing = self.presence.is_someone_typing();
        let emit = self.session.leave()?;
        self.presence.clear();

        let mut actions = vec![ClientAction::Emit(emit), ClientAction::RoomLeft { room_id }];
        if was_typing {
            actions.push(ClientAction::PresenceChanged { typing: Vec::new() });
        }
        Ok(actions)
    }

    fn handle_send_message(&mut self, body: String) -> Result<Vec<ClientAction>, ClientError> {
        self.require_connected()?;

        let timestamp = format_time_of_day(self.env.time_of_day());
        let emit = self.session.send_message(body, timestamp)?;

        let mut actions = vec![ClientAction::Emit(emit)];
        if let Some(message) = self.session.messages().last() {
            actions.push(ClientAction::DeliverMessage { message: message.clone(), local: true });
        }
        Ok(actions)
    }

    fn handle_local_typing(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        self.require_connected()?;

        let (Some(room_id), Some(author)) = (self.session.room_id(), self.session.display_name())
        else {
            return Err(SessionError::NotJoined.into());
        };

        Ok(vec![ClientAction::Emit(self.presence.local_typing(author, room_id))])
    }

    fn handle_message_received(&mut self, message: ChatMessage) -> Vec<ClientAction> {
        match self.session.on_message_received(message.clone()) {
            Ok(()) => vec![ClientAction::DeliverMessage { message, local: false }],
            Err(e) => {
                tracing::debug!(error = %e, author = %message.author, "dropping inbound message");
                Vec::new()
            },
        }
    }

    fn handle_peer_typing(&mut self, typing: &PeerTyping) -> Vec<ClientAction> {
        if !self.session.is_joined() {
            tracing::debug!(author = %typing.author, "dropping typing notice outside a room");
            return Vec::new();
        }

        if self.presence.on_peer_typing(typing, self.env.now()) {
            vec![self.presence_changed()]
        } else {
            Vec::new()
        }
    }

    fn presence_changed(&self) -> ClientAction {
        ClientAction::PresenceChanged {
            typing: self.presence.typing_peers().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Instant,
    };

    use huddle_core::NaiveTime;

    use super::*;

    /// Environment with a clock that only moves when told to.
    #[derive(Clone)]
    struct ManualEnv {
        base: Instant,
        offset_ms: Arc<AtomicU64>,
    }

    impl ManualEnv {
        fn new() -> Self {
            Self { base: Instant::now(), offset_ms: Arc::new(AtomicU64::new(0)) }
        }

        fn advance(&self, by: Duration) {
            let ms = u64::try_from(by.as_millis()).unwrap();
            self.offset_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Environment for ManualEnv {
        type Instant = Instant;

        fn now(&self) -> Instant {
            self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn time_of_day(&self) -> NaiveTime {
            NaiveTime::from_hms_opt(14, 5, 9).unwrap()
        }
    }

    fn connected() -> (Client<ManualEnv>, ManualEnv) {
        let env = ManualEnv::new();
        let mut client = Client::new(env.clone(), ClientConfig::default());
        client.handle(ClientEvent::Connected).unwrap();
        (client, env)
    }

    fn joined(room: &str, name: &str) -> (Client<ManualEnv>, ManualEnv) {
        let (mut client, env) = connected();
        client
            .handle(ClientEvent::JoinRoom { room_id: room.into(), display_name: name.into() })
            .unwrap();
        (client, env)
    }

    fn hear(author: &str) -> ClientEvent<Instant> {
        ClientEvent::Inbound(InboundEvent::HearTyping(PeerTyping::new(author)))
    }

    #[test]
    fn operations_require_connection() {
        let mut client = Client::new(ManualEnv::new(), ClientConfig::default());

        let err = client
            .handle(ClientEvent::JoinRoom { room_id: "r".into(), display_name: "alice".into() })
            .unwrap_err();

        assert_eq!(err, ClientError::NotConnected);
        assert!(!client.session().is_joined());
    }

    #[test]
    fn join_emits_and_reports() {
        let (mut client, _env) = connected();
        let actions = client
            .handle(ClientEvent::JoinRoom { room_id: "12345".into(), display_name: "alice".into() })
            .unwrap();

        assert!(matches!(
            actions.as_slice(),
            [
                ClientAction::Emit(OutboundEvent::JoinRoom { room_id }),
                ClientAction::RoomJoined { .. },
            ] if room_id == "12345"
        ));
    }

    #[test]
    fn send_stamps_local_time_and_delivers_locally() {
        let (mut client, _env) = joined("12345", "alice");
        let actions = client.handle(ClientEvent::SendMessage { body: "hello".into() }).unwrap();

        let expected = ChatMessage::new("alice", "hello", "2:05:09 PM", "12345");
        assert_eq!(
            actions,
            vec![
                ClientAction::Emit(OutboundEvent::SendMessage(expected.clone())),
                ClientAction::DeliverMessage { message: expected, local: true },
            ]
        );
        assert_eq!(client.session().messages().len(), 1);
    }

    #[test]
    fn send_while_not_joined_emits_nothing() {
        let (mut client, _env) = connected();
        let err = client.handle(ClientEvent::SendMessage { body: "hello".into() }).unwrap_err();

        assert_eq!(err, ClientError::Session(SessionError::NotJoined));
        assert!(client.session().messages().is_empty());
    }

    #[test]
    fn local_typing_emits_notice() {
        let (mut client, _env) = joined("12345", "alice");
        let actions = client.handle(ClientEvent::LocalTyping).unwrap();

        assert!(matches!(
            actions.as_slice(),
            [ClientAction::Emit(OutboundEvent::Typing(notice))]
                if notice.author == "alice" && notice.room_id == "12345"
        ));
        assert!(!client.presence().is_someone_typing());
    }

    #[test]
    fn leave_clears_presence_synchronously() {
        let (mut client, _env) = joined("12345", "alice");
        client.handle(hear("bob")).unwrap();
        assert!(client.presence().is_someone_typing());

        let actions = client.handle(ClientEvent::LeaveRoom).unwrap();

        assert!(matches!(
            actions.as_slice(),
            [
                ClientAction::Emit(OutboundEvent::LeaveRoom { .. }),
                ClientAction::RoomLeft { room_id },
                ClientAction::PresenceChanged { typing },
            ] if room_id == "12345" && typing.is_empty()
        ));
        assert!(!client.presence().is_someone_typing());
        assert_eq!(client.next_deadline(), None);
        assert_eq!(client.session(), &Session::new());
    }

    #[test]
    fn typing_outside_room_is_ignored() {
        let (mut client, _env) = connected();
        let actions = client.handle(hear("bob")).unwrap();

        assert!(actions.is_empty());
        assert!(!client.presence().is_someone_typing());
    }

    #[test]
    fn tick_decays_presence() {
        let (mut client, env) = joined("12345", "alice");

        let actions = client.handle(hear("bob")).unwrap();
        assert_eq!(actions, vec![ClientAction::PresenceChanged { typing: vec!["bob".into()] }]);

        env.advance(Duration::from_secs(4));
        assert!(client.handle(ClientEvent::Tick { now: env.now() }).unwrap().is_empty());

        env.advance(Duration::from_secs(1));
        let actions = client.handle(ClientEvent::Tick { now: env.now() }).unwrap();
        assert_eq!(actions, vec![ClientAction::PresenceChanged { typing: vec![] }]);
    }

    #[test]
    fn repeat_typing_resets_without_change() {
        let (mut client, env) = joined("12345", "alice");
        client.handle(hear("bob")).unwrap();

        env.advance(Duration::from_secs(3));
        let actions = client.handle(hear("bob")).unwrap();

        assert!(actions.is_empty());
        assert_eq!(client.next_deadline(), Some(env.now() + DEFAULT_DECAY_WINDOW));
    }

    #[test]
    fn inbound_messages_are_filtered_by_room() {
        let (mut client, _env) = joined("12345", "alice");

        let foreign = ChatMessage::new("bob", "hi", "t", "other");
        let ours = ChatMessage::new("bob", "hi", "t", "12345");

        let dropped =
            client.handle(ClientEvent::Inbound(InboundEvent::ReceiveMessage(foreign))).unwrap();
        let kept =
            client.handle(ClientEvent::Inbound(InboundEvent::ReceiveMessage(ours.clone()))).unwrap();

        assert!(dropped.is_empty());
        assert_eq!(kept, vec![ClientAction::DeliverMessage { message: ours, local: false }]);
    }

    #[test]
    fn disconnect_keeps_room_but_blocks_sends() {
        let (mut client, _env) = joined("12345", "alice");
        client.handle(ClientEvent::Disconnected).unwrap();

        assert!(client.session().is_joined());
        assert_eq!(
            client.handle(ClientEvent::SendMessage { body: "x".into() }),
            Err(ClientError::NotConnected)
        );
    }

    #[test]
    fn reconnect_rejoins_kept_room() {
        let (mut client, _env) = joined("12345", "alice");
        client.handle(ClientEvent::Disconnected).unwrap();

        let actions = client.handle(ClientEvent::Connected).unwrap();

        assert_eq!(actions, vec![ClientAction::Emit(OutboundEvent::JoinRoom {
            room_id: "12345".into()
        })]);
    }
}
