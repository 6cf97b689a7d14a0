//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the Sans-IO [`huddle_client::Client`] and adapts it to
//! the application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`] into client events.
//! - Accumulates outgoing [`huddle_proto::OutboundEvent`]s to be sent by the
//!   driver in the next I/O cycle.
//! - Interprets results from the client and converts them back into
//!   [`crate::AppEvent`]s to update the UI.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic simulation.

use huddle_client::{Client, ClientAction, ClientConfig, ClientError, ClientEvent, Environment};
use huddle_proto::{InboundEvent, OutboundEvent};

use crate::{AppAction, AppEvent};

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and simulation.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<OutboundEvent>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment and client settings.
    pub fn new(env: E, config: ClientConfig) -> Self {
        Self { client: Client::new(env, config), outgoing: Vec::new() }
    }

    /// Underlying client, for inspection.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::JoinRoom { room_id, display_name } => {
                ClientEvent::JoinRoom { room_id, display_name }
            },
            AppAction::LeaveRoom => ClientEvent::LeaveRoom,
            AppAction::SendMessage { body } => ClientEvent::SendMessage { body },
            AppAction::NotifyTyping => ClientEvent::LocalTyping,
            AppAction::Render | AppAction::Quit | AppAction::Connect { .. } => return vec![],
        };
        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Transport connection established.
    pub fn handle_connected(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Connected);
        let mut events = vec![AppEvent::Connected];
        events.extend(self.handle_client_result(result));
        events
    }

    /// Transport connection lost.
    pub fn handle_disconnected(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Disconnected);
        let mut events = vec![AppEvent::Disconnected];
        events.extend(self.handle_client_result(result));
        events
    }

    /// Handle an event from the server.
    pub fn handle_inbound(&mut self, event: InboundEvent) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Inbound(event));
        self.handle_client_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// When the client next needs a tick. `None` if nothing is pending.
    pub fn next_deadline(&self) -> Option<E::Instant> {
        self.client.next_deadline()
    }

    /// Take pending outgoing events.
    pub fn take_outgoing(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => {
                tracing::debug!(error = %e, "client rejected action");
                vec![AppEvent::Error { message: e.to_string() }]
            },
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Emit(event) => self.outgoing.push(event),
                ClientAction::RoomJoined { room_id, display_name } => {
                    events.push(AppEvent::RoomJoined { room_id, display_name });
                },
                ClientAction::RoomLeft { room_id } => events.push(AppEvent::RoomLeft { room_id }),
                ClientAction::DeliverMessage { message, local } => {
                    events.push(AppEvent::MessageReceived { message, local });
                },
                ClientAction::PresenceChanged { typing } => {
                    events.push(AppEvent::PresenceChanged { typing });
                },
            }
        }

        events
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{future::Future, time::Duration};

    use huddle_client::Environment;
    use huddle_core::DecayPolicy;
    use huddle_proto::{ChatMessage, PeerTyping};

    use super::*;

    #[derive(Clone)]
    struct TestEnv;

    impl Environment for TestEnv {
        type Instant = std::time::Instant;

        fn now(&self) -> std::time::Instant {
            std::time::Instant::now()
        }

        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn time_of_day(&self) -> huddle_core::NaiveTime {
            huddle_core::NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        }
    }

    fn joined_bridge() -> Bridge<TestEnv> {
        let mut bridge = Bridge::new(TestEnv, ClientConfig::default());
        let _ = bridge.handle_connected();
        let _ = bridge.process_app_action(AppAction::JoinRoom {
            room_id: "12345".into(),
            display_name: "alice".into(),
        });
        let _ = bridge.take_outgoing();
        bridge
    }

    #[test]
    fn join_produces_room_joined_and_outgoing() {
        let mut bridge = Bridge::new(TestEnv, ClientConfig::default());
        let _ = bridge.handle_connected();

        let events = bridge.process_app_action(AppAction::JoinRoom {
            room_id: "12345".into(),
            display_name: "alice".into(),
        });

        assert!(events.iter().any(|e| matches!(e, AppEvent::RoomJoined { .. })));
        assert_eq!(bridge.take_outgoing(), vec![OutboundEvent::JoinRoom {
            room_id: "12345".into()
        }]);
    }

    #[test]
    fn send_message_shows_own_message_immediately() {
        let mut bridge = joined_bridge();

        let events = bridge.process_app_action(AppAction::SendMessage { body: "hello".into() });

        assert_eq!(events, vec![AppEvent::MessageReceived {
            message: ChatMessage::new("alice", "hello", "9:00:00 AM", "12345"),
            local: true,
        }]);
        assert_eq!(bridge.take_outgoing().len(), 1);
    }

    #[test]
    fn send_without_connection_produces_error() {
        let mut bridge: Bridge<TestEnv> = Bridge::new(TestEnv, ClientConfig::default());
        let events = bridge.process_app_action(AppAction::SendMessage { body: "hello".into() });

        assert!(matches!(events.as_slice(), [AppEvent::Error { .. }]));
        assert!(bridge.take_outgoing().is_empty());
    }

    #[test]
    fn inbound_typing_becomes_presence_event() {
        let mut bridge = joined_bridge();
        let events = bridge.handle_inbound(InboundEvent::HearTyping(PeerTyping::new("bob")));

        assert_eq!(events, vec![AppEvent::PresenceChanged { typing: vec!["bob".into()] }]);
        assert!(bridge.next_deadline().is_some());
    }

    #[test]
    fn per_author_policy_is_passed_through() {
        let config = ClientConfig { decay_policy: DecayPolicy::PerAuthor, ..ClientConfig::default() };
        let bridge = Bridge::new(TestEnv, config);

        assert_eq!(bridge.client().presence().policy(), DecayPolicy::PerAuthor);
    }
}
