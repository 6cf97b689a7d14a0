//! Property-based tests for App state machine.
//!
//! Tests verify that input and action invariants hold under arbitrary event
//! sequences.

use huddle_app::{App, AppAction, AppEvent, ConnectionState, KeyInput};
use huddle_proto::ChatMessage;
use proptest::prelude::*;

/// Generate random characters for input, including multi-byte ones.
fn input_char() -> impl Strategy<Value = char> {
    prop_oneof![
        8 => prop::char::range(' ', '~'),
        1 => prop::sample::select(vec!['é', 'ü', '✓', '日']),
    ]
}

/// Generate random key inputs. Escape is left out so sequences keep going.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => input_char().prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
    ]
}

/// Generate random app events.
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        8 => key_strategy().prop_map(AppEvent::Key),
        1 => Just(AppEvent::Tick),
        1 => Just(AppEvent::Connected),
        1 => Just(AppEvent::Disconnected),
        1 => Just(AppEvent::RoomJoined { room_id: "12345".into(), display_name: "alice".into() }),
        1 => Just(AppEvent::RoomLeft { room_id: "12345".into() }),
        1 => Just(AppEvent::MessageReceived {
            message: ChatMessage::new("bob", "hi", "9:00:00 AM", "12345"),
            local: false,
        }),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
    ]
}

fn app() -> App {
    App::new("https://chat.example.com".into(), Some("alice".into()))
}

proptest! {
    /// Cursor stays within buffer bounds.
    #[test]
    fn prop_cursor_within_bounds(keys in prop::collection::vec(key_strategy(), 0..100)) {
        let mut app = app();

        for key in keys {
            let _ = app.handle(AppEvent::Key(key));

            let cursor = app.input().cursor();
            let len = app.input().buffer().chars().count();
            prop_assert!(cursor <= len, "cursor {} exceeds buffer length {}", cursor, len);
        }
    }

    /// Typing then Enter empties the buffer.
    #[test]
    fn prop_input_buffer_clears_on_enter(chars in prop::collection::vec(input_char(), 1..20)) {
        let mut app = app();

        for c in &chars {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(*c)));
        }
        prop_assert_eq!(app.input().buffer().chars().count(), chars.len());

        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        prop_assert!(app.input().buffer().is_empty());
    }

    /// Protocol actions are only requested when they can succeed.
    ///
    /// Typing, sending and leaving need a joined room and a live connection.
    /// Joining needs no room.
    #[test]
    fn prop_actions_respect_state(events in prop::collection::vec(event_strategy(), 0..80)) {
        let mut app = app();

        for event in events {
            let joined = app.room().is_some();
            let connected = app.connection_state() == ConnectionState::Connected;
            let actions = app.handle(event.clone());

            for action in &actions {
                match action {
                    AppAction::NotifyTyping | AppAction::SendMessage { .. } => {
                        prop_assert!(joined && connected, "{:?} after {:?}", action, event);
                    },
                    AppAction::JoinRoom { .. } => {
                        prop_assert!(!joined, "{:?} after {:?}", action, event);
                    },
                    AppAction::LeaveRoom => {
                        prop_assert!(joined && connected, "{:?} after {:?}", action, event);
                    },
                    AppAction::Render | AppAction::Quit | AppAction::Connect { .. } => {},
                }
            }
        }
    }

    /// Leaving always empties the room view.
    #[test]
    fn prop_room_left_clears_view(events in prop::collection::vec(event_strategy(), 0..40)) {
        let mut app = app();
        for event in events {
            let _ = app.handle(event);
        }

        let _ = app.handle(AppEvent::RoomLeft { room_id: "12345".into() });
        prop_assert!(app.room().is_none());
    }
}
