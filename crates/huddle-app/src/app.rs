//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the input line and turns key presses into commands.
//! - Mirrors the joined room (messages, typing peers) for rendering.
//! - Rejects join/send/leave up front when they cannot succeed, so no action
//!   is produced for them.
//! - Tracks high-level connection state for UI feedback.

use crate::{
    AppAction, AppEvent, ConnectionState, InputEdit, InputState, KeyInput, RoomView,
    commands::{self, Command},
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state.
    state: ConnectionState,
    /// Server URL for connection.
    server_url: String,
    /// Name used when `/join` is given without one. Updated on every join.
    default_name: Option<String>,
    /// Room to join as soon as the connection is up.
    auto_join: Option<String>,
    /// Joined room. `None` if not in a room.
    room: Option<RoomView>,
    /// Input line.
    input: InputState,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App for the given server.
    pub fn new(server_url: String, default_name: Option<String>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            server_url,
            default_name: default_name.filter(|name| !name.is_empty()),
            auto_join: None,
            room: None,
            input: InputState::new(),
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Join `room_id` automatically once connected.
    #[must_use]
    pub fn with_auto_join(mut self, room_id: impl Into<String>) -> Self {
        self.auto_join = Some(room_id.into());
        self
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Connecting => {
                self.state = ConnectionState::Connecting;
                vec![AppAction::Render]
            },
            AppEvent::Connected => {
                self.state = ConnectionState::Connected;
                self.status_message = Some(format!("Connected to {}", self.server_url));

                let mut actions = vec![AppAction::Render];
                if let Some(room_id) = self.auto_join.take() {
                    actions.extend(self.join_room(room_id, None));
                }
                actions
            },
            AppEvent::Disconnected => {
                self.state = ConnectionState::Disconnected;
                self.status_message = Some("Disconnected. /connect to retry".to_string());
                vec![AppAction::Render]
            },
            AppEvent::RoomJoined { room_id, display_name } => {
                self.status_message = Some(format!("Joined room {room_id} as {display_name}"));
                self.default_name = Some(display_name.clone());
                self.room = Some(RoomView::new(room_id, display_name));
                vec![AppAction::Render]
            },
            AppEvent::RoomLeft { room_id } => {
                self.room = None;
                self.status_message = Some(format!("Left room {room_id}"));
                vec![AppAction::Render]
            },
            AppEvent::MessageReceived { message, .. } => {
                if let Some(room) = self.room.as_mut().filter(|r| r.room_id == message.room_id) {
                    room.messages.push(message);
                }
                vec![AppAction::Render]
            },
            AppEvent::PresenceChanged { typing } => {
                if let Some(room) = self.room.as_mut() {
                    room.typing = typing;
                }
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Initiate connection to the server.
    pub fn connect(&mut self) -> Vec<AppAction> {
        self.state = ConnectionState::Connecting;
        vec![AppAction::Connect { server_url: self.server_url.clone() }, AppAction::Render]
    }

    /// Join a room, falling back to the default display name.
    pub fn join_room(&mut self, room_id: String, display_name: Option<String>) -> Vec<AppAction> {
        if let Some(room) = &self.room {
            let status = format!("Already in room {}; /leave first", room.room_id);
            return self.reject(status);
        }

        let display_name = display_name.or_else(|| self.default_name.clone()).unwrap_or_default();
        if room_id.is_empty() {
            return self.reject("Room code required: /join <room> [name]");
        }
        if display_name.is_empty() {
            return self.reject("Display name required: /join <room> <name>");
        }
        if self.state != ConnectionState::Connected {
            return self.reject("Not connected");
        }

        vec![AppAction::JoinRoom { room_id, display_name }, AppAction::Render]
    }

    /// Leave the joined room.
    pub fn leave_room(&mut self) -> Vec<AppAction> {
        if self.room.is_none() {
            return self.reject("Not in a room");
        }
        if self.state != ConnectionState::Connected {
            return self.reject("Not connected");
        }
        vec![AppAction::LeaveRoom, AppAction::Render]
    }

    /// Send a message to the joined room.
    pub fn send_message(&mut self, body: String) -> Vec<AppAction> {
        if body.is_empty() {
            return vec![];
        }
        if self.room.is_none() {
            return self.reject("Join a room first: /join <room> [name]");
        }
        if self.state != ConnectionState::Connected {
            return self.reject("Not connected");
        }
        vec![AppAction::SendMessage { body }, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Name used when `/join` omits one.
    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Joined room. `None` if not in a room.
    pub fn room(&self) -> Option<&RoomView> {
        self.room.as_ref()
    }

    /// Input line.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match self.input.apply(key) {
            InputEdit::Unchanged => vec![],
            InputEdit::Moved => vec![AppAction::Render],
            InputEdit::Edited => {
                if self.room.is_some() && self.state == ConnectionState::Connected {
                    vec![AppAction::NotifyTyping, AppAction::Render]
                } else {
                    vec![AppAction::Render]
                }
            },
            InputEdit::Submit(line) if line.is_empty() => vec![],
            InputEdit::Submit(line) => self.submit(&line),
            InputEdit::Cancel => self.quit(),
        }
    }

    fn submit(&mut self, line: &str) -> Vec<AppAction> {
        let mut actions = match commands::parse(line) {
            Command::Connect if self.state == ConnectionState::Connected => {
                self.reject("Already connected")
            },
            Command::Connect => self.connect(),
            Command::Join { room_id, display_name } => self.join_room(room_id, display_name),
            Command::Leave => self.leave_room(),
            Command::Quit => return self.quit(),
            Command::Message { body } => self.send_message(body),
            Command::Unknown { input } => self.reject(format!("Unknown command: {input}")),
            Command::InvalidArgs { command, error } => self.reject(format!("/{command}: {error}")),
        };

        // The input line was cleared, so redraw even if nothing else happened.
        if !actions.contains(&AppAction::Render) {
            actions.push(AppAction::Render);
        }
        actions
    }

    fn reject(&mut self, status: impl Into<String>) -> Vec<AppAction> {
        let status = status.into();
        tracing::debug!(%status, "rejected");
        self.status_message = Some(status);
        vec![AppAction::Render]
    }
}
