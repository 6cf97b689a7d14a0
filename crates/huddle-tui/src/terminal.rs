//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Network uses Socket.IO over
//! WebSocket.

use std::{
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use huddle_app::{App, AppEvent, Driver, KeyInput};
use huddle_client::transport::{self, ConnectedClient, TransportConfig, TransportError};
use huddle_proto::{InboundEvent, OutboundEvent};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;

use crate::ui;

/// How long to wait for input before yielding a tick.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the room
/// server connection.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    connection: Option<ConnectedClient>,
    transport: TransportConfig,
}

impl TerminalDriver {
    /// Take over the terminal.
    ///
    /// The server URL given to [`Driver::connect`] replaces the endpoint in
    /// `transport`; the remaining settings are kept.
    pub fn new(transport: TransportConfig) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, connection: None, transport })
    }

    /// Convert a crossterm key event to `KeyInput`.
    ///
    /// Ctrl+C quits like Esc.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyInput::Esc)
            },
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn drop_connection(&mut self, reason: &str) {
        if let Some(conn) = self.connection.take() {
            tracing::info!(sid = conn.sid(), reason, "connection closed");
            conn.stop();
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    None => Ok(Some(AppEvent::Key(KeyInput::Esc))),
                    _ => Ok(None),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(TICK_INTERVAL) => Ok(Some(AppEvent::Tick)),
        }
    }

    async fn send(&mut self, event: OutboundEvent) -> Result<(), Self::Error> {
        let Some(conn) = &self.connection else {
            tracing::debug!(event = event.name(), "not connected, dropping outbound event");
            return Ok(());
        };

        if conn.to_server.send(event).await.is_err() {
            self.drop_connection("send channel closed");
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<InboundEvent> {
        let result = self.connection.as_mut()?.from_server.try_recv();
        match result {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.drop_connection("server connection ended");
                None
            },
        }
    }

    async fn connect(&mut self, server_url: &str) -> Result<(), Self::Error> {
        self.drop_connection("reconnecting");

        let config = TransportConfig { endpoint: server_url.to_string(), ..self.transport.clone() };
        let client = transport::connect(&config).await?;
        self.connection = Some(client);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.drop_connection("shutting down");
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent { code, modifiers, kind: KeyEventKind::Press, state: KeyEventState::NONE }
    }

    #[test]
    fn converts_editing_keys() {
        assert_eq!(
            TerminalDriver::convert_key(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            Some(KeyInput::Char('x'))
        );
        assert_eq!(
            TerminalDriver::convert_key(key(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(KeyInput::Backspace)
        );
        assert_eq!(TerminalDriver::convert_key(key(KeyCode::F(1), KeyModifiers::NONE)), None);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            TerminalDriver::convert_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyInput::Esc)
        );
    }
}
