//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use huddle_proto::{InboundEvent, OutboundEvent};

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production TUI and simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, Socket.IO over WebSocket
/// - **Simulation**: scripted input and an in-process room server
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync;

    /// Poll for the next input event.
    ///
    /// Returns an event or `None` if nothing happened. Implementations should
    /// not block much longer than a UI tick so presence timers fire on time.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Send an event to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the send fails in a way the app cannot recover
    /// from. A dropped connection is reported through
    /// [`is_connected`](Driver::is_connected) instead.
    fn send(&mut self, event: OutboundEvent)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next event already received from the server.
    ///
    /// Returns `None` if nothing is waiting or the connection is closed.
    fn recv(&mut self) -> impl Future<Output = Option<InboundEvent>> + Send;

    /// Establish connection to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if connection cannot be established.
    fn connect(&mut self, server_url: &str)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Check if connected to server.
    fn is_connected(&self) -> bool;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop the connection and clean up resources.
    fn stop(&mut self);
}
