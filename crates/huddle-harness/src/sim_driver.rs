//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`huddle_app::Runtime`] orchestration code runs in both production and
//! simulation. Input is scripted, the server is a [`SimServer`], and time is
//! a [`SimEnv`] virtual clock.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use huddle_app::{App, AppEvent, Driver, KeyInput};
use huddle_client::{Client, Environment};
use huddle_proto::{InboundEvent, OutboundEvent};

use crate::{
    ClientId, SimEnv, SimInstant, SimServer,
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    connection: Option<ClientId>,
    refuse_connect: bool,
    renders: usize,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`huddle_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
pub struct SimDriver {
    env: SimEnv,
    server: SimServer,
    state: Arc<Mutex<SharedState>>,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver that talks to `server` on `env`'s clock.
    pub fn new(env: SimEnv, server: SimServer) -> Self {
        Self { env, server, state: Arc::new(Mutex::new(SharedState::default())), invariants: None }
    }

    /// Enable invariant checking.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject key presses for `text`, followed by Enter.
    pub fn inject_line(&self, text: &str) {
        let mut state = self.lock();
        state.pending_events.extend(text.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        state.pending_events.push_back(AppEvent::Key(KeyInput::Enter));
    }

    /// Inject a tick event.
    pub fn inject_tick(&self) {
        self.lock().pending_events.push_back(AppEvent::Tick);
    }

    /// Check if there are pending input events or inbound server events.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        let inbound = state.connection.is_some_and(|id| self.server.has_inbound(id));
        !state.pending_events.is_empty() || inbound
    }

    /// Make subsequent connection attempts fail.
    pub fn refuse_connect(&self, refuse: bool) {
        self.lock().refuse_connect = refuse;
    }

    /// Drop the server connection, as if the network went away.
    pub fn drop_connection(&self) {
        if let Some(id) = self.lock().connection {
            self.server.disconnect(id);
        }
    }

    /// Server-side id of the current connection.
    pub fn connection_id(&self) -> Option<ClientId> {
        self.lock().connection
    }

    /// Number of renders requested so far.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    /// Check invariants against the client and its UI.
    pub fn check_invariants<E: Environment>(&self, client: &Client<E>, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            let id = self.connection_id().unwrap_or_default();
            let snapshot = SystemSnapshot::single(ClientSnapshot::from_client(id, client).with_view(app));
            registry.assert_all(&snapshot, context);
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    async fn send(&mut self, event: OutboundEvent) -> Result<(), Self::Error> {
        let id = self.lock().connection.ok_or_else(|| SimDriverError("not connected".into()))?;
        self.server.deliver(id, event);
        Ok(())
    }

    async fn recv(&mut self) -> Option<InboundEvent> {
        let id = self.lock().connection?;
        self.server.recv(id)
    }

    async fn connect(&mut self, server_url: &str) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.refuse_connect {
            return Err(SimDriverError(format!("connection to {server_url} refused")));
        }
        if let Some(old) = state.connection.take() {
            self.server.disconnect(old);
        }
        state.connection = Some(self.server.connect());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().connection.is_some_and(|id| self.server.is_connected(id))
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.lock().renders += 1;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(id) = self.lock().connection.take() {
            self.server.disconnect(id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn driver() -> SimDriver {
        SimDriver::new(SimEnv::new(), SimServer::new())
    }

    #[test]
    fn inject_event_queues_event() {
        let driver = driver();
        driver.inject_event(AppEvent::Tick);

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn inject_line_queues_keys_then_enter() {
        let mut driver = driver();
        driver.inject_line("hi");

        let mut events = Vec::new();
        while let Some(event) = driver.poll_event().await.unwrap() {
            events.push(event);
        }

        assert_eq!(events, vec![
            AppEvent::Key(KeyInput::Char('h')),
            AppEvent::Key(KeyInput::Char('i')),
            AppEvent::Key(KeyInput::Enter),
        ]);
    }

    #[tokio::test]
    async fn connect_and_stop() {
        let server = SimServer::new();
        let mut driver = SimDriver::new(SimEnv::new(), server.clone());

        driver.connect("sim").await.unwrap();
        let id = driver.connection_id().unwrap();
        assert!(driver.is_connected());
        assert!(server.is_connected(id));

        driver.stop();
        assert!(!driver.is_connected());
        assert!(!server.is_connected(id));
    }

    #[tokio::test]
    async fn refused_connect_is_an_error() {
        let mut driver = driver();
        driver.refuse_connect(true);

        assert!(driver.connect("sim").await.is_err());
        assert!(!driver.is_connected());
    }

    #[tokio::test]
    async fn dropped_connection_is_reported() {
        let mut driver = driver();
        driver.connect("sim").await.unwrap();

        driver.drop_connection();
        assert!(!driver.is_connected());
    }
}
