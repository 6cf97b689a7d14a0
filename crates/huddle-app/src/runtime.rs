//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to Client
//! - [`Driver`]: Platform-specific I/O

use huddle_client::{ClientConfig, Environment};

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Server URL.
    pub server_url: String,
    /// Default display name for `/join`.
    pub display_name: Option<String>,
    /// Room to join once connected.
    pub auto_join: Option<String>,
    /// Client settings.
    pub client: ClientConfig,
}

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment providing time
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
    /// Connection state last reported to the bridge.
    connected: bool,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E, config: RuntimeConfig) -> Self {
        let mut app = App::new(config.server_url, config.display_name);
        if let Some(room_id) = config.auto_join {
            app = app.with_auto_join(room_id);
        }
        let bridge = Bridge::new(env, config.client);
        Self { driver, app, bridge, connected: false }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Connects to the server
    /// 2. Polls for input events from the driver
    /// 3. Receives events from the server
    /// 4. Ticks presence timers
    ///
    /// The connection is stopped on exit whether or not a room is joined.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let mut quit = self.start().await?;
        while !quit {
            quit = self.process_cycle().await?;
        }

        self.driver.stop();
        Ok(())
    }

    /// Draw the first frame and make the initial connection attempt.
    ///
    /// Returns `true` if the application should quit.
    pub async fn start(&mut self) -> Result<bool, D::Error> {
        self.driver.render(&self.app)?;

        let actions = self.app.connect();
        self.process_actions(actions).await
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        while self.driver.is_connected() {
            let Some(inbound) = self.driver.recv().await else { break };
            let events = self.bridge.handle_inbound(inbound);
            self.send_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        if self.connected && !self.driver.is_connected() {
            tracing::info!("connection lost");
            self.connected = false;
            let events = self.bridge.handle_disconnected();
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        if self.process_bridge_events(events).await? {
            return Ok(true);
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Connect { server_url } => {
                        let events = self.connect(&server_url).await?;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                        self.send_outgoing().await?;
                    },

                    // Protocol operations go through the bridge
                    AppAction::JoinRoom { .. }
                    | AppAction::LeaveRoom
                    | AppAction::SendMessage { .. }
                    | AppAction::NotifyTyping => {
                        let events = self.bridge.process_app_action(action);
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                        self.send_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Connect to the server.
    ///
    /// A refused connection is not fatal: the app is told and the user may
    /// retry.
    async fn connect(&mut self, server_url: &str) -> Result<Vec<AppEvent>, D::Error> {
        if self.app.handle(AppEvent::Connecting).contains(&AppAction::Render) {
            self.driver.render(&self.app)?;
        }

        match self.driver.connect(server_url).await {
            Ok(()) => {
                self.connected = true;
                Ok(self.bridge.handle_connected())
            },
            Err(e) => {
                tracing::warn!(error = %e, server = %server_url, "connect failed");
                self.connected = false;
                let mut events = self.bridge.handle_disconnected();
                events.push(AppEvent::Error { message: e.to_string() });
                Ok(events)
            },
        }
    }

    /// Send all pending outgoing events to the server.
    async fn send_outgoing(&mut self) -> Result<(), D::Error> {
        for event in self.bridge.take_outgoing() {
            self.driver.send(event).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
