//! Client
//!
//! Action-based client state machine for a single-room chat. Owns one
//! [`Session`](huddle_core::Session) and one [`Presence`](huddle_core::Presence)
//! and serializes every local intent and inbound event through
//! [`Client::handle`].
//!
//! # Architecture
//!
//! The client follows the Sans-IO pattern of [`huddle_core`]. It receives
//! events ([`ClientEvent`]), processes them through pure state machine logic,
//! and returns actions ([`ClientAction`]) for the caller to execute. Outbound
//! wire events are returned as [`ClientAction::Emit`]; nothing here touches a
//! socket.
//!
//! # Components
//!
//! - [`Client`]: Session and presence for the joined room
//! - [`ClientEvent`]: Events fed into the client
//! - [`ClientAction`]: Actions produced by the client
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: Socket.IO over a WebSocket
//! - [`transport::connect`]: Connect to a room server
//! - [`system_env::SystemEnv`]: Production environment

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;

#[cfg(feature = "transport")]
pub mod system_env;
#[cfg(feature = "transport")]
pub mod transport;

pub use client::{Client, ClientConfig};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent};
pub use huddle_core::{DecayPolicy, Environment};
