//! Terminal UI for Huddle
//!
//! A thin shell over [`huddle_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`huddle_app::Runtime`].
//!
//! This crate only handles terminal rendering, the WebSocket connection, and
//! start-up configuration.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod terminal;
pub mod ui;

pub use huddle_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
