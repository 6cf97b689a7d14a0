//! Huddle core
//!
//! Pure state machines for a single-room chat client. Nothing in this crate
//! performs I/O: time is passed in as a parameter, and outbound intents are
//! returned as [`huddle_proto::OutboundEvent`] values for the caller to emit.
//!
//! # Components
//!
//! - [`Session`]: room membership, display name, and the ordered message log
//! - [`Presence`]: peers currently believed to be typing, with a decay timer
//! - [`Environment`]: time source abstraction for deterministic simulation

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod presence;
pub mod session;

pub use chrono::NaiveTime;
pub use env::Environment;
pub use error::SessionError;
pub use presence::{DEFAULT_DECAY_WINDOW, DecayPolicy, DecayTimer, Presence, typing_summary};
pub use session::{Session, SessionState, format_time_of_day};
