//! Deterministic simulation harness for Huddle clients.
//!
//! In-process implementations of the Environment and Driver traits, plus a
//! room server, so full client stacks can be run against each other without
//! sockets or wall-clock sleeps.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! session and presence invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_server;

pub use invariants::{
    ClientSnapshot, Invariant, InvariantRegistry, InvariantResult, LogEmptyWhenNotJoined,
    MessagesMatchRoom, NoDuplicateTypingPeers, NoPresenceOutsideRoom, SystemSnapshot,
    TypingFlagMatchesPeers, ViewMatchesClient, ViewSnapshot, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_server::{ClientId, SimServer};
