//! Client error types.

use huddle_core::SessionError;
use thiserror::Error;

/// Errors from client operations.
///
/// Like [`SessionError`], every variant is a rejection: the client state is
/// unchanged and no action was produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Operation needs to emit an event but no connection exists yet.
    #[error("not connected to server")]
    NotConnected,

    /// Session state machine rejected the operation.
    #[error(transparent)]
    Session(#[from] SessionError),
}
