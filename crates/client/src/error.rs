// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Error types for the client handle.
//!
//! Connection-level failures are deliberately absent here: socket errors are
//! absorbed by the reconnect state machine and surfaced as events, never as
//! errors at the call site.

use thiserror::Error;

/// Errors returned by [`ChatClient`](crate::ChatClient) methods.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The connection driver has shut down; the client can no longer be used.
    #[error("chat client has been shut down")]
    Closed,
}

/// Result type for client handle operations.
pub type ClientResult<T> = Result<T, ClientError>;
