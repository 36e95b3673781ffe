// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! courier: reconnecting WebSocket client for the Courier chat service.
//!
//! The crate is built around a single driver task that owns the socket and
//! every timer; the public [`ChatClient`] is a cheap handle that feeds it
//! commands over a channel and reads state from shared atomics.
//!
//! ```text
//!   ChatClient --commands--> Driver <--frames--> Transport (WebSocket)
//!       |                      |
//!       +---- shared state ----+----> EventRegistry ----> listeners
//! ```
//!
//! Connection lifecycle: `connect()` opens the socket and sends the auth
//! frame; the server's `auth_success` gates the Connected state and flushes
//! any frames queued while offline, in order. An abnormal close enters
//! exponential-backoff reconnection; a clean close (code 1000) or an
//! explicit `disconnect()` does not.

mod client;
pub mod config;
mod driver;
pub mod error;
pub mod events;
mod queue;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use client::ChatClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use events::{ChatEvent, EventKind, EventRegistry, ListenerId};
pub use state::ConnectionState;
pub use transport::{Transport, TransportError, TransportResult, WebSocketTransport};

pub use courier_core::{
    Attachment, AttachmentType, ChatMessage, ClientFrame, Identity, ServerFrame, Session, UserType,
};
