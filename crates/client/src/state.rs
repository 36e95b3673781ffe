// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Connection state shared between the driver task and the client handle.
//!
//! Uses atomic fields so status queries from application code never contend
//! with the driver; only the session (identity + assigned chat) sits behind
//! a mutex.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use courier_core::{Identity, Session};

const STATE_DISCONNECTED: u8 = 0;
const STATE_CONNECTING: u8 = 1;
const STATE_AUTHENTICATING: u8 = 2;
const STATE_CONNECTED: u8 = 3;
const STATE_RECONNECTING: u8 = 4;

/// Observable lifecycle of the logical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no retry pending.
    Disconnected,
    /// Opening the socket for the first attempt.
    Connecting,
    /// Socket open, `auth` sent, waiting for the server to accept it.
    Authenticating,
    /// Authenticated and usable.
    Connected,
    /// Lost the connection; a retry is scheduled.
    Reconnecting {
        /// 1-based number of the upcoming retry.
        attempt: u32,
    },
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Authenticating => f.write_str("authenticating"),
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::Reconnecting { attempt } => {
                write!(f, "reconnecting (attempt {})", attempt)
            }
        }
    }
}

/// State visible to both the driver task and the handle.
#[derive(Debug, Default)]
pub(crate) struct SharedState {
    /// Current state discriminant (atomic for lock-free reads).
    state: AtomicU8,
    /// Upcoming reconnect attempt, meaningful while reconnecting.
    attempt: AtomicU32,
    /// Session identity plus server-assigned chat, while one exists.
    session: Mutex<Option<Session>>,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        SharedState::default()
    }

    pub(crate) fn get(&self) -> ConnectionState {
        match self.state.load(Ordering::Acquire) {
            STATE_CONNECTING => ConnectionState::Connecting,
            STATE_AUTHENTICATING => ConnectionState::Authenticating,
            STATE_CONNECTED => ConnectionState::Connected,
            STATE_RECONNECTING => ConnectionState::Reconnecting {
                attempt: self.attempt.load(Ordering::Acquire),
            },
            _ => ConnectionState::Disconnected,
        }
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        let (discriminant, attempt) = match state {
            ConnectionState::Disconnected => (STATE_DISCONNECTED, 0),
            ConnectionState::Connecting => (STATE_CONNECTING, 0),
            ConnectionState::Authenticating => (STATE_AUTHENTICATING, 0),
            ConnectionState::Connected => (STATE_CONNECTED, 0),
            ConnectionState::Reconnecting { attempt } => (STATE_RECONNECTING, attempt),
        };
        self.attempt.store(attempt, Ordering::Release);
        self.state.store(discriminant, Ordering::Release);
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_CONNECTED
    }

    /// Begin a session for the given identity, replacing any previous one.
    pub(crate) fn start_session(&self, identity: Identity) {
        *self.lock_session() = Some(Session::new(identity));
    }

    /// Drop the session on explicit disconnect.
    pub(crate) fn clear_session(&self) {
        *self.lock_session() = None;
    }

    /// Identity of the current session, if one exists.
    pub(crate) fn identity(&self) -> Option<Identity> {
        self.lock_session().as_ref().map(|s| s.identity.clone())
    }

    /// Chat assigned to the current session, if any.
    pub(crate) fn chat_id(&self) -> Option<String> {
        self.lock_session().as_ref().and_then(|s| s.chat_id.clone())
    }

    /// Record or clear the server-assigned chat.
    pub(crate) fn set_chat_id(&self, chat_id: Option<String>) {
        if let Some(session) = self.lock_session().as_mut() {
            session.chat_id = chat_id;
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
