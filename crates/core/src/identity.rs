// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Session identity for an authenticated connection.
//!
//! An [`Identity`] is supplied by the caller on `connect()` and echoed to the
//! server in the `auth` frame. The server assigns a chat through a
//! `chat_status` frame, which the client records as the session's `chat_id`.

use serde::{Deserialize, Serialize};

/// Which side of a conversation this client represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// An end user (visitor) side of a chat.
    User,
    /// A support agent side of a chat.
    Agent,
}

impl UserType {
    /// Stable string form, matching the wire encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::User => "user",
            UserType::Agent => "agent",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-provided identity sent in the `auth` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier.
    pub user_id: String,
    /// User or agent.
    pub user_type: UserType,
    /// Free-form profile payload forwarded to the server (name, email, ...).
    #[serde(default)]
    pub user_info: serde_json::Value,
}

impl Identity {
    /// Create an identity with an empty `user_info` payload.
    pub fn new(user_id: impl Into<String>, user_type: UserType) -> Self {
        Identity {
            user_id: user_id.into(),
            user_type,
            user_info: serde_json::Value::Null,
        }
    }

    /// Attach a profile payload.
    #[must_use]
    pub fn with_info(mut self, user_info: serde_json::Value) -> Self {
        self.user_info = user_info;
        self
    }
}

/// Live session state: the identity plus the server-assigned chat, if any.
///
/// Exists only between `connect()` and `disconnect()`; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Identity the connection authenticated with.
    pub identity: Identity,
    /// Chat assigned by the server via `chat_status`, cleared on `chat_ended`.
    pub chat_id: Option<String>,
}

impl Session {
    /// Start a session with no chat assigned yet.
    pub fn new(identity: Identity) -> Self {
        Session {
            identity,
            chat_id: None,
        }
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
