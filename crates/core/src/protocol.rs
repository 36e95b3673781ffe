// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! JSON wire protocol for the chat connection.
//!
//! Every frame is a JSON object with a mandatory `type` discriminator and
//! camelCase fields. The client authenticates, then exchanges chat events;
//! the server is a black-box peer that accepts this protocol.

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, UserType};
use crate::message::{Attachment, ChatMessage};

/// Frames sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientFrame {
    /// Authentication handshake, sent immediately after the socket opens.
    Auth {
        /// Stable user identifier.
        user_id: String,
        /// User or agent.
        user_type: UserType,
        /// Free-form profile payload.
        user_info: serde_json::Value,
    },

    /// A chat message typed by the local user.
    ChatMessage {
        /// Message body.
        text: String,
        /// Attached files.
        #[serde(default)]
        attachments: Vec<Attachment>,
    },

    /// The local user started typing.
    TypingStart,

    /// The local user stopped typing.
    TypingStop,

    /// End the active chat, optionally rating it.
    ChatEnd {
        /// 1-5 satisfaction rating.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rating: Option<u8>,
        /// Free-form feedback text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feedback: Option<String>,
    },

    /// Agent availability change (agent sessions only).
    AgentStatusUpdate {
        /// New availability, e.g. "online" or "away".
        status: String,
    },

    /// Application-level keep-alive.
    Ping,
}

/// Frames received from the server.
///
/// Decoding is permissive: variants accept missing optional fields, and an
/// unrecognized `type` decodes as [`ServerFrame::Unknown`] so one odd frame
/// never breaks the receive loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    /// Authentication accepted; the session is usable.
    AuthSuccess {
        /// Echo of the authenticated user id, when the server sends one.
        #[serde(default)]
        user_id: Option<String>,
    },

    /// Chat assignment or status change. Carries the chat history on first
    /// assignment.
    ChatStatus {
        /// Server-assigned chat id.
        chat_id: String,
        /// Chat status, e.g. "waiting" or "active".
        status: String,
        /// Assigned agent, once one picks the chat up.
        #[serde(default)]
        agent_id: Option<String>,
        /// Messages already exchanged in this chat.
        #[serde(default)]
        messages: Vec<ChatMessage>,
    },

    /// A new message in the active chat.
    NewMessage {
        /// The delivered message.
        message: ChatMessage,
    },

    /// The chat was ended (by either side).
    ChatEnded {
        /// Id of the ended chat.
        chat_id: String,
    },

    /// The remote party started typing.
    TypingStart {
        /// Id of the typing user, when known.
        #[serde(default)]
        user_id: Option<String>,
    },

    /// The remote party stopped typing.
    TypingStop {
        /// Id of the user that stopped, when known.
        #[serde(default)]
        user_id: Option<String>,
    },

    /// Agent availability changed.
    AgentStatusUpdate {
        /// New availability.
        status: String,
        /// Agent whose status changed, when known.
        #[serde(default)]
        agent_id: Option<String>,
    },

    /// Application-level error reported by the server.
    Error {
        /// Human-readable description.
        message: String,
    },

    /// Any frame with a `type` this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl ClientFrame {
    /// Creates an Auth frame from a session identity.
    pub fn auth(identity: &Identity) -> Self {
        ClientFrame::Auth {
            user_id: identity.user_id.clone(),
            user_type: identity.user_type,
            user_info: identity.user_info.clone(),
        }
    }

    /// Creates a ChatMessage frame.
    pub fn chat_message(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        ClientFrame::ChatMessage {
            text: text.into(),
            attachments,
        }
    }

    /// Creates a ChatEnd frame.
    pub fn chat_end(rating: Option<u8>, feedback: Option<String>) -> Self {
        ClientFrame::ChatEnd { rating, feedback }
    }

    /// Creates an AgentStatusUpdate frame.
    pub fn agent_status(status: impl Into<String>) -> Self {
        ClientFrame::AgentStatusUpdate {
            status: status.into(),
        }
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a frame from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerFrame {
    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a frame from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
