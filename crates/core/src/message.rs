// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Chat message and attachment shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attachment kind, as carried in the `type` field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    Image,
    File,
    Document,
}

/// A file attached to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Attachment kind (image, file, document).
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    /// Display name of the file.
    pub name: String,
    /// Download URL.
    pub url: String,
    /// Size in bytes, when the uploader reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Attachment {
    /// Create an attachment without a reported size.
    pub fn new(kind: AttachmentType, name: impl Into<String>, url: impl Into<String>) -> Self {
        Attachment {
            kind,
            name: name.into(),
            url: url.into(),
            size: None,
        }
    }
}

/// A single chat message as delivered by the server.
///
/// Every field except `text` is optional on the wire; servers differ in how
/// much metadata they attach, so decoding is permissive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Server-assigned message id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Message body.
    pub text: String,
    /// Id of the sending user or agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    /// Server-side timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    /// Files attached to the message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl ChatMessage {
    /// Create a bare text message.
    pub fn text(text: impl Into<String>) -> Self {
        ChatMessage {
            id: None,
            text: text.into(),
            sender_id: None,
            sent_at: None,
            attachments: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
