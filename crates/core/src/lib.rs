// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! courier-core: Shared types for the courier real-time chat transport.
//!
//! This crate defines the JSON wire protocol exchanged with the chat server,
//! the chat message and attachment shapes, and the session identity carried
//! by an authenticated connection. It holds no I/O; the transport lives in
//! the `courier` crate.

pub mod identity;
pub mod message;
pub mod protocol;

pub use identity::{Identity, Session, UserType};
pub use message::{Attachment, AttachmentType, ChatMessage};
pub use protocol::{ClientFrame, ServerFrame};
