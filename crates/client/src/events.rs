// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Typed event registry decoupling the transport from UI/business logic.
//!
//! Instead of string-keyed callback lists, events are a closed enum and each
//! kind maps to an ordered list of callbacks. Registration order is call
//! order; removal is by the [`ListenerId`] handed out at registration.
//!
//! Emission iterates a snapshot of the list taken when `emit` starts, so a
//! listener registered during emission of the same event is not invoked in
//! that pass. The registry lock is never held while callbacks run, and a
//! panicking callback is caught and logged without disturbing the rest.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use courier_core::ChatMessage;
use tracing::warn;

/// Application events emitted by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Authentication accepted; queued frames have been flushed.
    Connected,
    /// The connection went away. `clean` is true for an explicit local
    /// `disconnect()` or a peer close with code 1000; false means a retry
    /// is underway.
    Disconnected {
        /// Whether this was a clean close (no retry follows).
        clean: bool,
    },
    /// All reconnect attempts failed; the client stays down until the next
    /// explicit `connect()`.
    ReconnectFailed {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
    /// Chat assignment or status change.
    ChatStatus {
        /// Server-assigned chat id.
        chat_id: String,
        /// Chat status, e.g. "waiting" or "active".
        status: String,
        /// Assigned agent, when one has picked the chat up.
        agent_id: Option<String>,
        /// History delivered with the assignment.
        messages: Vec<ChatMessage>,
    },
    /// A new message arrived in the active chat.
    MessageReceived {
        /// The delivered message.
        message: ChatMessage,
    },
    /// The chat ended.
    ChatEnded {
        /// Id of the ended chat.
        chat_id: String,
    },
    /// The remote party started typing.
    TypingStarted {
        /// Id of the typing user, when known.
        user_id: Option<String>,
    },
    /// The remote party stopped typing.
    TypingStopped {
        /// Id of the user that stopped, when known.
        user_id: Option<String>,
    },
    /// Agent availability changed.
    AgentStatus {
        /// New availability.
        status: String,
        /// Agent whose status changed, when known.
        agent_id: Option<String>,
    },
    /// The server reported an application-level error.
    ServerError {
        /// Human-readable description.
        message: String,
    },
}

/// Discriminant used to subscribe to one kind of [`ChatEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    ReconnectFailed,
    ChatStatus,
    MessageReceived,
    ChatEnded,
    TypingStarted,
    TypingStopped,
    AgentStatus,
    ServerError,
}

impl ChatEvent {
    /// The kind used to route this event to listeners.
    pub fn kind(&self) -> EventKind {
        match self {
            ChatEvent::Connected => EventKind::Connected,
            ChatEvent::Disconnected { .. } => EventKind::Disconnected,
            ChatEvent::ReconnectFailed { .. } => EventKind::ReconnectFailed,
            ChatEvent::ChatStatus { .. } => EventKind::ChatStatus,
            ChatEvent::MessageReceived { .. } => EventKind::MessageReceived,
            ChatEvent::ChatEnded { .. } => EventKind::ChatEnded,
            ChatEvent::TypingStarted { .. } => EventKind::TypingStarted,
            ChatEvent::TypingStopped { .. } => EventKind::TypingStopped,
            ChatEvent::AgentStatus { .. } => EventKind::AgentStatus,
            ChatEvent::ServerError { .. } => EventKind::ServerError,
        }
    }
}

/// Identity handle for a registered listener, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Callback = Arc<dyn Fn(&ChatEvent) + Send + Sync>;

struct Listener {
    id: ListenerId,
    callback: Callback,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<Listener>>,
}

/// Registry mapping event kinds to ordered callback lists.
#[derive(Default)]
pub struct EventRegistry {
    inner: Mutex<Inner>,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        EventRegistry::default()
    }

    /// Register a callback for `kind`, appended after existing listeners.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&ChatEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        inner.listeners.entry(kind).or_default().push(Listener {
            id,
            callback: Arc::new(callback),
        });
        id
    }

    /// Remove the listener registered under `id`. Returns false when no such
    /// listener exists (already removed, or registered for another kind).
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let Some(listeners) = inner.listeners.get_mut(&kind) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    /// Invoke every listener registered for the event's kind, in
    /// registration order as of the start of this call.
    pub fn emit(&self, event: &ChatEvent) {
        let snapshot: Vec<Callback> = {
            let inner = self.lock();
            inner
                .listeners
                .get(&event.kind())
                .map(|listeners| listeners.iter().map(|l| Arc::clone(&l.callback)).collect())
                .unwrap_or_default()
        };

        for callback in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                warn!(kind = ?event.kind(), "event listener panicked");
            }
        }
    }

    /// Number of listeners currently registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock().listeners.get(&kind).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
