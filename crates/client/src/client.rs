// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Public client handle.
//!
//! [`ChatClient`] is a cheap handle over a spawned [`Driver`] task; all
//! methods are non-blocking and safe to call from any task. Commands are
//! fire-and-forget: connection trouble surfaces through events, never as an
//! error at the call site.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use courier_core::{Attachment, ClientFrame, Identity, UserType};

use crate::config::ClientConfig;
use crate::driver::{Command, Driver};
use crate::error::{ClientError, ClientResult};
use crate::events::{ChatEvent, EventKind, EventRegistry, ListenerId};
use crate::state::{ConnectionState, SharedState};
use crate::transport::{Transport, WebSocketTransport};

/// Handle to a running chat connection.
///
/// Dropping the handle shuts the connection down; use [`shutdown`] to wait
/// for the clean close to complete.
///
/// [`shutdown`]: ChatClient::shutdown
pub struct ChatClient {
    cmd_tx: mpsc::UnboundedSender<Command>,
    shared: Arc<SharedState>,
    events: Arc<EventRegistry>,
    cancel: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl ChatClient {
    /// Spawn a client over a real WebSocket transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, WebSocketTransport::new())
    }

    /// Spawn a client over a caller-supplied transport.
    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(SharedState::new());
        let events = Arc::new(EventRegistry::new());
        let cancel = CancellationToken::new();

        let driver = Driver::new(
            config,
            transport,
            cmd_rx,
            Arc::clone(&shared),
            Arc::clone(&events),
            cancel.clone(),
        );
        let handle = tokio::spawn(driver.run());

        ChatClient {
            cmd_tx,
            shared,
            events,
            cancel,
            driver: Some(handle),
        }
    }

    /// Connect and authenticate as `identity`.
    ///
    /// No-op when a connection is already being established or is up.
    pub fn connect(&self, identity: Identity) -> ClientResult<()> {
        self.command(Command::Connect(identity))
    }

    /// Close cleanly, cancel any pending reconnect, and clear the session.
    ///
    /// Idempotent: calling it twice closes the socket once.
    pub fn disconnect(&self) -> ClientResult<()> {
        self.command(Command::Disconnect)
    }

    /// Send a raw protocol frame.
    ///
    /// While not connected the frame is queued and flushed, in order, once
    /// authentication completes.
    pub fn send(&self, frame: ClientFrame) -> ClientResult<()> {
        self.command(Command::Send(frame))
    }

    /// Send a chat message with optional attachments.
    ///
    /// Dropped with a log line when no chat is assigned yet.
    pub fn send_chat_message(
        &self,
        text: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> ClientResult<()> {
        if self.shared.chat_id().is_none() {
            debug!("chat message dropped: no active chat");
            return Ok(());
        }
        self.send(ClientFrame::chat_message(text, attachments))
    }

    /// Signal that the local user started typing. Dropped when no chat is
    /// assigned.
    pub fn start_typing(&self) -> ClientResult<()> {
        if self.shared.chat_id().is_none() {
            debug!("typing signal dropped: no active chat");
            return Ok(());
        }
        self.send(ClientFrame::TypingStart)
    }

    /// Signal that the local user stopped typing. Dropped when no chat is
    /// assigned.
    pub fn stop_typing(&self) -> ClientResult<()> {
        if self.shared.chat_id().is_none() {
            debug!("typing signal dropped: no active chat");
            return Ok(());
        }
        self.send(ClientFrame::TypingStop)
    }

    /// End the active chat, optionally rating it. Dropped when no chat is
    /// assigned.
    pub fn end_chat(&self, rating: Option<u8>, feedback: Option<String>) -> ClientResult<()> {
        if self.shared.chat_id().is_none() {
            debug!("end chat dropped: no active chat");
            return Ok(());
        }
        self.send(ClientFrame::chat_end(rating, feedback))
    }

    /// Broadcast a new availability status. Dropped unless the session
    /// identity is an agent.
    pub fn update_agent_status(&self, status: impl Into<String>) -> ClientResult<()> {
        let is_agent = self
            .shared
            .identity()
            .is_some_and(|identity| identity.user_type == UserType::Agent);
        if !is_agent {
            debug!("status update dropped: not connected as an agent");
            return Ok(());
        }
        self.send(ClientFrame::agent_status(status))
    }

    /// Tell the client the host went to, or returned from, the background.
    /// The heartbeat pauses while hidden; the connection stays up.
    pub fn set_background(&self, hidden: bool) -> ClientResult<()> {
        self.command(Command::SetBackground(hidden))
    }

    /// Register a listener for one kind of event. Listeners for the same
    /// kind run in registration order.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&ChatEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, callback)
    }

    /// Remove a listener registered with [`on`](ChatClient::on). Returns
    /// false when it was already removed.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.events.off(kind, id)
    }

    /// Current connection state.
    pub fn connection_status(&self) -> ConnectionState {
        self.shared.get()
    }

    /// True when connected and authenticated.
    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Shut down, closing any open connection cleanly, and wait for the
    /// driver task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }

    fn command(&self, cmd: Command) -> ClientResult<()> {
        self.cmd_tx.send(cmd).map_err(|_| ClientError::Closed)
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
