// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Connection driver: the single task that owns the transport.
//!
//! The driver serializes everything that touches connection state (handle
//! commands, inbound frames, the heartbeat deadline, and the reconnect
//! backoff timer) through one `tokio::select!` loop. Timers are plain
//! deadlines owned by the driver and cleared on every state exit, so a
//! cancelled reconnect or a paused heartbeat can never fire late and revive
//! a connection that was shut down.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use courier_core::{ClientFrame, Identity, ServerFrame};

use crate::config::ClientConfig;
use crate::events::{ChatEvent, EventRegistry};
use crate::queue::OutboundQueue;
use crate::state::{ConnectionState, SharedState};
use crate::transport::{Transport, CLOSE_NORMAL};

/// Commands sent from the [`ChatClient`](crate::ChatClient) handle.
#[derive(Debug)]
pub(crate) enum Command {
    /// Open the connection and authenticate as the given identity.
    Connect(Identity),
    /// Close cleanly and stop all timers.
    Disconnect,
    /// Transmit a frame, or queue it while no connection is up.
    Send(ClientFrame),
    /// Host visibility signal: true pauses the heartbeat.
    SetBackground(bool),
}

/// The connection state machine, driven as a single logical actor.
pub(crate) struct Driver<T: Transport> {
    config: ClientConfig,
    transport: T,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    shared: Arc<SharedState>,
    events: Arc<EventRegistry>,
    cancel: CancellationToken,
    queue: OutboundQueue,
    state: ConnectionState,
    /// Host is backgrounded; heartbeat is paused while true.
    hidden: bool,
    /// Next heartbeat deadline, armed only while connected and visible.
    heartbeat_at: Option<Instant>,
    /// Pending reconnect deadline, armed only while reconnecting.
    retry_at: Option<Instant>,
}

impl<T: Transport> Driver<T> {
    pub(crate) fn new(
        config: ClientConfig,
        transport: T,
        cmd_rx: mpsc::UnboundedReceiver<Command>,
        shared: Arc<SharedState>,
        events: Arc<EventRegistry>,
        cancel: CancellationToken,
    ) -> Self {
        Driver {
            config,
            transport,
            cmd_rx,
            shared,
            events,
            cancel,
            queue: OutboundQueue::new(),
            state: ConnectionState::Disconnected,
            hidden: false,
            heartbeat_at: None,
            retry_at: None,
        }
    }

    /// Main loop. Returns when the handle is shut down or dropped.
    pub(crate) async fn run(mut self) {
        loop {
            let receiving = matches!(
                self.state,
                ConnectionState::Authenticating | ConnectionState::Connected
            ) && self.transport.is_connected();
            let heartbeat_at = self.heartbeat_at;
            let retry_at = self.retry_at;

            tokio::select! {
                () = self.cancel.cancelled() => {
                    self.shutdown().await;
                    return;
                }

                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await,
                        // Handle dropped: same clean path as explicit shutdown.
                        None => {
                            self.shutdown().await;
                            return;
                        }
                    }
                }

                inbound = self.transport.recv(), if receiving => {
                    self.handle_inbound(inbound).await;
                }

                () = sleep_until(heartbeat_at.unwrap_or_else(Instant::now)),
                    if heartbeat_at.is_some() =>
                {
                    self.on_heartbeat_tick().await;
                }

                () = sleep_until(retry_at.unwrap_or_else(Instant::now)),
                    if retry_at.is_some() =>
                {
                    self.attempt_reconnect().await;
                }
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect(identity) => self.handle_connect(identity).await,
            Command::Disconnect => self.handle_disconnect().await,
            Command::Send(frame) => self.handle_send(frame).await,
            Command::SetBackground(hidden) => self.set_background(hidden),
        }
    }

    async fn handle_connect(&mut self, identity: Identity) {
        if self.state != ConnectionState::Disconnected {
            debug!(state = %self.state, "connect ignored: connection already active");
            return;
        }
        self.shared.start_session(identity);
        self.set_state(ConnectionState::Connecting);
        self.dial(0).await;
    }

    /// Close cleanly. Idempotent: a second call finds nothing to close and
    /// emits nothing.
    async fn handle_disconnect(&mut self) {
        let was_active = self.state != ConnectionState::Disconnected;
        // Timer cancellation is atomic with the transition: both happen on
        // this task before any timer branch can fire.
        self.retry_at = None;
        self.heartbeat_at = None;
        if self.transport.is_connected() {
            let _ = self.transport.disconnect().await;
        }
        self.shared.clear_session();
        self.set_state(ConnectionState::Disconnected);
        if was_active {
            self.events.emit(&ChatEvent::Disconnected { clean: true });
        }
    }

    async fn handle_send(&mut self, frame: ClientFrame) {
        if self.state == ConnectionState::Connected && self.transport.is_connected() {
            if let Err(e) = self.transport.send(frame.clone()).await {
                warn!(error = %e, "send failed; frame queued for reconnect");
                self.queue.requeue_front(frame);
                self.connection_lost();
            }
        } else {
            self.queue.push(frame);
        }
    }

    fn set_background(&mut self, hidden: bool) {
        if hidden == self.hidden {
            return;
        }
        self.hidden = hidden;
        if hidden {
            // Paused, not destroyed: connection state is untouched.
            self.heartbeat_at = None;
            debug!("heartbeat paused: host backgrounded");
        } else if self.state == ConnectionState::Connected {
            // Resume opens a fresh full interval window.
            self.arm_heartbeat();
            debug!("heartbeat resumed");
        }
    }

    /// Open the socket and start the auth handshake. `attempt` is 0 for a
    /// caller-initiated connect, otherwise the 1-based reconnect attempt.
    async fn dial(&mut self, attempt: u32) {
        match self.transport.connect(&self.config.url).await {
            Ok(()) => {
                let Some(identity) = self.shared.identity() else {
                    // Disconnect raced the dial; drop the fresh socket.
                    let _ = self.transport.disconnect().await;
                    self.set_state(ConnectionState::Disconnected);
                    return;
                };
                if let Err(e) = self.transport.send(ClientFrame::auth(&identity)).await {
                    warn!(error = %e, "auth send failed");
                    self.schedule_retry(attempt + 1);
                    return;
                }
                self.set_state(ConnectionState::Authenticating);
            }
            Err(e) => {
                debug!(error = %e, attempt, "connect attempt failed");
                self.schedule_retry(attempt + 1);
            }
        }
    }

    /// Schedule reconnect attempt `attempt`, or give up past the budget.
    fn schedule_retry(&mut self, attempt: u32) {
        self.heartbeat_at = None;
        if attempt > self.config.max_attempts {
            warn!(
                attempts = self.config.max_attempts,
                "reconnect attempts exhausted; staying down until next connect()"
            );
            self.retry_at = None;
            self.set_state(ConnectionState::Disconnected);
            self.events.emit(&ChatEvent::ReconnectFailed {
                attempts: self.config.max_attempts,
            });
            return;
        }
        let delay = self.config.backoff_delay(attempt);
        debug!(attempt, ?delay, "scheduling reconnect");
        self.retry_at = Some(Instant::now() + delay);
        self.set_state(ConnectionState::Reconnecting { attempt });
    }

    async fn attempt_reconnect(&mut self) {
        let ConnectionState::Reconnecting { attempt } = self.state else {
            self.retry_at = None;
            return;
        };
        self.retry_at = None;
        self.dial(attempt).await;
    }

    /// Abnormal connection loss: notify and enter the backoff state machine.
    fn connection_lost(&mut self) {
        self.heartbeat_at = None;
        self.events.emit(&ChatEvent::Disconnected { clean: false });
        self.schedule_retry(1);
    }

    async fn handle_inbound(&mut self, inbound: crate::transport::TransportResult<Option<ServerFrame>>) {
        match inbound {
            Ok(Some(frame)) => self.dispatch(frame).await,
            Ok(None) => {
                if self.transport.last_close_code() == Some(CLOSE_NORMAL) {
                    // Peer requested a clean shutdown: no retry.
                    debug!("peer closed the connection cleanly");
                    self.retry_at = None;
                    self.heartbeat_at = None;
                    self.set_state(ConnectionState::Disconnected);
                    self.events.emit(&ChatEvent::Disconnected { clean: true });
                } else {
                    self.connection_lost();
                }
            }
            Err(e) => {
                warn!(error = %e, "receive failed");
                self.connection_lost();
            }
        }
    }

    async fn dispatch(&mut self, frame: ServerFrame) {
        match frame {
            ServerFrame::AuthSuccess { user_id } => {
                if self.state != ConnectionState::Authenticating {
                    debug!(?user_id, state = %self.state, "unexpected auth_success");
                    return;
                }
                self.set_state(ConnectionState::Connected);
                self.arm_heartbeat();
                self.flush_queue().await;
                if self.state == ConnectionState::Connected {
                    self.events.emit(&ChatEvent::Connected);
                }
            }
            ServerFrame::ChatStatus {
                chat_id,
                status,
                agent_id,
                messages,
            } => {
                self.shared.set_chat_id(Some(chat_id.clone()));
                self.events.emit(&ChatEvent::ChatStatus {
                    chat_id,
                    status,
                    agent_id,
                    messages,
                });
            }
            ServerFrame::NewMessage { message } => {
                self.events.emit(&ChatEvent::MessageReceived { message });
            }
            ServerFrame::ChatEnded { chat_id } => {
                self.shared.set_chat_id(None);
                self.events.emit(&ChatEvent::ChatEnded { chat_id });
            }
            ServerFrame::TypingStart { user_id } => {
                self.events.emit(&ChatEvent::TypingStarted { user_id });
            }
            ServerFrame::TypingStop { user_id } => {
                self.events.emit(&ChatEvent::TypingStopped { user_id });
            }
            ServerFrame::AgentStatusUpdate { status, agent_id } => {
                self.events.emit(&ChatEvent::AgentStatus { status, agent_id });
            }
            ServerFrame::Error { message } => {
                warn!(%message, "server reported an error");
                self.events.emit(&ChatEvent::ServerError { message });
            }
            ServerFrame::Unknown => {
                warn!("ignoring frame with unrecognized type");
            }
        }
    }

    /// Drain the outbound queue strictly FIFO. A failed send re-queues the
    /// unsent remainder and re-enters the reconnect path; frames already
    /// transmitted are not re-sent.
    async fn flush_queue(&mut self) {
        let queued = self.queue.len();
        if queued == 0 {
            return;
        }
        while let Some(frame) = self.queue.pop() {
            if let Err(e) = self.transport.send(frame.clone()).await {
                warn!(error = %e, remaining = self.queue.len() + 1, "queue flush interrupted");
                self.queue.requeue_front(frame);
                self.connection_lost();
                return;
            }
        }
        debug!(count = queued, "flushed outbound queue");
    }

    fn arm_heartbeat(&mut self) {
        self.heartbeat_at = match self.config.heartbeat_interval() {
            Some(interval) if !self.hidden => Some(Instant::now() + interval),
            _ => None,
        };
    }

    async fn on_heartbeat_tick(&mut self) {
        if self.state != ConnectionState::Connected {
            self.heartbeat_at = None;
            return;
        }
        match self.transport.send(ClientFrame::Ping).await {
            Ok(()) => self.arm_heartbeat(),
            Err(e) => {
                warn!(error = %e, "heartbeat send failed");
                self.connection_lost();
            }
        }
    }

    /// Terminal cleanup shared by explicit shutdown and handle drop.
    async fn shutdown(&mut self) {
        let was_active = self.state != ConnectionState::Disconnected;
        self.retry_at = None;
        self.heartbeat_at = None;
        if self.transport.is_connected() {
            let _ = self.transport.disconnect().await;
        }
        self.shared.clear_session();
        self.set_state(ConnectionState::Disconnected);
        if was_active {
            self.events.emit(&ChatEvent::Disconnected { clean: true });
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "connection state change");
        }
        self.state = state;
        self.shared.set(state);
    }
}
