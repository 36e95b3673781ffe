// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

#![allow(clippy::unwrap_used)]

//! Shared test fixtures: a scriptable in-memory transport and an event
//! recorder.
//!
//! [`MockTransport`] implements [`Transport`] over a channel so `recv` stays
//! pending while nothing is queued, exactly like an idle socket. The paired
//! [`MockRemote`] plays the server: it feeds frames, injects close frames
//! and errors, scripts connect/send failures, and records everything the
//! client transmitted.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use courier_core::{ClientFrame, ServerFrame};

use crate::events::{ChatEvent, EventKind};
use crate::transport::{Transport, TransportError, TransportResult};
use crate::ChatClient;

/// What the fake server pushes at the client next.
enum Inbound {
    Frame(ServerFrame),
    Close(Option<u16>),
    Error(String),
}

#[derive(Default)]
struct MockShared {
    outgoing: Mutex<Vec<ClientFrame>>,
    connect_failures: AtomicUsize,
    send_failures: AtomicUsize,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

/// In-memory [`Transport`] driven by a [`MockRemote`].
pub(crate) struct MockTransport {
    connected: bool,
    close_code: Option<u16>,
    rx: mpsc::UnboundedReceiver<Inbound>,
    shared: Arc<MockShared>,
}

/// Test-side controller for a [`MockTransport`].
#[derive(Clone)]
pub(crate) struct MockRemote {
    tx: mpsc::UnboundedSender<Inbound>,
    shared: Arc<MockShared>,
}

impl MockTransport {
    pub(crate) fn channel() -> (Self, MockRemote) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(MockShared::default());
        let transport = MockTransport {
            connected: false,
            close_code: None,
            rx,
            shared: Arc::clone(&shared),
        };
        (transport, MockRemote { tx, shared })
    }
}

impl MockRemote {
    /// Deliver a frame to the client.
    pub(crate) fn serve(&self, frame: ServerFrame) {
        let _ = self.tx.send(Inbound::Frame(frame));
    }

    /// Close the connection from the server side with the given code.
    pub(crate) fn close(&self, code: Option<u16>) {
        let _ = self.tx.send(Inbound::Close(code));
    }

    /// Make the client's next `recv` fail.
    pub(crate) fn break_receive(&self, reason: &str) {
        let _ = self.tx.send(Inbound::Error(reason.to_string()));
    }

    /// Make the next `n` connect attempts fail.
    pub(crate) fn fail_next_connects(&self, n: usize) {
        self.shared.connect_failures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` sends fail, dropping the connection.
    pub(crate) fn fail_next_sends(&self, n: usize) {
        self.shared.send_failures.store(n, Ordering::SeqCst);
    }

    /// Everything the client has transmitted so far, drained.
    pub(crate) fn take_outgoing(&self) -> Vec<ClientFrame> {
        let mut outgoing = self
            .shared
            .outgoing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *outgoing)
    }

    pub(crate) fn connect_calls(&self) -> usize {
        self.shared.connect_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn disconnect_calls(&self) -> usize {
        self.shared.disconnect_calls.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn connect(
        &mut self,
        _url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.shared.connect_calls.fetch_add(1, Ordering::SeqCst);
            let scripted_failure = self
                .shared
                .connect_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if scripted_failure {
                return Err(TransportError::ConnectionFailed(
                    "scripted connect failure".into(),
                ));
            }
            self.connected = true;
            self.close_code = None;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.shared.disconnect_calls.fetch_add(1, Ordering::SeqCst);
            self.connected = false;
            Ok(())
        })
    }

    fn send(
        &mut self,
        frame: ClientFrame,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            let scripted_failure = self
                .shared
                .send_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if scripted_failure {
                self.connected = false;
                return Err(TransportError::SendFailed("scripted send failure".into()));
            }
            if !self.connected {
                return Err(TransportError::SendFailed("not connected".into()));
            }
            self.shared
                .outgoing
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(frame);
            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<ServerFrame>>> + Send + '_>> {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::ConnectionClosed);
            }
            match self.rx.recv().await {
                Some(Inbound::Frame(frame)) => Ok(Some(frame)),
                Some(Inbound::Close(code)) => {
                    self.connected = false;
                    self.close_code = code;
                    Ok(None)
                }
                Some(Inbound::Error(reason)) => {
                    self.connected = false;
                    Err(TransportError::ReceiveFailed(reason))
                }
                // Remote dropped: behave like a silent open socket.
                None => std::future::pending().await,
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn last_close_code(&self) -> Option<u16> {
        self.close_code
    }
}

const ALL_KINDS: [EventKind; 10] = [
    EventKind::Connected,
    EventKind::Disconnected,
    EventKind::ReconnectFailed,
    EventKind::ChatStatus,
    EventKind::MessageReceived,
    EventKind::ChatEnded,
    EventKind::TypingStarted,
    EventKind::TypingStopped,
    EventKind::AgentStatus,
    EventKind::ServerError,
];

/// Records every event a client emits, in emission order.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    events: Arc<Mutex<VecDeque<ChatEvent>>>,
}

impl Recorder {
    pub(crate) fn attach(client: &ChatClient) -> Self {
        let recorder = Recorder::default();
        for kind in ALL_KINDS {
            let events = Arc::clone(&recorder.events);
            let _ = client.on(kind, move |event| {
                events
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push_back(event.clone());
            });
        }
        recorder
    }

    /// Drain recorded events in emission order.
    pub(crate) fn take(&self) -> Vec<ChatEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}

/// Give the driver task a chance to drain its command and frame queues.
/// Yield-based so it never advances paused time.
pub(crate) async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}
