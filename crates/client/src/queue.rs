// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! In-memory outbound queue for frames composed while disconnected.
//!
//! Purely process-lifetime state: frames are appended while no authenticated
//! connection exists and drained strictly FIFO once the connection comes up.
//! Nothing is persisted across restarts.

use std::collections::VecDeque;

use courier_core::ClientFrame;

/// FIFO buffer of frames awaiting transmission.
///
/// Ordering is the only guarantee: no size bound, no deduplication, no
/// priorities.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    frames: VecDeque<ClientFrame>,
}

impl OutboundQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        OutboundQueue {
            frames: VecDeque::new(),
        }
    }

    /// Append a frame to the tail.
    pub fn push(&mut self, frame: ClientFrame) {
        self.frames.push_back(frame);
    }

    /// Put a frame back at the head after a failed transmission, preserving
    /// FIFO order for the next flush.
    pub fn requeue_front(&mut self, frame: ClientFrame) {
        self.frames.push_front(frame);
    }

    /// Take the next frame to transmit.
    pub fn pop(&mut self) -> Option<ClientFrame> {
        self.frames.pop_front()
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
