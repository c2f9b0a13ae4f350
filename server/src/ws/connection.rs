//! Server-side handle for one open WebSocket.
//!
//! The handle is what the registry stores: an identity, a bounded FIFO of
//! outbound text frames drained by the socket's writer task, and a close
//! signal the socket loops watch.

use std::fmt;

use axum::extract::ws::Utf8Bytes;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Unique identifier for a connection (server-generated on accept).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh, time-ordered connection ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a frame could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendFailure {
    /// The socket was closed or its writer task is gone.
    #[error("connection closed")]
    Closed,
    /// The client is not draining its queue.
    #[error("outbound queue full")]
    Full,
}

/// Handle to one open client connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<Utf8Bytes>,
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Wrap an outbound queue and close token under a fresh identity.
    pub fn new(outbound: mpsc::Sender<Utf8Bytes>, closed: CancellationToken) -> Self {
        Self {
            id: ConnectionId::new(),
            outbound,
            closed,
        }
    }

    /// Create a handle plus the receiving end of its outbound queue.
    ///
    /// The close token is a child of `parent`, so cancelling the process
    /// shutdown token closes every connection created this way.
    pub fn channel(
        buffer: usize,
        parent: &CancellationToken,
    ) -> (Self, mpsc::Receiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx, parent.child_token()), rx)
    }

    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the transport can still accept frames.
    pub fn is_open(&self) -> bool {
        !self.closed.is_cancelled() && !self.outbound.is_closed()
    }

    /// Queue a text frame without waiting.
    pub fn send(&self, frame: Utf8Bytes) -> Result<(), SendFailure> {
        if self.closed.is_cancelled() {
            return Err(SendFailure::Closed);
        }
        self.outbound.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SendFailure::Full,
            TrySendError::Closed(_) => SendFailure::Closed,
        })
    }

    /// Ask the socket to send a close frame and stop.
    ///
    /// Returns `false` if the connection was already closed.
    pub fn close(&self) -> bool {
        if self.closed.is_cancelled() {
            return false;
        }
        self.closed.cancel();
        true
    }

    /// Token cancelled when this connection is closed from either side.
    pub fn close_token(&self) -> CancellationToken {
        self.closed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn send_queues_frames_in_order() {
        let (handle, mut rx) = ConnectionHandle::channel(4, &CancellationToken::new());
        handle.send("a".into()).unwrap();
        handle.send("b".into()).unwrap();
        assert_eq!(rx.try_recv().unwrap().as_str(), "a");
        assert_eq!(rx.try_recv().unwrap().as_str(), "b");
    }

    #[test]
    fn send_reports_full_queue() {
        let (handle, _rx) = ConnectionHandle::channel(1, &CancellationToken::new());
        handle.send("a".into()).unwrap();
        assert_eq!(handle.send("b".into()), Err(SendFailure::Full));
    }

    #[test]
    fn send_fails_after_receiver_dropped() {
        let (handle, rx) = ConnectionHandle::channel(1, &CancellationToken::new());
        drop(rx);
        assert!(!handle.is_open());
        assert_eq!(handle.send("a".into()), Err(SendFailure::Closed));
    }

    #[test]
    fn close_is_reported_once() {
        let (handle, _rx) = ConnectionHandle::channel(1, &CancellationToken::new());
        assert!(handle.close());
        assert!(!handle.close());
        assert!(!handle.is_open());
        assert_eq!(handle.send("a".into()), Err(SendFailure::Closed));
    }

    #[test]
    fn cancelling_parent_closes_connection() {
        let parent = CancellationToken::new();
        let (handle, _rx) = ConnectionHandle::channel(1, &parent);
        parent.cancel();
        assert!(!handle.is_open());
    }
}
