//! Reply dispatcher for the command bridge.
//!
//! Tracks pending requests by correlation id, routes replies to waiting
//! callers via oneshot channels, and forwards unsolicited events to
//! subscribers. One dispatcher belongs to one connection.
use std::collections::HashMap;

use tokio::sync::{broadcast, oneshot};

use crate::error::BridgeError;
use crate::protocol::{BridgeEvent, Envelope};

/// What happened to an inbound envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Delivered to the pending request with this id.
    Reply(i64),
    /// Forwarded to event subscribers.
    Event,
    /// Nobody was interested.
    Ignored,
}

/// Manages pending requests and routes replies.
pub struct Dispatcher {
    /// Map of request id to the waiting caller.
    pending: HashMap<i64, oneshot::Sender<Envelope>>,
    /// Fan-out for unsolicited events.
    events: broadcast::Sender<BridgeEvent>,
    /// Set once the owning connection is gone.
    closed: bool,
}

impl Dispatcher {
    /// Create a dispatcher publishing events on `events`.
    pub fn new(events: broadcast::Sender<BridgeEvent>) -> Self {
        Self {
            pending: HashMap::new(),
            events,
            closed: false,
        }
    }

    /// Register a pending request and return a receiver for its reply.
    ///
    /// Fails once the dispatcher has been closed so a request can never be
    /// parked on a dead connection.
    pub fn register(&mut self, id: i64) -> Result<oneshot::Receiver<Envelope>, BridgeError> {
        if self.closed {
            return Err(BridgeError::ConnectionClosed);
        }
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        Ok(rx)
    }

    /// How many requests are pending.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether the owning connection has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Route an inbound envelope.
    ///
    /// - Replies are matched to pending requests by id.
    /// - Known event tags are forwarded to subscribers.
    /// - Anything else is logged and dropped.
    pub fn dispatch(&mut self, envelope: Envelope) -> Routed {
        if let Some(id) = envelope.request_id {
            if let Some(sender) = self.pending.remove(&id) {
                // The caller may have given up already; that's fine.
                let _ = sender.send(envelope);
                return Routed::Reply(id);
            }
            tracing::debug!(request_id = id, "reply for unknown or expired request");
        }

        if let Some(event) = BridgeEvent::from_envelope(&envelope) {
            tracing::debug!(?event, "forwarding event");
            // No subscribers is not an error.
            let _ = self.events.send(event);
            return Routed::Event;
        }

        tracing::debug!(command = ?envelope.command, "ignoring unsolicited message");
        Routed::Ignored
    }

    /// Forget a pending request. Returns true if it was outstanding.
    pub fn cancel(&mut self, id: i64) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Close the dispatcher, failing every outstanding request.
    ///
    /// Dropping the senders wakes each waiting caller with a receive error,
    /// which the bridge reports as [`BridgeError::ConnectionClosed`].
    pub fn close(&mut self) -> usize {
        self.closed = true;
        let failed = self.pending.len();
        self.pending.clear();
        failed
    }
}
