//! The command bridge.
//!
//! Owns at most one [`Connection`] at a time, opens it lazily on the first
//! command, and reopens it on the next command after it dies. Connection
//! attempts are single-flight: callers arriving while an attempt is in
//! progress await that same attempt and observe its outcome.
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::connection::Connection;
use crate::error::BridgeError;
use crate::protocol::{encode_command, BridgeEvent, Envelope};

/// Endpoint the remote process listens on unless configured otherwise.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:10112/";

/// Default ceiling for a correlated reply (milliseconds).
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default ceiling for the websocket handshake (milliseconds).
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Capacity of the event fan-out channel.
const EVENT_CHANNEL_DEPTH: usize = 64;

/// Tunables for a [`Bridge`].
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeOptions {
    /// Websocket URL of the remote process.
    pub endpoint: String,
    /// How long a command waits for its reply.
    pub request_timeout: Duration,
    /// How long a connection attempt may take.
    pub connect_timeout: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

type ConnectFuture = Shared<BoxFuture<'static, Result<Arc<Connection>, BridgeError>>>;

enum ConnectionState {
    Idle,
    Connecting { attempt: u64, future: ConnectFuture },
    Connected(Arc<Connection>),
}

/// Request/response client for the remote process.
pub struct Bridge {
    options: BridgeOptions,
    state: Mutex<ConnectionState>,
    next_request_id: AtomicI64,
    attempts: AtomicU64,
    events: broadcast::Sender<BridgeEvent>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("options", &self.options)
            .field("attempts", &self.connect_attempts())
            .finish()
    }
}

impl Bridge {
    /// Create a bridge. No connection is made until the first command.
    pub fn new(options: BridgeOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_DEPTH);
        Self {
            options,
            state: Mutex::new(ConnectionState::Idle),
            next_request_id: AtomicI64::new(1),
            attempts: AtomicU64::new(0),
            events,
        }
    }

    /// The options this bridge was built with.
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Subscribe to unsolicited events from the remote.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Number of underlying connection attempts made so far.
    pub fn connect_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Whether a live connection is currently held.
    pub fn is_connected(&self) -> bool {
        matches!(&*self.lock_state(), ConnectionState::Connected(conn) if !conn.is_closed())
    }

    fn lock_state(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the live connection, opening one if needed.
    ///
    /// Failures are not cached: the next call makes a fresh attempt.
    pub async fn ensure_connection(&self) -> Result<Arc<Connection>, BridgeError> {
        let (attempt, future) = {
            let mut state = self.lock_state();
            match &*state {
                ConnectionState::Connected(conn) if !conn.is_closed() => return Ok(conn.clone()),
                ConnectionState::Connecting { attempt, future } => (*attempt, future.clone()),
                _ => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let future = Connection::open(
                        attempt,
                        self.options.endpoint.clone(),
                        self.options.connect_timeout,
                        self.events.clone(),
                    )
                    .boxed()
                    .shared();
                    *state = ConnectionState::Connecting {
                        attempt,
                        future: future.clone(),
                    };
                    (attempt, future)
                }
            }
        };

        let result = future.await;

        let mut state = self.lock_state();
        // Only the attempt that is still current may settle the state.
        if matches!(&*state, ConnectionState::Connecting { attempt: current, .. } if *current == attempt)
        {
            *state = match &result {
                Ok(conn) => ConnectionState::Connected(conn.clone()),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "connection attempt failed");
                    ConnectionState::Idle
                }
            };
        }
        result
    }

    /// Send a command and wait for its correlated reply.
    ///
    /// `args` is a JSON object of command fields (or `null`). Fails
    /// immediately when no connection can be made, with
    /// [`BridgeError::ConnectionClosed`] when the connection dies while
    /// waiting, and with [`BridgeError::Timeout`] once the request ceiling
    /// elapses. The pending entry lives only as long as this future, so it
    /// is discarded on every failure and when the caller stops waiting.
    pub async fn send_command(&self, command: &str, args: Value) -> Result<Envelope, BridgeError> {
        let id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let frame = encode_command(id, command, args)?;

        let conn = self.ensure_connection().await?;
        let reply = conn.register(id)?;

        tracing::debug!(request_id = id, command, "sending command");
        conn.send_text(frame).await?;

        match timeout(self.options.request_timeout, reply).await {
            Ok(Ok(envelope)) => {
                tracing::debug!(request_id = id, command, "reply received");
                Ok(envelope)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(request_id = id, command, "request timed out");
                Err(BridgeError::Timeout {
                    command: command.to_string(),
                    millis: self.options.request_timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Requests still waiting on the current connection.
    pub fn pending_count(&self) -> usize {
        match &*self.lock_state() {
            ConnectionState::Connected(conn) => conn.pending_count(),
            _ => 0,
        }
    }

    /// Drop the current connection, failing its outstanding requests.
    pub async fn close(&self) {
        let conn = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, ConnectionState::Idle) {
                ConnectionState::Connected(conn) => Some(conn),
                other => {
                    *state = other;
                    None
                }
            }
        };
        if let Some(conn) = conn {
            conn.close().await;
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(BridgeOptions::default())
    }
}
