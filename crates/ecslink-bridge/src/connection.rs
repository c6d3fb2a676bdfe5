//! One websocket connection to the remote process.
//!
//! Opening a connection spawns a writer task, which drains an outbound
//! queue into the socket, and a reader task, which decodes every inbound
//! frame and hands it to the connection's own [`Dispatcher`]. When either
//! task stops (peer close, socket error, failed write) the connection is
//! marked closed and every request still waiting on it fails at once.
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use crate::dispatcher::Dispatcher;
use crate::error::BridgeError;
use crate::protocol::{decode_binary, decode_text, BridgeEvent, Envelope};

/// Capacity of the outbound frame queue.
const WRITE_QUEUE_DEPTH: usize = 64;

/// State shared by the connection handle, its tasks and pending replies.
///
/// The dispatcher lock is never held across an await.
struct Shared {
    id: u64,
    closed: AtomicBool,
    dispatcher: Mutex<Dispatcher>,
}

impl Shared {
    fn dispatcher(&self) -> MutexGuard<'_, Dispatcher> {
        self.dispatcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the connection closed and fail every pending request.
    fn shut_down(&self, why: &str) {
        self.closed.store(true, Ordering::SeqCst);
        let failed = self.dispatcher().close();
        if failed > 0 {
            tracing::warn!(connection = self.id, failed, why, "failed requests left on closed connection");
        }
    }
}

/// A registered request awaiting its reply.
///
/// Resolves to the reply, or to an error once the connection closes.
/// Dropping it, whether after a timeout or because the caller gave up,
/// removes the entry from the dispatcher.
pub struct PendingReply {
    id: i64,
    shared: Arc<Shared>,
    rx: oneshot::Receiver<Envelope>,
}

impl PendingReply {
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl Future for PendingReply {
    type Output = Result<Envelope, BridgeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|reply| reply.map_err(|_| BridgeError::ConnectionClosed))
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if self.shared.dispatcher().cancel(self.id) {
            tracing::debug!(request_id = self.id, "pending request dropped");
        }
    }
}

/// A live connection. Shared between the bridge and in-flight requests.
pub struct Connection {
    endpoint: String,
    writer_tx: mpsc::Sender<Message>,
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.shared.id)
            .field("endpoint", &self.endpoint)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Drain `frames` into `sink` until the queue ends, a close frame is sent
/// or a write fails. A failed write shuts the connection down.
async fn write_frames<S>(shared: Arc<Shared>, mut sink: S, mut frames: mpsc::Receiver<Message>)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(frame) = frames.recv().await {
        let is_close = matches!(frame, Message::Close(_));
        if let Err(e) = sink.send(frame).await {
            tracing::warn!(connection = shared.id, error = %e, "write failed");
            shared.shut_down("write failed");
            return;
        }
        if is_close {
            return;
        }
    }
}

/// Decode inbound frames and route them until the stream ends.
async fn read_frames<S, E>(shared: Arc<Shared>, mut stream: S)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = stream.next().await {
        let decoded = match frame {
            Ok(Message::Text(text)) => decode_text(&text),
            Ok(Message::Binary(bytes)) => decode_binary(&bytes),
            Ok(Message::Close(reason)) => {
                tracing::info!(connection = shared.id, ?reason, "closed by peer");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(connection = shared.id, error = %e, "connection error");
                break;
            }
        };

        match decoded {
            Ok(value) => {
                shared.dispatcher().dispatch(Envelope::from_value(value));
            }
            Err(e) => {
                tracing::warn!(connection = shared.id, error = %e, "dropping malformed frame");
            }
        }
    }
    shared.shut_down("read side ended");
}

impl Connection {
    /// Dial `endpoint` and start the reader and writer tasks.
    pub async fn open(
        id: u64,
        endpoint: String,
        connect_timeout: Duration,
        events: broadcast::Sender<BridgeEvent>,
    ) -> Result<Arc<Self>, BridgeError> {
        tracing::debug!(connection = id, %endpoint, "connecting");

        let (socket, _response) = timeout(
            connect_timeout,
            tokio_tungstenite::connect_async(endpoint.as_str()),
        )
        .await
        .map_err(|_| BridgeError::Connect {
            endpoint: endpoint.clone(),
            reason: format!("timed out after {} ms", connect_timeout.as_millis()),
        })?
        .map_err(|e| BridgeError::Connect {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let (sink, stream) = socket.split();
        let shared = Arc::new(Shared {
            id,
            closed: AtomicBool::new(false),
            dispatcher: Mutex::new(Dispatcher::new(events)),
        });

        // The writer ends on its own once the handle drops its sender.
        let (writer_tx, writer_rx) = mpsc::channel::<Message>(WRITE_QUEUE_DEPTH);
        tokio::spawn(write_frames(shared.clone(), sink, writer_rx));
        let reader = tokio::spawn(read_frames(shared.clone(), stream));

        tracing::info!(connection = id, %endpoint, "connected");

        Ok(Arc::new(Self {
            endpoint,
            writer_tx,
            shared,
            reader,
        }))
    }

    /// Identifier of this connection (the attempt number that opened it).
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// The endpoint this connection was opened against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether the peer or an error has ended this connection.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Register a pending request on this connection.
    pub fn register(&self, id: i64) -> Result<PendingReply, BridgeError> {
        let rx = self.shared.dispatcher().register(id)?;
        Ok(PendingReply {
            id,
            shared: self.shared.clone(),
            rx,
        })
    }

    /// Number of requests awaiting a reply on this connection.
    pub fn pending_count(&self) -> usize {
        self.shared.dispatcher().pending_count()
    }

    /// Queue a text frame for the remote.
    pub async fn send_text(&self, text: String) -> Result<(), BridgeError> {
        if self.is_closed() {
            return Err(BridgeError::ConnectionClosed);
        }
        self.writer_tx
            .send(Message::Text(text))
            .await
            .map_err(|_| BridgeError::Send("writer task stopped".into()))
    }

    /// Close the connection from our side and fail what is still pending.
    pub async fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.writer_tx.send(Message::Close(None)).await;
        let failed = self.shared.dispatcher().close();
        tracing::info!(connection = self.shared.id, failed, "connection closed locally");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> Arc<Shared> {
        let (events, _) = broadcast::channel(8);
        Arc::new(Shared {
            id: 1,
            closed: AtomicBool::new(false),
            dispatcher: Mutex::new(Dispatcher::new(events)),
        })
    }

    fn pending(shared: &Arc<Shared>, id: i64) -> PendingReply {
        PendingReply {
            id,
            shared: shared.clone(),
            rx: shared.dispatcher().register(id).unwrap(),
        }
    }

    #[test]
    fn dropping_pending_reply_cancels_entry() {
        let shared = shared();
        let first = pending(&shared, 1);
        let _second = pending(&shared, 2);
        assert_eq!(shared.dispatcher().pending_count(), 2);

        drop(first);
        assert_eq!(shared.dispatcher().pending_count(), 1);
    }

    #[tokio::test]
    async fn pending_reply_resolves_and_fails_on_close() {
        let shared = shared();
        let answered = pending(&shared, 1);
        let orphaned = pending(&shared, 2);

        shared
            .dispatcher()
            .dispatch(Envelope::from_value(serde_json::json!({"$requestId": 1})));
        assert_eq!(answered.await.unwrap().request_id, Some(1));

        shared.shut_down("test");
        assert_eq!(orphaned.await.unwrap_err(), BridgeError::ConnectionClosed);
    }

    #[tokio::test]
    async fn failed_write_shuts_connection_down() {
        let shared = shared();
        let waiting = pending(&shared, 7);
        let sink = futures::sink::unfold((), |(), _frame: Message| async {
            Err::<(), _>("broken pipe")
        });
        let (tx, rx) = mpsc::channel(4);
        tx.send(Message::Text("{}".into())).await.unwrap();

        write_frames(shared.clone(), Box::pin(sink), rx).await;

        assert!(shared.closed.load(Ordering::SeqCst));
        assert!(shared.dispatcher().is_closed());
        assert_eq!(waiting.await.unwrap_err(), BridgeError::ConnectionClosed);
    }

    #[tokio::test]
    async fn writer_stops_after_close_frame() {
        let shared = shared();
        let (tx, rx) = mpsc::channel(4);
        tx.send(Message::Close(None)).await.unwrap();
        tx.send(Message::Text("late".into())).await.unwrap();

        let (sink_tx, mut sink_rx) = futures::channel::mpsc::unbounded::<Message>();
        write_frames(shared.clone(), sink_tx, rx).await;

        assert!(matches!(sink_rx.next().await, Some(Message::Close(None))));
        assert!(!shared.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn reader_end_fails_pending() {
        let shared = shared();
        let waiting = pending(&shared, 3);
        let frames = futures::stream::iter(vec![
            Ok::<_, String>(Message::Text("{garbage".into())),
            Ok(Message::Text(r#"{"$requestId": 9}"#.into())),
        ]);

        read_frames(shared.clone(), frames).await;

        assert!(shared.closed.load(Ordering::SeqCst));
        assert_eq!(waiting.await.unwrap_err(), BridgeError::ConnectionClosed);
    }
}
