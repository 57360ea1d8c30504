//! WebSocket transport with separated reader/writer tasks.
//!
//! ```text
//!   transport::connect()
//!         │
//!         ├── writer_task   ← receives frames via mpsc, serialises → socket
//!         └── reader_task   ← reads frames from socket
//!                                ├── text frame → TransportEvent::Frame
//!                                └── close/error → TransportEvent::Closed (terminal)
//! ```
//!
//! Sends are fire-and-forget: [`FrameSender::send`] enqueues and returns as
//! soon as the writer task owns the frame. There is no reconnection: once
//! `Closed` is delivered the connection is gone for the rest of the
//! process's life.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Concrete WebSocket stream type (avoids repeating the generic everywhere).
type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Outbound channel depth; sends block only if the writer falls this far behind.
const OUTBOUND_QUEUE: usize = 64;

/// What the reader task delivers to the runtime.
#[derive(Debug)]
pub enum TransportEvent {
    /// One inbound text frame, exactly as received.
    Frame(String),
    /// The connection ended. Terminal — nothing follows this.
    Closed {
        /// Close code from the host, if it sent a close frame.
        code: Option<u16>,
        reason: String,
    },
}

/// The writer task is gone, so the connection is effectively closed.
#[derive(Debug, Error)]
#[error("transport closed")]
pub struct TransportClosed;

#[derive(Debug)]
pub(crate) enum WireFrame {
    Text(String),
    Pong(Vec<u8>),
}

/// Cheaply cloneable handle to the writer task.
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: mpsc::Sender<WireFrame>,
}

impl FrameSender {
    pub(crate) fn from_channel(tx: mpsc::Sender<WireFrame>) -> Self {
        Self { tx }
    }

    /// Enqueue one outbound text frame. No delivery acknowledgment.
    pub async fn send(&self, frame: String) -> Result<(), TransportClosed> {
        self.tx
            .send(WireFrame::Text(frame))
            .await
            .map_err(|_| TransportClosed)
    }
}

/// Dial the host on the local loopback and start the I/O tasks.
///
/// Inbound frames and the close notification arrive on `inbound_tx`; the
/// returned [`FrameSender`] feeds the writer task.
pub async fn connect(
    port: u16,
    inbound_tx: mpsc::Sender<TransportEvent>,
) -> anyhow::Result<FrameSender> {
    use anyhow::Context;

    let url = format!("ws://127.0.0.1:{port}");
    let (stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .with_context(|| format!("failed to connect to host at {url}"))?;
    info!(port, "connected to host");

    let (sink, stream) = stream.split();
    let (tx, rx) = mpsc::channel::<WireFrame>(OUTBOUND_QUEUE);

    tokio::spawn(writer_task(sink, rx));
    tokio::spawn(reader_task(stream, inbound_tx, tx.clone()));

    Ok(FrameSender { tx })
}

async fn reader_task(
    mut stream: futures_util::stream::SplitStream<WsStream>,
    inbound_tx: mpsc::Sender<TransportEvent>,
    pong_tx: mpsc::Sender<WireFrame>,
) {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                if inbound_tx.send(TransportEvent::Frame(text)).await.is_err() {
                    debug!("transport reader: runtime gone, stopping");
                    break;
                }
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = pong_tx.send(WireFrame::Pong(data)).await;
            }
            Some(Ok(Message::Pong(_))) => {}
            Some(Ok(Message::Binary(_))) => {
                // The host speaks text frames only.
                warn!("transport reader: ignoring unexpected binary frame");
            }
            Some(Ok(Message::Close(close_frame))) => {
                let (code, reason) = close_frame
                    .map(|cf| (Some(cf.code.into()), cf.reason.to_string()))
                    .unwrap_or((None, String::new()));
                let _ = inbound_tx.send(TransportEvent::Closed { code, reason }).await;
                break;
            }
            Some(Ok(Message::Frame(_))) => {
                // Raw frames — skip
            }
            Some(Err(e)) => {
                warn!("transport reader: read error: {}", e);
                let _ = inbound_tx
                    .send(TransportEvent::Closed {
                        code: None,
                        reason: e.to_string(),
                    })
                    .await;
                break;
            }
            None => {
                let _ = inbound_tx
                    .send(TransportEvent::Closed {
                        code: None,
                        reason: "connection ended".to_string(),
                    })
                    .await;
                break;
            }
        }
    }
    debug!("transport reader: task exiting");
}

async fn writer_task(
    mut sink: futures_util::stream::SplitSink<WsStream, Message>,
    mut rx: mpsc::Receiver<WireFrame>,
) {
    while let Some(frame) = rx.recv().await {
        let message = match frame {
            WireFrame::Text(text) => Message::Text(text),
            WireFrame::Pong(data) => Message::Pong(data),
        };
        if let Err(e) = sink.send(message).await {
            warn!("transport writer: write error: {}", e);
            break;
        }
    }
    let _ = sink.close().await;
    debug!("transport writer: task exiting");
}
