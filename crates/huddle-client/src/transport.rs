//! Socket.IO transport for the client.
//!
//! Provides [`ConnectedClient`] which handles WebSocket I/O for room events.
//! This is a thin layer that just frames and unframes events; session and
//! presence logic remain in the Sans-IO [`Client`](crate::Client).
//!
//! Only the WebSocket transport is spoken. There is no long-polling fallback
//! and no upgrade negotiation: the connection opens directly on
//! `transport=websocket`.

use std::{pin::pin, time::Duration};

use futures::{SinkExt, StreamExt};
use huddle_proto::{
    EnginePacket, InboundEvent, OpenHandshake, OutboundEvent, ProtocolError, SocketPacket,
    packet::encode_event,
};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc, time::Instant};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default Socket.IO endpoint path.
pub const DEFAULT_PATH: &str = "/socket.io/";

/// Time allowed for the WebSocket and Socket.IO handshakes.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of the event channels in each direction.
const CHANNEL_CAPACITY: usize = 64;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Endpoint could not be turned into a WebSocket URL.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Server did not complete the handshake.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Server sent something that could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Server address, e.g. `https://chat.example.com`.
    pub endpoint: String,
    /// Require an encrypted connection. Plain `ws`/`http` endpoints are
    /// upgraded to `wss`.
    pub secure: bool,
    /// Socket.IO endpoint path.
    pub path: String,
}

impl TransportConfig {
    /// Secure configuration for `endpoint` on the default path.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), secure: true, path: DEFAULT_PATH.to_string() }
    }

    /// WebSocket URL to dial.
    pub fn websocket_url(&self) -> Result<Url, TransportError> {
        let invalid = |reason: String| TransportError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason,
        };

        let mut url = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;

        let scheme = match (url.scheme(), self.secure) {
            ("ws" | "http", false) => "ws",
            ("ws" | "http" | "wss" | "https", _) => "wss",
            (other, _) => return Err(invalid(format!("unsupported scheme {other}"))),
        };
        url.set_scheme(scheme).map_err(|()| invalid(format!("cannot switch to {scheme}")))?;

        url.set_path(&self.path);
        url.set_query(Some("EIO=4&transport=websocket"));
        Ok(url)
    }
}

/// Handle to a connected client with WebSocket transport.
///
/// Provides channels for event transport. Events are sent/received via the
/// channels, and an internal task handles the WebSocket I/O. When the task
/// ends, `from_server` yields `None`.
///
/// Dropping the handle stops the task, so no inbound event is delivered after
/// teardown.
pub struct ConnectedClient {
    /// Send events to the server.
    pub to_server: mpsc::Sender<OutboundEvent>,
    /// Receive events from the server.
    pub from_server: mpsc::Receiver<InboundEvent>,
    /// Engine.IO session id.
    sid: String,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Engine.IO session id assigned by the server.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ConnectedClient {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Connect to a room server.
///
/// Opens the WebSocket, completes the Engine.IO open and Socket.IO connect
/// handshakes, and spawns the connection task.
pub async fn connect(config: &TransportConfig) -> Result<ConnectedClient, TransportError> {
    let url = config.websocket_url()?;
    tracing::info!(%url, "connecting");

    let (mut stream, handshake) = tokio::time::timeout(HANDSHAKE_TIMEOUT, open_session(&url))
        .await
        .map_err(|_| TransportError::Handshake("timed out".to_string()))??;

    tracing::info!(sid = %handshake.sid, "connected");

    let (to_server_tx, to_server_rx) = mpsc::channel::<OutboundEvent>(CHANNEL_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel::<InboundEvent>(CHANNEL_CAPACITY);

    let liveness = handshake.liveness_timeout();
    let handle = tokio::spawn(async move {
        run_connection(&mut stream, liveness, to_server_rx, from_server_tx).await;
        let _ = stream.close(None).await;
    });

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        sid: handshake.sid,
        abort_handle: handle.abort_handle(),
    })
}

/// Dial `url` and run both handshakes.
async fn open_session(url: &Url) -> Result<(WsStream, OpenHandshake), TransportError> {
    let (mut stream, response) = connect_async(url.as_str())
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    tracing::debug!(status = %response.status(), "websocket open");

    let open = match next_packet(&mut stream).await? {
        EnginePacket::Open(open) => open,
        other => return Err(TransportError::Handshake(format!("expected open, got {other:?}"))),
    };

    let connect = EnginePacket::Message(SocketPacket::Connect { sid: None }).encode();
    send_text(&mut stream, connect).await?;

    loop {
        match next_packet(&mut stream).await? {
            EnginePacket::Message(SocketPacket::Connect { .. }) => return Ok((stream, open)),
            EnginePacket::Message(SocketPacket::ConnectError { message }) => {
                return Err(TransportError::Handshake(message));
            },
            EnginePacket::Ping(data) => {
                send_text(&mut stream, EnginePacket::Pong(data).encode()).await?;
            },
            other => tracing::trace!(packet = ?other, "ignored during handshake"),
        }
    }
}

/// Run the connection, bridging between channels and the WebSocket.
async fn run_connection(
    stream: &mut WsStream,
    liveness: Duration,
    mut to_server: mpsc::Receiver<OutboundEvent>,
    from_server: mpsc::Sender<InboundEvent>,
) {
    let mut deadline = pin!(tokio::time::sleep(liveness));

    loop {
        tokio::select! {
            outbound = to_server.recv() => {
                let Some(event) = outbound else {
                    tracing::debug!("outbound channel closed");
                    let goodbye = EnginePacket::Message(SocketPacket::Disconnect).encode();
                    let _ = send_text(stream, goodbye).await;
                    break;
                };
                let text = match encode_event(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, event = event.name(), "encode failed");
                        continue;
                    },
                };
                if let Err(e) = send_text(stream, text).await {
                    tracing::warn!(error = %e, "send failed");
                    break;
                }
            },
            frame = stream.next() => {
                deadline.as_mut().reset(Instant::now() + liveness);
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if !handle_text(stream, &text, &from_server).await {
                            break;
                        }
                    },
                    Some(Ok(Message::Ping(data))) => {
                        if stream.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "websocket closed by server");
                        break;
                    },
                    Some(Ok(other)) => tracing::trace!(?other, "ignored websocket frame"),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "websocket error");
                        break;
                    },
                    None => break,
                }
            },
            () = &mut deadline => {
                tracing::warn!(?liveness, "server went silent");
                break;
            },
        }
    }
}

/// Handle one inbound text frame. Returns `false` when the connection should
/// end.
async fn handle_text(
    stream: &mut WsStream,
    text: &str,
    from_server: &mpsc::Sender<InboundEvent>,
) -> bool {
    let packet = match EnginePacket::parse(text) {
        Ok(packet) => packet,
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable packet");
            return true;
        },
    };

    match packet {
        EnginePacket::Ping(data) => {
            send_text(stream, EnginePacket::Pong(data).encode()).await.is_ok()
        },
        EnginePacket::Message(SocketPacket::Event { name, payload, .. }) => {
            match InboundEvent::decode(&name, payload) {
                Ok(Some(event)) => forward(from_server, event),
                Ok(None) => {
                    tracing::trace!(%name, "no handler for event");
                    true
                },
                Err(e) => {
                    tracing::warn!(error = %e, %name, "dropping malformed event");
                    true
                },
            }
        },
        EnginePacket::Message(SocketPacket::Disconnect) | EnginePacket::Close => {
            tracing::info!("server ended the session");
            false
        },
        other => {
            tracing::trace!(packet = ?other, "ignored packet");
            true
        },
    }
}

/// Hand an event to the application without blocking the socket loop.
///
/// A full queue drops the event so pings are still answered while the
/// application catches up. Returns `false` once the application has gone.
fn forward(from_server: &mpsc::Sender<InboundEvent>, event: InboundEvent) -> bool {
    match from_server.try_send(event) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(event)) => {
            tracing::warn!(event = event.name(), "inbound queue full, dropping event");
            true
        },
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

async fn next_packet(stream: &mut WsStream) -> Result<EnginePacket, TransportError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return Ok(EnginePacket::parse(&text)?),
            Some(Ok(Message::Close(_))) | None => {
                return Err(TransportError::Connection("closed during handshake".to_string()));
            },
            Some(Ok(_)) => {},
            Some(Err(e)) => return Err(TransportError::Connection(e.to_string())),
        }
    }
}

async fn send_text(stream: &mut WsStream, text: String) -> Result<(), TransportError> {
    tracing::trace!(%text, "send");
    stream.send(Message::Text(text)).await.map_err(|e| TransportError::Connection(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use huddle_proto::PeerTyping;

    use super::*;

    #[test]
    fn forward_drops_on_full_queue() {
        let (tx, mut rx) = mpsc::channel(1);

        assert!(forward(&tx, InboundEvent::HearTyping(PeerTyping::new("bob"))));
        assert!(forward(&tx, InboundEvent::HearTyping(PeerTyping::new("carol"))));

        assert_eq!(rx.try_recv().unwrap(), InboundEvent::HearTyping(PeerTyping::new("bob")));
        assert!(rx.try_recv().is_err());

        drop(rx);
        assert!(!forward(&tx, InboundEvent::HearTyping(PeerTyping::new("dave"))));
    }

    #[test]
    fn secure_forces_wss() {
        let config = TransportConfig::new("http://chat.example.com:3001");
        let url = config.websocket_url().unwrap();

        assert_eq!(url.as_str(), "wss://chat.example.com:3001/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn insecure_keeps_plain_websocket() {
        let config = TransportConfig { secure: false, ..TransportConfig::new("ws://localhost:3001") };
        let url = config.websocket_url().unwrap();

        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.path(), "/socket.io/");
    }

    #[test]
    fn rejects_unknown_scheme() {
        let config = TransportConfig::new("ftp://example.com");
        assert!(matches!(config.websocket_url(), Err(TransportError::InvalidEndpoint { .. })));
    }

    #[test]
    fn rejects_garbage() {
        let config = TransportConfig::new("not a url");
        assert!(matches!(config.websocket_url(), Err(TransportError::InvalidEndpoint { .. })));
    }
}
