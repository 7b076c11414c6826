// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Frame transport underneath the realtime channel.
//!
//! A transport carries `join`/`leave` frames out and chat events in over
//! one connection at a time. It knows nothing about rooms or retries: when
//! the connection ends, `recv` yields `None` and the channel decides when to
//! call `connect` again. Implementations must accept that second `connect`.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use convo_core::protocol::{ClientEvent, ServerEvent};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    ConnectionFailed(String),

    /// The operation needs an open connection and there is none.
    #[error("not connected")]
    ConnectionClosed,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    #[error("frame encoding failed: {0}")]
    Encode(#[from] convo_core::Error),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = BoxFuture<'a, TransportResult<T>>;

/// One bidirectional frame connection.
///
/// `recv` must be cancel-safe: the channel races it against outbound frames
/// and drops it whenever a frame has to go out first.
pub trait Transport: Send {
    /// Open a connection, replacing any previous one.
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    /// Close the connection. Closing an idle transport is not an error.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    fn send(&mut self, event: ClientEvent) -> TransportFuture<'_, ()>;

    /// Next chat event, or `None` once the server has gone away.
    fn recv(&mut self) -> TransportFuture<'_, Option<ServerEvent>>;

    fn is_connected(&self) -> bool;
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default time allowed for the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a single inbound WebSocket frame means for the chat channel.
#[derive(Debug, PartialEq)]
pub(super) enum Inbound {
    Event(ServerEvent),
    /// Control frames and events this client does not handle (typing,
    /// presence, binary payloads).
    Skip,
    Closed,
}

/// Sort an inbound frame into a chat event, noise, or the end of the stream.
pub(super) fn classify(frame: WsMessage) -> Inbound {
    match frame {
        WsMessage::Text(text) => match ServerEvent::from_json(&text) {
            Ok(event) => Inbound::Event(event),
            Err(e) => {
                debug!(error = %e, "skipping frame that is not a chat event");
                Inbound::Skip
            }
        },
        WsMessage::Close(reason) => {
            debug!(?reason, "server sent close frame");
            Inbound::Closed
        }
        // tungstenite answers pings itself on the next read or write
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Binary(_) | WsMessage::Frame(_) => {
            Inbound::Skip
        }
    }
}

/// JSON-over-WebSocket transport built on tokio-tungstenite.
pub struct WebSocketTransport {
    socket: Option<Socket>,
    connect_timeout: Duration,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport {
            socket: None,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    /// Bound the WebSocket handshake; a server that accepts TCP but never
    /// upgrades would otherwise stall a reconnect forever.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Forget a broken socket so `is_connected` reports the truth.
    fn drop_socket(&mut self, why: &str) {
        if self.socket.take().is_some() {
            debug!(why, "websocket dropped");
        }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_owned();
        async move {
            self.drop_socket("replaced by new connection");
            let handshake = tokio_tungstenite::connect_async(url.as_str());
            let (socket, response) = tokio::time::timeout(self.connect_timeout, handshake)
                .await
                .map_err(|_| {
                    TransportError::ConnectionFailed(format!(
                        "handshake with {url} timed out after {:?}",
                        self.connect_timeout
                    ))
                })?
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            debug!(%url, status = %response.status(), "websocket open");
            self.socket = Some(socket);
            Ok(())
        }
        .boxed()
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        async move {
            let Some(mut socket) = self.socket.take() else {
                return Ok(());
            };
            if let Err(e) = socket.close(None).await {
                // The peer may already be gone; the socket is dropped either way
                debug!(error = %e, "close handshake failed");
            }
            Ok(())
        }
        .boxed()
    }

    fn send(&mut self, event: ClientEvent) -> TransportFuture<'_, ()> {
        async move {
            let json = event.to_json()?;
            let socket = self.socket.as_mut().ok_or(TransportError::ConnectionClosed)?;
            match socket.send(WsMessage::Text(json.into())).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    self.drop_socket("send failed");
                    Err(TransportError::SendFailed(e.to_string()))
                }
            }
        }
        .boxed()
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<ServerEvent>> {
        async move {
            let socket = self.socket.as_mut().ok_or(TransportError::ConnectionClosed)?;
            let outcome = loop {
                match socket.next().await {
                    Some(Ok(frame)) => match classify(frame) {
                        Inbound::Event(event) => return Ok(Some(event)),
                        Inbound::Skip => continue,
                        Inbound::Closed => break Ok(None),
                    },
                    Some(Err(e)) => break Err(TransportError::ReceiveFailed(e.to_string())),
                    None => break Ok(None),
                }
            };
            self.drop_socket("stream ended");
            outcome
        }
        .boxed()
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }
}
