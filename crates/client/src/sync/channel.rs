// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime channel: one persistent connection per signed-in session.
//!
//! The channel owns its [`Transport`] and moves it into a driver task while
//! connected. The driver forwards outbound `join`/`leave` frames and hands
//! every inbound `new_message` to the registered handlers. When the server
//! drops the connection the driver reconnects on a doubling delay and then
//! runs the reconnect handlers, which re-announce room membership. It keeps
//! no membership state itself and performs no buffering or ordering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use convo_core::protocol::{ClientEvent, ServerEvent};
use convo_core::{ConversationId, Message};

use super::transport::{Transport, TransportError, WebSocketTransport};

/// Error type for channel lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The driver task died and took the transport with it.
    #[error("realtime transport lost: {0}")]
    TransportLost(String),
}

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Callback invoked for every inbound `new_message` event.
pub type MessageHandler = Arc<dyn Fn(ConversationId, Message) + Send + Sync>;

/// Callback invoked after the driver re-established a dropped connection.
pub type ReconnectHandler = Arc<dyn Fn() + Send + Sync>;

/// Delay schedule between reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    /// Delay before the given attempt (1-based): `initial`, doubled per
    /// failed attempt, capped at `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.initial
            .saturating_mul(1u32 << doublings)
            .min(self.max)
    }
}

/// State shared between the channel and its driver task.
#[derive(Default)]
struct Hooks {
    messages: RwLock<Vec<MessageHandler>>,
    reconnects: RwLock<Vec<ReconnectHandler>>,
    online: AtomicBool,
}

impl Hooks {
    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn dispatch(&self, conversation_id: ConversationId, message: Message) {
        let handlers: Vec<MessageHandler> = self
            .messages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        debug!(conversation_id, message_id = message.id, "new_message");
        for handler in handlers {
            handler(conversation_id, message.clone());
        }
    }

    fn reconnected(&self) {
        let handlers: Vec<ReconnectHandler> = self
            .reconnects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for handler in handlers {
            handler();
        }
    }
}

/// Running driver task and the means to stop it.
struct Driver<T> {
    task: JoinHandle<T>,
    cancel: CancellationToken,
}

/// Connection lifecycle: the transport is either parked here or owned by
/// the driver.
struct Lifecycle<T> {
    transport: Option<T>,
    driver: Option<Driver<T>>,
}

/// Persistent bidirectional connection with room subscription primitives.
pub struct RealtimeChannel<T: Transport = WebSocketTransport> {
    url: String,
    backoff: Backoff,
    lifecycle: tokio::sync::Mutex<Lifecycle<T>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<ClientEvent>>>,
    hooks: Arc<Hooks>,
}

impl RealtimeChannel<WebSocketTransport> {
    /// Create a channel backed by a WebSocket transport.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_transport(url, WebSocketTransport::new())
    }
}

impl<T: Transport + 'static> RealtimeChannel<T> {
    /// Create a channel with a custom transport (for testing).
    pub fn with_transport(url: impl Into<String>, transport: T) -> Self {
        RealtimeChannel {
            url: url.into(),
            backoff: Backoff::default(),
            lifecycle: tokio::sync::Mutex::new(Lifecycle {
                transport: Some(transport),
                driver: None,
            }),
            outbound: Mutex::new(None),
            hooks: Arc::new(Hooks::default()),
        }
    }

    /// Replace the reconnect delay schedule.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// The server URL this channel connects to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the connection. A second call while the driver runs is a no-op,
    /// including while it is waiting to reconnect.
    ///
    /// Only this first connect reports failure; later drops are retried by
    /// the driver until [`RealtimeChannel::disconnect`].
    pub async fn connect(&self) -> ChannelResult<()> {
        let mut life = self.lifecycle.lock().await;
        if life.driver.as_ref().is_some_and(|d| !d.task.is_finished()) {
            debug!(url = %self.url, "channel already running");
            return Ok(());
        }
        Self::reclaim(&mut life).await?;

        let mut transport = life
            .transport
            .take()
            .ok_or_else(|| ChannelError::TransportLost("no transport available".into()))?;
        if let Err(e) = transport.connect(&self.url).await {
            life.transport = Some(transport);
            return Err(e.into());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.outbound.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);

        self.hooks.set_online(true);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(drive(
            transport,
            Link {
                url: self.url.clone(),
                backoff: self.backoff,
                hooks: Arc::clone(&self.hooks),
                cancel: cancel.clone(),
            },
            rx,
        ));
        life.driver = Some(Driver { task, cancel });

        info!(url = %self.url, "realtime channel connected");
        Ok(())
    }

    /// Close the connection and stop reconnecting. A call while not
    /// connected is a no-op.
    pub async fn disconnect(&self) -> ChannelResult<()> {
        let mut life = self.lifecycle.lock().await;
        self.outbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let Some(driver) = life.driver.as_ref() else {
            debug!("channel already disconnected");
            return Ok(());
        };
        driver.cancel.cancel();
        Self::reclaim(&mut life).await?;
        self.hooks.set_online(false);

        if let Some(transport) = life.transport.as_mut() {
            transport.disconnect().await?;
        }
        info!(url = %self.url, "realtime channel disconnected");
        Ok(())
    }

    /// Returns true while the transport is connected. False before the
    /// first connect, after disconnect, and while a dropped connection is
    /// being re-established.
    pub fn is_connected(&self) -> bool {
        self.hooks.online.load(Ordering::SeqCst)
    }

    /// Emit a subscription-intent frame for a conversation room.
    pub fn join(&self, conversation_id: ConversationId) {
        self.emit(ClientEvent::join(conversation_id));
    }

    /// Emit an unsubscribe frame for a conversation room.
    pub fn leave(&self, conversation_id: ConversationId) {
        self.emit(ClientEvent::leave(conversation_id));
    }

    /// Register a callback for every inbound `new_message` event.
    ///
    /// Handlers outlive reconnects; they are attached to the channel, not
    /// to a particular connection.
    pub fn on_message<F>(&self, handler: F)
    where
        F: Fn(ConversationId, Message) + Send + Sync + 'static,
    {
        self.hooks
            .messages
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(handler));
    }

    /// Register a callback run on the driver task after each automatic
    /// reconnect. It must not block; frames it emits go out on the new
    /// connection.
    pub fn on_reconnect<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks
            .reconnects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(handler));
    }

    /// Fire-and-forget: frames emitted before connect or after disconnect
    /// are dropped. Frames emitted during a reconnect wait for the new
    /// connection.
    fn emit(&self, event: ClientEvent) {
        let outbound = self.outbound.lock().unwrap_or_else(|e| e.into_inner());
        match outbound.as_ref() {
            Some(tx) => {
                debug!(?event, "emit");
                if tx.send(event).is_err() {
                    debug!("driver gone, frame dropped");
                }
            }
            None => debug!(?event, "channel not connected, frame dropped"),
        }
    }

    /// Join a finished or cancelled driver and park its transport.
    async fn reclaim(life: &mut Lifecycle<T>) -> ChannelResult<()> {
        if let Some(driver) = life.driver.take() {
            match driver.task.await {
                Ok(transport) => life.transport = Some(transport),
                Err(e) => return Err(ChannelError::TransportLost(e.to_string())),
            }
        }
        Ok(())
    }
}

impl<T: Transport> Drop for RealtimeChannel<T> {
    fn drop(&mut self) {
        if let Some(driver) = self.lifecycle.get_mut().driver.as_ref() {
            driver.cancel.cancel();
        }
    }
}

/// Everything the driver needs besides the transport and the frame queue.
struct Link {
    url: String,
    backoff: Backoff,
    hooks: Arc<Hooks>,
    cancel: CancellationToken,
}

/// Why a connection stopped carrying frames.
enum Exit {
    /// Disconnect requested or the channel is gone.
    Stopped,
    /// The server closed the connection or an I/O call failed.
    Lost,
}

/// Driver task: owns the transport until cancelled, reconnecting whenever
/// the connection is lost.
async fn drive<T: Transport>(
    mut transport: T,
    link: Link,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
) -> T {
    while let Exit::Lost = pump(&mut transport, &link, &mut outbound).await {
        link.hooks.set_online(false);
        if !reconnect(&mut transport, &link).await {
            break;
        }
        link.hooks.set_online(true);
        info!(url = %link.url, "realtime channel reconnected");
        link.hooks.reconnected();
    }
    link.hooks.set_online(false);
    transport
}

/// Move frames both ways over the current connection until it ends.
async fn pump<T: Transport>(
    transport: &mut T,
    link: &Link,
    outbound: &mut mpsc::UnboundedReceiver<ClientEvent>,
) -> Exit {
    loop {
        tokio::select! {
            _ = link.cancel.cancelled() => return Exit::Stopped,

            event = outbound.recv() => {
                let Some(event) = event else {
                    return Exit::Stopped;
                };
                if let Err(e) = transport.send(event).await {
                    warn!(error = %e, "failed to send frame");
                    return Exit::Lost;
                }
            }

            inbound = transport.recv() => match inbound {
                Ok(Some(ServerEvent::NewMessage { conversation_id, message })) => {
                    link.hooks.dispatch(conversation_id, message);
                }
                Ok(Some(ServerEvent::Error { message })) => {
                    warn!(%message, "server reported error");
                }
                Ok(None) => {
                    info!("realtime connection closed by server");
                    return Exit::Lost;
                }
                Err(e) => {
                    warn!(error = %e, "realtime receive failed");
                    return Exit::Lost;
                }
            },
        }
    }
}

/// Retry `connect` on the backoff schedule. Returns false if cancelled
/// first.
async fn reconnect<T: Transport>(transport: &mut T, link: &Link) -> bool {
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        let delay = link.backoff.delay(attempt);
        debug!(attempt, ?delay, "waiting to reconnect");
        tokio::select! {
            _ = link.cancel.cancelled() => return false,
            _ = tokio::time::sleep(delay) => {}
        }

        let result = tokio::select! {
            _ = link.cancel.cancelled() => return false,
            result = transport.connect(&link.url) => result,
        };
        match result {
            Ok(()) => return true,
            Err(e) => warn!(attempt, error = %e, "reconnect failed"),
        }
    }
}
