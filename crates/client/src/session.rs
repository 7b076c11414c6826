// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Signed-in session: one realtime channel, one store.

use std::sync::Arc;

use tracing::info;

use convo_core::ConversationId;

use crate::api::{ChatApi, HttpApi};
use crate::composer::Composer;
use crate::config::{Config, SyncSettings};
use crate::error::Result;
use crate::poller::PollGuard;
use crate::store::ConversationStore;
use crate::sync::{RealtimeChannel, Transport, WebSocketTransport};

/// Wires the REST client, realtime channel, and store together.
///
/// The channel is connected by [`Session::sign_in`] and closed by
/// [`Session::sign_out`]. Both are safe to repeat. In between, a dropped
/// connection is re-established by the channel and the store re-joins its
/// rooms without any call from here.
pub struct Session<A: ChatApi, T: Transport = WebSocketTransport> {
    channel: Arc<RealtimeChannel<T>>,
    store: ConversationStore<A, T>,
    settings: SyncSettings,
}

impl Session<HttpApi, WebSocketTransport> {
    /// Build a production session from resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = HttpApi::new(
            config.api_url.clone(),
            config.token.clone(),
            config.sync.page_size,
        )?;
        let channel = RealtimeChannel::new(config.ws_url.clone())
            .with_backoff(config.sync.reconnect_backoff());
        Ok(Session::new(
            Arc::new(api),
            Arc::new(channel),
            config.sync.clone(),
        ))
    }
}

impl<A: ChatApi + 'static, T: Transport + 'static> Session<A, T> {
    pub fn new(api: Arc<A>, channel: Arc<RealtimeChannel<T>>, settings: SyncSettings) -> Self {
        let store = ConversationStore::new(api, Arc::clone(&channel), settings.room_policy);
        Session {
            channel,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &ConversationStore<A, T> {
        &self.store
    }

    pub fn channel(&self) -> &Arc<RealtimeChannel<T>> {
        &self.channel
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Open the realtime channel and re-announce held rooms.
    ///
    /// Rooms held from before a sign-out are joined again. Calling this
    /// while signed in only repeats the room announcements, which the
    /// server treats as no-ops.
    pub async fn sign_in(&self) -> Result<()> {
        self.channel.connect().await?;
        self.store.rejoin_rooms();
        info!(url = %self.channel.url(), "session started");
        Ok(())
    }

    /// Close the realtime channel.
    pub async fn sign_out(&self) -> Result<()> {
        self.channel.disconnect().await?;
        info!("session ended");
        Ok(())
    }

    /// Start list polling at the configured period.
    pub fn watch_conversations(&self) -> PollGuard {
        self.store.poll_conversations(self.settings.poll_interval())
    }

    /// Start active-conversation polling at the configured period.
    pub fn watch_active_conversation(&self) -> PollGuard {
        self.store
            .poll_active_messages(self.settings.message_poll_interval())
    }

    pub fn composer(&self, conversation_id: ConversationId) -> Composer<A, T> {
        Composer::new(self.store.clone(), conversation_id)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
