// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Polling fallbacks for pushes missed while disconnected.
//!
//! Each poller is a background task tied to a [`PollGuard`]. Dropping the
//! guard stops the task; an in-flight fetch is abandoned before it writes.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::api::ChatApi;
use crate::store::ConversationStore;
use crate::sync::Transport;

/// Shortest period a poller runs at; smaller requests, zero included, are
/// raised to it.
pub const MIN_PERIOD: Duration = Duration::from_millis(100);

/// Keeps a poller alive. Dropping it cancels the poller.
#[derive(Debug)]
pub struct PollGuard {
    _cancel: DropGuard,
}

impl PollGuard {
    /// Stop the poller now.
    pub fn stop(self) {
        drop(self._cancel);
    }
}

impl<A: ChatApi + 'static, T: Transport + 'static> ConversationStore<A, T> {
    /// Refresh the conversation list silently, once immediately and then
    /// every `period`, for as long as the guard lives.
    pub fn poll_conversations(&self, period: Duration) -> PollGuard {
        let store = self.clone();
        spawn_poller("conversations", period, move || {
            let store = store.clone();
            async move { store.load_conversations(true).await }
        })
    }

    /// Refresh the active conversation's history silently every `period`.
    ///
    /// The active id is read on each tick, so the poller follows
    /// conversation switches without being restarted.
    pub fn poll_active_messages(&self, period: Duration) -> PollGuard {
        let store = self.clone();
        spawn_poller("messages", period, move || {
            let store = store.clone();
            async move {
                if let Some(id) = store.active_conversation_id() {
                    store.load_messages(id, true).await;
                }
            }
        })
    }
}

fn spawn_poller<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> PollGuard
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let period = period.max(MIN_PERIOD);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(poller = name, ?period, "poller started");
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tick() => {}
                    }
                }
            }
        }
        debug!(poller = name, "poller stopped");
    });

    PollGuard {
        _cancel: cancel.drop_guard(),
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
