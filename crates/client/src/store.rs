// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Conversation store: the facade consumed by presentation code.
//!
//! The store owns the conversation list and the per-conversation message
//! buffers. Three producers feed it: REST fetches, pushed `new_message`
//! events, and the polling fallbacks in [`crate::poller`]. Every write goes
//! through the pure merge rules in [`convo_core::merge`], so the exposed state
//! does not depend on which response lands last.
//!
//! State lives behind a mutex that is never held across an await point.
//! Fetches are not cancelled: a late response for conversation A still
//! writes only into A's bucket.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::watch;
use tracing::{debug, warn};

use convo_core::merge::{merge_messages, reconcile_conversations, upsert_conversation};
use convo_core::{Conversation, ConversationId, Message, UserId};

use crate::api::{ApiError, ChatApi};
use crate::config::RoomPolicy;
use crate::error::{Error, Result};
use crate::sync::{RealtimeChannel, Transport, WebSocketTransport};

/// Point-in-time view of the store for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: Option<ConversationId>,
    pub messages_by_conversation: HashMap<ConversationId, Vec<Message>>,
    pub is_loading_conversations: bool,
    pub is_loading_messages: bool,
    /// Last user-visible failure of a non-silent load.
    pub error: Option<String>,
    /// Last failure of a silent refresh; logged, never disruptive.
    pub background_error: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    conversations: Vec<Conversation>,
    active_conversation_id: Option<ConversationId>,
    messages_by_conversation: HashMap<ConversationId, Vec<Message>>,
    /// In-flight non-silent loads; overlapping loads keep the flag raised.
    loading_conversations: u32,
    loading_messages: u32,
    error: Option<String>,
    background_error: Option<String>,
    /// Rooms this store has asked the channel to join.
    rooms: BTreeSet<ConversationId>,
}

impl StoreState {
    fn contains(&self, id: ConversationId) -> bool {
        self.conversations.iter().any(|c| c.id == id)
    }

    fn record_failure(&mut self, silent: bool, what: &str, err: &ApiError) {
        let message = format!("{what}: {err}");
        if silent {
            warn!(%message, "background refresh failed");
            self.background_error = Some(message);
        } else {
            warn!(%message, "load failed");
            self.error = Some(message);
        }
    }

    /// Rooms to leave when `next` becomes the only wanted room.
    fn release_rooms_except(&mut self, next: Option<ConversationId>) -> Vec<ConversationId> {
        let released: Vec<ConversationId> = self
            .rooms
            .iter()
            .copied()
            .filter(|room| Some(*room) != next)
            .collect();
        self.rooms.retain(|room| Some(*room) == next);
        released
    }
}

struct StoreInner<A, T: Transport> {
    api: Arc<A>,
    channel: Arc<RealtimeChannel<T>>,
    room_policy: RoomPolicy,
    state: Mutex<StoreState>,
    revision: watch::Sender<u64>,
}

/// Conversation list and message buffers kept consistent across fetches,
/// pushes, and polling.
pub struct ConversationStore<A: ChatApi, T: Transport = WebSocketTransport> {
    inner: Arc<StoreInner<A, T>>,
}

impl<A: ChatApi, T: Transport> Clone for ConversationStore<A, T> {
    fn clone(&self) -> Self {
        ConversationStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ChatApi + 'static, T: Transport + 'static> ConversationStore<A, T> {
    /// Create a store and register it as a `new_message` handler on `channel`.
    pub fn new(api: Arc<A>, channel: Arc<RealtimeChannel<T>>, room_policy: RoomPolicy) -> Self {
        let (revision, _) = watch::channel(0);
        let inner = Arc::new(StoreInner {
            api,
            channel: Arc::clone(&channel),
            room_policy,
            state: Mutex::new(StoreState::default()),
            revision,
        });

        let weak: Weak<StoreInner<A, T>> = Arc::downgrade(&inner);
        channel.on_message(move |conversation_id, message| {
            if let Some(inner) = weak.upgrade() {
                ConversationStore { inner }.apply_pushed(conversation_id, message);
            }
        });

        let weak: Weak<StoreInner<A, T>> = Arc::downgrade(&inner);
        channel.on_reconnect(move || {
            if let Some(inner) = weak.upgrade() {
                ConversationStore { inner }.resync();
            }
        });

        ConversationStore { inner }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply a mutation and publish a new revision.
    fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let result = {
            let mut state = self.lock();
            f(&mut state)
        };
        self.inner.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
        result
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Returns a copy of the full presentation state.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.lock();
        StoreSnapshot {
            conversations: state.conversations.clone(),
            active_conversation_id: state.active_conversation_id,
            messages_by_conversation: state.messages_by_conversation.clone(),
            is_loading_conversations: state.loading_conversations > 0,
            is_loading_messages: state.loading_messages > 0,
            error: state.error.clone(),
            background_error: state.background_error.clone(),
        }
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.lock().conversations.clone()
    }

    pub fn conversation(&self, id: ConversationId) -> Option<Conversation> {
        self.lock().conversations.iter().find(|c| c.id == id).cloned()
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        self.lock().active_conversation_id
    }

    /// Messages for one conversation, oldest first.
    pub fn messages(&self, id: ConversationId) -> Vec<Message> {
        self.lock()
            .messages_by_conversation
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_loading_conversations(&self) -> bool {
        self.lock().loading_conversations > 0
    }

    pub fn is_loading_messages(&self) -> bool {
        self.lock().loading_messages > 0
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn background_error(&self) -> Option<String> {
        self.lock().background_error.clone()
    }

    /// Dismiss the user-visible error.
    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }

    /// Receiver that changes after every state mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fetches
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch the conversation list and reduce it into local state.
    ///
    /// Silent mode leaves the loading flag and `error` untouched; failures
    /// are logged and kept in `background_error`.
    pub async fn load_conversations(&self, silent: bool) {
        if !silent {
            self.update(|s| {
                s.loading_conversations += 1;
                s.error = None;
            });
        }

        let result = self.inner.api.list_conversations().await;
        let policy = self.inner.room_policy;

        let released = self.update(|s| {
            if !silent {
                s.loading_conversations = s.loading_conversations.saturating_sub(1);
            }
            match result {
                Ok(list) => {
                    s.conversations = reconcile_conversations(
                        &s.conversations,
                        list.conversations,
                        &s.messages_by_conversation,
                    );
                    if silent {
                        s.background_error = None;
                    }
                    match s.active_conversation_id {
                        Some(active) if !s.contains(active) => {
                            debug!(active, "active conversation no longer listed");
                            s.active_conversation_id = None;
                            match policy {
                                RoomPolicy::ReleasePrevious => s.release_rooms_except(None),
                                RoomPolicy::Retain => Vec::new(),
                            }
                        }
                        _ => Vec::new(),
                    }
                }
                Err(e) => {
                    s.record_failure(silent, "failed to load conversations", &e);
                    Vec::new()
                }
            }
        });

        for room in released {
            self.inner.channel.leave(room);
        }
    }

    /// Fetch one page of history and merge it into the conversation's bucket.
    ///
    /// The page arrives newest first and is reversed before merging. Merging
    /// (not replacing) keeps any pushed message the page does not contain.
    pub async fn load_messages(&self, conversation_id: ConversationId, silent: bool) {
        if !silent {
            self.update(|s| {
                s.loading_messages += 1;
                s.error = None;
            });
        }

        let result = self.inner.api.get_conversation(conversation_id).await;

        self.update(|s| {
            if !silent {
                s.loading_messages = s.loading_messages.saturating_sub(1);
            }
            match result {
                Ok(page) => {
                    let items: Vec<Message> = page
                        .messages
                        .into_chronological()
                        .into_iter()
                        .filter(|m| {
                            let matches = m.conversation_id == conversation_id;
                            if !matches {
                                warn!(
                                    conversation_id,
                                    message_id = m.id,
                                    other = m.conversation_id,
                                    "dropping message from another conversation"
                                );
                            }
                            matches
                        })
                        .collect();
                    let bucket = s
                        .messages_by_conversation
                        .entry(conversation_id)
                        .or_default();
                    let merged = merge_messages(bucket, &items);
                    *bucket = merged;
                    if silent {
                        s.background_error = None;
                    }
                    debug!(conversation_id, fetched = items.len(), "merged history page");
                }
                Err(e) => s.record_failure(silent, "failed to load messages", &e),
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Active conversation and rooms
    // ─────────────────────────────────────────────────────────────────────

    /// Switch the active conversation.
    ///
    /// A non-null id must be in the conversation list. Room handling follows
    /// the [`RoomPolicy`]: with `ReleasePrevious` the previous room is left
    /// before the next one is joined. The history load that follows records
    /// its failure in `error` instead of returning it.
    pub async fn set_active_conversation(&self, id: Option<ConversationId>) -> Result<()> {
        let policy = self.inner.room_policy;

        let released = {
            let mut state = self.lock();
            if let Some(id) = id {
                if !state.contains(id) {
                    return Err(Error::UnknownConversation(id));
                }
            }
            state.active_conversation_id = id;
            let released = match policy {
                RoomPolicy::ReleasePrevious => state.release_rooms_except(id),
                RoomPolicy::Retain => Vec::new(),
            };
            if let Some(id) = id {
                state.rooms.insert(id);
            }
            released
        };
        self.inner.revision.send_modify(|rev| *rev = rev.wrapping_add(1));

        for room in released {
            self.inner.channel.leave(room);
        }

        if let Some(id) = id {
            self.inner.channel.join(id);
            self.load_messages(id, false).await;
        }
        Ok(())
    }

    /// Re-announce every held room, e.g. after the channel reconnects.
    pub fn rejoin_rooms(&self) {
        let rooms: Vec<ConversationId> = self.lock().rooms.iter().copied().collect();
        for room in rooms {
            self.inner.channel.join(room);
        }
    }

    /// Catch up after the channel reconnected: re-announce held rooms, then
    /// silently refetch the list and the active conversation to recover
    /// anything pushed while the connection was down.
    fn resync(&self) {
        self.rejoin_rooms();
        let store = self.clone();
        tokio::spawn(async move {
            store.load_conversations(true).await;
            if let Some(id) = store.active_conversation_id() {
                store.load_messages(id, true).await;
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────

    /// Send a message over REST.
    ///
    /// Blank content (after trimming) is a no-op and returns `Ok(None)`
    /// without a network call. The confirmed message is returned but not
    /// appended; it reaches the buffer through the push channel (or the next
    /// poll). Failures are returned to the caller.
    pub async fn send_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<Option<Message>> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            debug!(conversation_id, "ignoring blank message");
            return Ok(None);
        }

        let sent = self
            .inner
            .api
            .send_message(conversation_id, trimmed.to_string())
            .await?;
        debug!(conversation_id, message_id = sent.message.id, "message accepted");
        Ok(Some(sent.message))
    }

    /// Create (or look up) a conversation with the given participants.
    ///
    /// Returns the conversation id and whether it was newly created.
    pub async fn start_conversation(
        &self,
        participant_ids: Vec<UserId>,
    ) -> Result<(ConversationId, bool)> {
        let created = self.inner.api.create_conversation(participant_ids).await?;
        let id = created.conversation.id;

        self.update(|s| {
            s.conversations = upsert_conversation(
                &s.conversations,
                created.conversation,
                &s.messages_by_conversation,
            );
        });
        self.load_conversations(true).await;

        Ok((id, created.is_new))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Push
    // ─────────────────────────────────────────────────────────────────────

    /// Merge a pushed message and schedule a silent list refresh.
    ///
    /// The list snippet and order are not recomputed here; the refresh goes
    /// through the same reducer as polling.
    fn apply_pushed(&self, conversation_id: ConversationId, message: Message) {
        if message.conversation_id != conversation_id {
            warn!(
                conversation_id,
                message_id = message.id,
                other = message.conversation_id,
                "dropping pushed message with mismatched conversation"
            );
            return;
        }

        self.update(|s| {
            let bucket = s
                .messages_by_conversation
                .entry(conversation_id)
                .or_default();
            let merged = merge_messages(bucket, std::slice::from_ref(&message));
            *bucket = merged;
        });

        let store = self.clone();
        tokio::spawn(async move {
            store.load_conversations(true).await;
        });
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
