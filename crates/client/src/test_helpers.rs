// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory doubles for the REST API and the realtime transport.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{mpsc, Notify};

use convo_core::api::{
    ConversationList, ConversationPage, CreatedConversation, MessagePage, SentMessage,
};
use convo_core::protocol::{ClientEvent, ServerEvent};
use convo_core::{Conversation, ConversationId, Message, MessageId, Participant, UserId};

use crate::api::{ApiError, ApiFuture, ChatApi};
use crate::config::RoomPolicy;
use crate::store::ConversationStore;
use crate::sync::{Backoff, RealtimeChannel, Transport, TransportError, TransportFuture};

/// The user the mock server treats as signed in.
pub const ME: UserId = 1;

// ─────────────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────────────

/// Timestamp `secs` seconds after a fixed epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_767_225_600 + secs, 0).unwrap()
}

pub fn msg(id: MessageId, conversation_id: ConversationId, secs: i64) -> Message {
    Message::new(id, conversation_id, ME, format!("message {id}"), at(secs))
}

/// A 1:1 conversation between [`ME`] and `other` named `name`.
pub fn conv(id: ConversationId, other: UserId, name: &str) -> Conversation {
    let peer = Participant {
        id: other,
        name: name.to_string(),
        avatar_ref: None,
    };
    let mut conversation = Conversation::new(
        id,
        vec![
            Participant {
                id: ME,
                name: "me".to_string(),
                avatar_ref: None,
            },
            peer.clone(),
        ],
    );
    conversation.other_participant = Some(peer);
    conversation.created_at = Some(at(0));
    conversation
}

/// Reconnect schedule short enough for tests to observe a few attempts.
pub const FAST_BACKOFF: Backoff = Backoff {
    initial: Duration::from_millis(10),
    max: Duration::from_millis(40),
};

/// Mock channel that reconnects on [`FAST_BACKOFF`].
pub fn mock_channel() -> (RealtimeChannel<MockTransport>, MockRemote) {
    let (transport, remote) = MockTransport::new();
    let channel = RealtimeChannel::with_transport("mock://", transport).with_backoff(FAST_BACKOFF);
    (channel, remote)
}

/// Store over a disconnected mock channel.
pub fn mock_store(api: &Arc<MockApi>) -> (ConversationStore<MockApi, MockTransport>, MockRemote) {
    let (channel, remote) = mock_channel();
    let store = ConversationStore::new(Arc::clone(api), Arc::new(channel), RoomPolicy::default());
    (store, remote)
}

/// Poll `cond` until it holds or two seconds pass.
pub async fn wait_until(cond: impl Fn() -> bool) -> bool {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}

// ─────────────────────────────────────────────────────────────────────────
// MockApi
// ─────────────────────────────────────────────────────────────────────────

/// Scripted REST backend with call counters, failure switches, and gates.
///
/// A gate holds the matching call until the test calls `notify_one` on it,
/// which lets tests interleave responses with pushes.
#[derive(Default)]
pub struct MockApi {
    conversations: Mutex<Vec<Conversation>>,
    history: Mutex<HashMap<ConversationId, Vec<Message>>>,
    created: Mutex<Option<CreatedConversation>>,
    sent: Mutex<Vec<(ConversationId, String)>>,
    next_message_id: AtomicUsize,

    pub fail_list: AtomicBool,
    pub fail_history: AtomicBool,
    pub fail_send: AtomicBool,

    list_gate: Mutex<Option<Arc<Notify>>>,
    history_gate: Mutex<Option<Arc<Notify>>>,
    send_gate: Mutex<Option<Arc<Notify>>>,

    pub list_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        let api = MockApi::default();
        api.next_message_id.store(1_000, Ordering::SeqCst);
        Arc::new(api)
    }

    pub fn set_conversations(&self, conversations: Vec<Conversation>) {
        *self.conversations.lock().unwrap() = conversations;
    }

    /// Replace the stored history of one conversation (any order).
    pub fn set_history(&self, id: ConversationId, messages: Vec<Message>) {
        self.history.lock().unwrap().insert(id, messages);
    }

    pub fn set_created(&self, created: CreatedConversation) {
        *self.created.lock().unwrap() = Some(created);
    }

    pub fn sent(&self) -> Vec<(ConversationId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn gate_list(&self) -> Arc<Notify> {
        Self::install(&self.list_gate)
    }

    pub fn gate_history(&self) -> Arc<Notify> {
        Self::install(&self.history_gate)
    }

    pub fn gate_send(&self) -> Arc<Notify> {
        Self::install(&self.send_gate)
    }

    fn install(slot: &Mutex<Option<Arc<Notify>>>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *slot.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    async fn pass(slot: &Mutex<Option<Arc<Notify>>>) {
        let gate = slot.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn failure(what: &str) -> ApiError {
        ApiError::Status {
            status: 500,
            message: format!("mock {what} failure"),
        }
    }
}

impl ChatApi for MockApi {
    fn list_conversations(&self) -> ApiFuture<'_, ConversationList> {
        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Self::pass(&self.list_gate).await;
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(Self::failure("list"));
            }
            Ok(ConversationList {
                conversations: self.conversations.lock().unwrap().clone(),
            })
        })
    }

    fn create_conversation(
        &self,
        participant_ids: Vec<UserId>,
    ) -> ApiFuture<'_, CreatedConversation> {
        Box::pin(async move {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            match self.created.lock().unwrap().clone() {
                Some(created) => Ok(created),
                None => Err(ApiError::Status {
                    status: 400,
                    message: format!("no conversation for {participant_ids:?}"),
                }),
            }
        })
    }

    fn get_conversation(&self, id: ConversationId) -> ApiFuture<'_, ConversationPage> {
        Box::pin(async move {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            Self::pass(&self.history_gate).await;
            if self.fail_history.load(Ordering::SeqCst) {
                return Err(Self::failure("history"));
            }
            let conversation = self
                .conversations
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .unwrap_or_else(|| Conversation::new(id, Vec::new()));
            let mut items = self
                .history
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .unwrap_or_default();
            items.sort_by_key(|m| std::cmp::Reverse(m.order_key()));
            let total = items.len() as u64;
            Ok(ConversationPage {
                conversation,
                messages: MessagePage {
                    items,
                    page: 1,
                    per_page: 20,
                    total,
                    pages: 1,
                },
            })
        })
    }

    fn send_message(&self, id: ConversationId, content: String) -> ApiFuture<'_, SentMessage> {
        Box::pin(async move {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            Self::pass(&self.send_gate).await;
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(Self::failure("send"));
            }
            self.sent.lock().unwrap().push((id, content.clone()));
            let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) as MessageId;
            let message = Message::new(message_id, id, ME, content, Utc::now());
            self.history
                .lock()
                .unwrap()
                .entry(id)
                .or_default()
                .push(message.clone());
            Ok(SentMessage { message })
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────
// MockTransport
// ─────────────────────────────────────────────────────────────────────────

/// Test-side handle for a [`MockTransport`].
#[derive(Clone)]
pub struct MockRemote {
    incoming: mpsc::UnboundedSender<Option<ServerEvent>>,
    outgoing: Arc<Mutex<Vec<ClientEvent>>>,
    connects: Arc<AtomicUsize>,
    fail_connect: Arc<AtomicBool>,
}

impl MockRemote {
    pub fn push(&self, event: ServerEvent) {
        self.incoming.send(Some(event)).unwrap();
    }

    pub fn push_message(&self, message: Message) {
        self.push(ServerEvent::new_message(message.conversation_id, message));
    }

    /// Simulate the server closing the connection.
    pub fn close(&self) {
        self.incoming.send(None).unwrap();
    }

    /// Frames the client has sent so far.
    pub fn sent(&self) -> Vec<ClientEvent> {
        self.outgoing.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }
}

/// Transport that records outbound frames and replays scripted inbound ones.
pub struct MockTransport {
    connected: bool,
    incoming: mpsc::UnboundedReceiver<Option<ServerEvent>>,
    outgoing: Arc<Mutex<Vec<ClientEvent>>>,
    connects: Arc<AtomicUsize>,
    fail_connect: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> (MockTransport, MockRemote) {
        let (tx, rx) = mpsc::unbounded_channel();
        let outgoing = Arc::new(Mutex::new(Vec::new()));
        let connects = Arc::new(AtomicUsize::new(0));
        let fail_connect = Arc::new(AtomicBool::new(false));
        let transport = MockTransport {
            connected: false,
            incoming: rx,
            outgoing: Arc::clone(&outgoing),
            connects: Arc::clone(&connects),
            fail_connect: Arc::clone(&fail_connect),
        };
        let remote = MockRemote {
            incoming: tx,
            outgoing,
            connects,
            fail_connect,
        };
        (transport, remote)
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _url: &str) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.fail_connect.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionFailed("refused".into()));
            }
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.connected = true;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected = false;
            Ok(())
        })
    }

    fn send(&mut self, event: ClientEvent) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::SendFailed("not connected".into()));
            }
            self.outgoing.lock().unwrap().push(event);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<ServerEvent>> {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::ConnectionClosed);
            }
            match self.incoming.recv().await {
                Some(Some(event)) => Ok(Some(event)),
                Some(None) | None => {
                    self.connected = false;
                    Ok(None)
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
