// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use crate::config::RoomPolicy;
use crate::poller::MIN_PERIOD;
use crate::store::ConversationStore;
use crate::sync::RealtimeChannel;
use crate::test_helpers::{conv, msg, MockApi, MockTransport};

const PERIOD: Duration = Duration::from_millis(3_000);

fn make_store(api: &Arc<MockApi>) -> ConversationStore<MockApi, MockTransport> {
    let (transport, _remote) = MockTransport::new();
    let channel = Arc::new(RealtimeChannel::with_transport("mock://", transport));
    ConversationStore::new(Arc::clone(api), channel, RoomPolicy::default())
}

#[tokio::test(start_paused = true)]
async fn list_poller_fetches_immediately_then_every_period() {
    let api = MockApi::new();
    api.set_conversations(vec![conv(1, 10, "Ann")]);
    let store = make_store(&api);

    let guard = store.poll_conversations(PERIOD);
    tokio::time::sleep(Duration::from_millis(6_500)).await;

    assert_eq!(MockApi::calls(&api.list_calls), 3);
    assert_eq!(store.conversations().len(), 1);
    assert!(!store.is_loading_conversations());

    drop(guard);
    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(MockApi::calls(&api.list_calls), 3);
}

#[tokio::test(start_paused = true)]
async fn list_poller_failures_stay_in_background() {
    let api = MockApi::new();
    api.fail_list.store(true, std::sync::atomic::Ordering::SeqCst);
    let store = make_store(&api);

    let guard = store.poll_conversations(PERIOD);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(store.error(), None);
    assert!(store.background_error().is_some());
    guard.stop();
}

#[tokio::test(start_paused = true)]
async fn message_poller_follows_active_conversation() {
    let api = MockApi::new();
    api.set_conversations(vec![conv(1, 10, "Ann"), conv(2, 20, "Bea")]);
    let store = make_store(&api);
    store.load_conversations(false).await;

    let _guard = store.poll_active_messages(PERIOD);
    tokio::time::sleep(Duration::from_millis(100)).await;
    // Nothing active yet
    assert_eq!(MockApi::calls(&api.history_calls), 0);

    store.set_active_conversation(Some(2)).await.unwrap();
    api.set_history(2, vec![msg(1, 2, 10), msg(2, 2, 20)]);
    tokio::time::sleep(PERIOD).await;

    assert_eq!(MockApi::calls(&api.history_calls), 2);
    assert_eq!(store.messages(2).len(), 2);
    assert!(store.messages(1).is_empty());
}

#[tokio::test(start_paused = true)]
async fn stopped_poller_abandons_in_flight_fetch() {
    let api = MockApi::new();
    api.set_conversations(vec![conv(1, 10, "Ann")]);
    let gate = api.gate_list();
    let store = make_store(&api);

    let guard = store.poll_conversations(PERIOD);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(MockApi::calls(&api.list_calls), 1);

    guard.stop();
    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(store.conversations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_period_is_raised_to_the_minimum() {
    let api = MockApi::new();
    let store = make_store(&api);

    let _guard = store.poll_conversations(Duration::ZERO);
    tokio::time::sleep(MIN_PERIOD * 10).await;

    let calls = MockApi::calls(&api.list_calls);
    assert!((10..=11).contains(&calls), "unexpected call count {calls}");
}
