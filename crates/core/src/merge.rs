// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Merge rules for combining fetched and pushed data.
//!
//! Merge rules:
//! - Messages: union by id (incoming wins), then sort by `(timestamp, id)`
//! - Conversation list: fetched membership, freshest known `last_message`,
//!   ordered by recency
//!
//! Every rule here is pure, idempotent, and independent of arrival order.

use std::collections::{HashMap, HashSet};

use crate::conversation::Conversation;
use crate::message::Message;
use crate::{ConversationId, MessageId};

/// Merges `incoming` into `existing` for a single conversation.
///
/// Source ordering is never trusted: the result is always re-sorted
/// ascending by `(timestamp, id)` and contains each id at most once.
pub fn merge_messages(existing: &[Message], incoming: &[Message]) -> Vec<Message> {
    let mut by_id: HashMap<MessageId, Message> =
        HashMap::with_capacity(existing.len() + incoming.len());
    for msg in existing.iter().chain(incoming) {
        by_id.insert(msg.id, msg.clone());
    }

    let mut merged: Vec<Message> = by_id.into_values().collect();
    merged.sort_by_key(Message::order_key);
    merged
}

/// Returns the highest `(timestamp, id)` message, if any.
pub fn latest_message(messages: &[Message]) -> Option<&Message> {
    messages.iter().max_by_key(|m| m.order_key())
}

/// Reduces a fetched conversation list against local knowledge.
///
/// The fetch defines which conversations exist. For each one, `last_message`
/// becomes the freshest of the fetched value, the previously known value, and
/// the tail of the local message buffer, so an older response never regresses
/// a snippet. The result is stably sorted by recency, newest first; ties keep
/// the server's order.
pub fn reconcile_conversations(
    previous: &[Conversation],
    fetched: Vec<Conversation>,
    buffers: &HashMap<ConversationId, Vec<Message>>,
) -> Vec<Conversation> {
    let prior: HashMap<ConversationId, &Conversation> =
        previous.iter().map(|c| (c.id, c)).collect();
    let mut seen = HashSet::with_capacity(fetched.len());
    let mut reconciled = Vec::with_capacity(fetched.len());

    for mut convo in fetched {
        if !seen.insert(convo.id) {
            continue;
        }

        let known = [
            prior.get(&convo.id).and_then(|p| p.last_message.as_ref()),
            buffers.get(&convo.id).and_then(|b| latest_message(b)),
        ];
        for candidate in known.into_iter().flatten() {
            let fresher = convo
                .last_message
                .as_ref()
                .is_none_or(|current| candidate.is_newer_than(current));
            if fresher {
                convo.last_message = Some(candidate.clone());
            }
        }

        reconciled.push(convo);
    }

    reconciled.sort_by(|a, b| b.recency().cmp(&a.recency()));
    reconciled
}

/// Inserts or replaces a single conversation, then reduces the list.
///
/// Used by the create path, which may return an existing conversation.
pub fn upsert_conversation(
    previous: &[Conversation],
    conversation: Conversation,
    buffers: &HashMap<ConversationId, Vec<Message>>,
) -> Vec<Conversation> {
    let mut candidate = previous.to_vec();
    match candidate.iter_mut().find(|c| c.id == conversation.id) {
        Some(slot) => *slot = conversation,
        None => candidate.push(conversation),
    }
    reconcile_conversations(previous, candidate, buffers)
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
