// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Message entity and its ordering key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ConversationId, MessageId, UserId};

/// Delivery state of a message.
///
/// Messages received from the server are always `Sent`. `Pending` and
/// `Failed` only describe outbound content that has not been confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Submitted, awaiting server confirmation.
    Pending,
    /// Confirmed by the server.
    #[default]
    Sent,
    /// The send request failed; the content must be resubmitted.
    Failed,
}

impl DeliveryState {
    /// Returns the string representation used on the wire and in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "pending",
            DeliveryState::Sent => "sent",
            DeliveryState::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message within a conversation.
///
/// Immutable once created, except for `delivery_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub delivery_state: DeliveryState,
}

impl Message {
    /// Creates a sent message.
    pub fn new(
        id: MessageId,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Message {
            id,
            conversation_id,
            sender_id,
            content: content.into(),
            timestamp,
            is_read: false,
            delivery_state: DeliveryState::Sent,
        }
    }

    /// The total-order key within a conversation: `(timestamp, id)` ascending.
    pub fn order_key(&self) -> (DateTime<Utc>, MessageId) {
        (self.timestamp, self.id)
    }

    /// Returns true if `self` sorts strictly after `other`.
    pub fn is_newer_than(&self, other: &Message) -> bool {
        self.order_key() > other.order_key()
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
