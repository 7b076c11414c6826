// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Conversation and participant entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::{ConversationId, MessageId, UserId};

/// Read-only reference to a user taking part in a conversation.
///
/// Owned by the profile subsystem; the chat core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

/// An addressable channel between a fixed set of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// The counterpart of the signed-in user, computed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_participant: Option<Participant>,
    /// Denormalized snippet; the highest `(timestamp, id)` message known.
    #[serde(default)]
    pub last_message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Creates an empty conversation with the given participants.
    pub fn new(id: ConversationId, participants: Vec<Participant>) -> Self {
        Conversation {
            id,
            participants,
            other_participant: None,
            last_message: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Display name: the counterpart's name, else the joined participant names.
    pub fn title(&self) -> String {
        if let Some(other) = self.other_participant.as_ref().filter(|p| !p.name.is_empty()) {
            return other.name.clone();
        }
        let names: Vec<&str> = self
            .participants
            .iter()
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            format!("Conversation #{}", self.id)
        } else {
            names.join(", ")
        }
    }

    /// Sort key for list ordering, most recent activity first.
    ///
    /// Uses the last message when known, then `updated_at`, then `created_at`.
    pub fn recency(&self) -> Option<(DateTime<Utc>, MessageId)> {
        self.last_message
            .as_ref()
            .map(Message::order_key)
            .or_else(|| self.updated_at.map(|t| (t, 0)))
            .or_else(|| self.created_at.map(|t| (t, 0)))
    }

    fn matches_name(&self, needle: &str) -> bool {
        match &self.other_participant {
            Some(other) => other.name.to_lowercase().contains(needle),
            None => self
                .participants
                .iter()
                .any(|p| p.name.to_lowercase().contains(needle)),
        }
    }
}

/// Filters conversations by a case-insensitive substring of the counterpart's name.
///
/// A blank query returns every conversation.
pub fn filter_by_name<'a>(conversations: &'a [Conversation], query: &str) -> Vec<&'a Conversation> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return conversations.iter().collect();
    }
    conversations
        .iter()
        .filter(|c| c.matches_name(&needle))
        .collect()
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
