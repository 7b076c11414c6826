// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST request and response bodies.
//!
//! - `GET /conversations` → [`ConversationList`]
//! - `POST /conversations` [`CreateConversation`] → [`CreatedConversation`]
//! - `GET /conversations/:id` → [`ConversationPage`]
//! - `POST /conversations/:id/messages` [`SendMessage`] → [`SentMessage`]

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::message::Message;
use crate::{ConversationId, UserId};

/// Response body of `GET /conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationList {
    pub conversations: Vec<Conversation>,
}

/// Request body of `POST /conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversation {
    pub participant_ids: Vec<UserId>,
}

/// Response body of `POST /conversations`.
///
/// Creation is idempotent: an existing 1:1 conversation is returned with
/// `is_new == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedConversation {
    pub conversation: Conversation,
    pub is_new: bool,
}

/// One page of message history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub items: Vec<Message>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
}

impl MessagePage {
    /// Returns the page items in chronological (oldest first) order.
    pub fn into_chronological(self) -> Vec<Message> {
        let mut items = self.items;
        items.reverse();
        items
    }
}

/// Response body of `GET /conversations/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPage {
    pub conversation: Conversation,
    pub messages: MessagePage,
}

/// Request body of `POST /conversations/:id/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub content: String,
}

/// Response body of `POST /conversations/:id/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub message: Message,
}

/// Path of a single conversation resource.
pub fn conversation_path(id: ConversationId) -> String {
    format!("/conversations/{id}")
}

/// Path of a conversation's message collection.
pub fn messages_path(id: ConversationId) -> String {
    format!("/conversations/{id}/messages")
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
