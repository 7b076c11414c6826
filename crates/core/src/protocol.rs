// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime channel frames exchanged over the persistent connection.
//!
//! The protocol is small:
//! - Client announces room subscription intent (`join` / `leave`)
//! - Server pushes `new_message` to every member of the conversation room
//!
//! Frames are JSON objects of the form `{"event": "...", "data": {...}}`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::ConversationId;

/// Frames sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Subscribe to a conversation room. Redundant joins are deduplicated
    /// by the server.
    #[serde(rename_all = "camelCase")]
    Join { conversation_id: ConversationId },

    /// Unsubscribe from a conversation room.
    #[serde(rename_all = "camelCase")]
    Leave { conversation_id: ConversationId },
}

/// Frames sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A message was posted to a room this client has joined.
    #[serde(rename_all = "camelCase")]
    NewMessage {
        conversation_id: ConversationId,
        message: Message,
    },

    /// Error message.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientEvent {
    /// Creates a Join frame.
    pub fn join(conversation_id: ConversationId) -> Self {
        ClientEvent::Join { conversation_id }
    }

    /// Creates a Leave frame.
    pub fn leave(conversation_id: ConversationId) -> Self {
        ClientEvent::Leave { conversation_id }
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes the frame from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl ServerEvent {
    /// Creates a NewMessage frame.
    pub fn new_message(conversation_id: ConversationId, message: Message) -> Self {
        ServerEvent::NewMessage {
            conversation_id,
            message,
        }
    }

    /// Creates an Error frame.
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes the frame from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
