// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! convo-core: Shared data model for the convo conversation sync engine.
//!
//! This crate holds the plain entities, the merge/ordering rules, and the
//! wire formats (REST bodies and realtime frames). It performs no I/O.

pub mod api;
pub mod conversation;
pub mod error;
pub mod merge;
pub mod message;
pub mod protocol;

pub use conversation::{filter_by_name, Conversation, Participant};
pub use error::{Error, Result};
pub use merge::{latest_message, merge_messages, reconcile_conversations, upsert_conversation};
pub use message::{DeliveryState, Message};

/// Server-issued conversation identifier.
pub type ConversationId = u64;

/// Server-issued message identifier, unique within a conversation.
pub type MessageId = u64;

/// Server-issued user identifier.
pub type UserId = u64;
