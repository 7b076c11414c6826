// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use convo_core::ConversationId;

use crate::api::ApiError;
use crate::sync::ChannelError;

/// All possible errors that can occur in the convo client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("conversation not found: {0}\n  hint: refresh the conversation list first")]
    UnknownConversation(ConversationId),

    #[error("{0}")]
    Api(#[from] ApiError),

    /// A store load failed; the store recorded the message.
    #[error("{0}")]
    Load(String),

    #[error("realtime channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for convo operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
