// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST collaborator contract.
//!
//! [`ChatApi`] abstracts the four conversation endpoints so the store can be
//! driven by the real HTTP client or by an in-memory mock.

mod http;

use std::future::Future;
use std::pin::Pin;

use convo_core::api::{ConversationList, ConversationPage, CreatedConversation, SentMessage};
use convo_core::{ConversationId, UserId};

pub use http::HttpApi;

/// Error type for REST calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Result type for REST calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by [`ChatApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// The REST endpoints the conversation store depends on.
pub trait ChatApi: Send + Sync {
    /// `GET /conversations`
    fn list_conversations(&self) -> ApiFuture<'_, ConversationList>;

    /// `POST /conversations` (idempotent create-or-lookup)
    fn create_conversation(&self, participant_ids: Vec<UserId>)
        -> ApiFuture<'_, CreatedConversation>;

    /// `GET /conversations/:id` (first page of history, newest first)
    fn get_conversation(&self, id: ConversationId) -> ApiFuture<'_, ConversationPage>;

    /// `POST /conversations/:id/messages`
    fn send_message(&self, id: ConversationId, content: String) -> ApiFuture<'_, SentMessage>;
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
