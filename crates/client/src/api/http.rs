// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP implementation of [`ChatApi`] using reqwest.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use convo_core::api::{
    conversation_path, messages_path, ConversationList, ConversationPage, CreateConversation,
    CreatedConversation, SendMessage, SentMessage,
};
use convo_core::{ConversationId, UserId};

use super::{ApiError, ApiFuture, ApiResult, ChatApi};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the backend on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
}

/// REST client for the conversation endpoints.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    page_size: u32,
}

impl HttpApi {
    /// Create a client rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        page_size: u32,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(HttpApi {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            page_size,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message.or(body.msg))
                .unwrap_or(fallback);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl ChatApi for HttpApi {
    fn list_conversations(&self) -> ApiFuture<'_, ConversationList> {
        Box::pin(Self::execute(self.request(Method::GET, "/conversations")))
    }

    fn create_conversation(
        &self,
        participant_ids: Vec<UserId>,
    ) -> ApiFuture<'_, CreatedConversation> {
        let builder = self
            .request(Method::POST, "/conversations")
            .json(&CreateConversation { participant_ids });
        Box::pin(Self::execute(builder))
    }

    fn get_conversation(&self, id: ConversationId) -> ApiFuture<'_, ConversationPage> {
        let builder = self
            .request(Method::GET, &conversation_path(id))
            .query(&[("per_page", self.page_size)]);
        Box::pin(Self::execute(builder))
    }

    fn send_message(&self, id: ConversationId, content: String) -> ApiFuture<'_, SentMessage> {
        let builder = self
            .request(Method::POST, &messages_path(id))
            .json(&SendMessage { content });
        Box::pin(Self::execute(builder))
    }
}
