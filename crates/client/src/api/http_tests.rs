// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::{ApiError, ChatApi, HttpApi};

/// Answer a single HTTP request with `status` and `body`, returning the raw
/// request text.
async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        String::from_utf8_lossy(&raw).into_owned()
    });
    (format!("http://{addr}/api"), handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(split) = text.find("\r\n\r\n") else {
        return false;
    };
    let length = text[..split]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= split + 4 + length
}

const CONVERSATIONS: &str = r#"{"conversations":[{"id":3,"participants":[{"id":1,"name":"me"},{"id":2,"name":"Bea"}],"otherParticipant":{"id":2,"name":"Bea"},"lastMessage":null}]}"#;

#[tokio::test]
async fn list_sends_bearer_token_and_decodes() {
    let (base, server) = respond_once("200 OK", CONVERSATIONS).await;
    let api = HttpApi::new(base, Some("secret".into()), 20).unwrap();

    let list = api.list_conversations().await.unwrap();
    assert_eq!(list.conversations.len(), 1);
    assert_eq!(list.conversations[0].id, 3);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/conversations HTTP/1.1"));
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: bearer secret"));
}

#[tokio::test]
async fn history_request_carries_page_size() {
    let body = r#"{"conversation":{"id":3,"participants":[]},"messages":{"items":[],"page":1,"per_page":50,"total":0,"pages":0}}"#;
    let (base, server) = respond_once("200 OK", body).await;
    let api = HttpApi::new(format!("{base}/"), None, 50).unwrap();

    let page = api.get_conversation(3).await.unwrap();
    assert_eq!(page.conversation.id, 3);
    assert!(page.messages.items.is_empty());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/conversations/3?per_page=50 HTTP/1.1"));
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn send_posts_json_content() {
    let body = r#"{"message":{"id":11,"conversationId":3,"senderId":1,"content":"hi","timestamp":"2026-01-01T00:00:00Z"}}"#;
    let (base, server) = respond_once("201 Created", body).await;
    let api = HttpApi::new(base, None, 20).unwrap();

    let sent = api.send_message(3, "hi".into()).await.unwrap();
    assert_eq!(sent.message.id, 11);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/conversations/3/messages HTTP/1.1"));
    assert!(request.ends_with(r#"{"content":"hi"}"#));
}

#[tokio::test]
async fn create_posts_participant_ids() {
    let body = r#"{"conversation":{"id":8,"participants":[]},"isNew":true}"#;
    let (base, server) = respond_once("201 Created", body).await;
    let api = HttpApi::new(base, None, 20).unwrap();

    let created = api.create_conversation(vec![2]).await.unwrap();
    assert_eq!(created.conversation.id, 8);
    assert!(created.is_new);

    let request = server.await.unwrap();
    assert!(request.ends_with(r#"{"participantIds":[2]}"#));
}

#[tokio::test]
async fn error_status_maps_to_api_error() {
    let cases = [
        ("404 Not Found", r#"{"message":"Conversation not found"}"#, 404, "Conversation not found"),
        ("401 Unauthorized", r#"{"msg":"Token has expired"}"#, 401, "Token has expired"),
        ("500 Internal Server Error", "", 500, "Internal Server Error"),
    ];
    for (status_line, body, status, message) in cases {
        let (base, _server) = respond_once(status_line, body).await;
        let api = HttpApi::new(base, None, 20).unwrap();

        let err = api.list_conversations().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status,
                message: message.to_string()
            },
            "{status_line}"
        );
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (base, _server) = respond_once("200 OK", r#"{"unexpected":true}"#).await;
    let api = HttpApi::new(base, None, 20).unwrap();

    let err = api.list_conversations().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpApi::new(format!("http://{addr}/api"), None, 20).unwrap();

    let err = api.list_conversations().await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}
