// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};

use convo_core::{Conversation, Message};

/// Maximum characters of a message shown as a list snippet.
const SNIPPET_WIDTH: usize = 48;

/// Width of the title column in conversation lists.
const TITLE_WIDTH: usize = 20;

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
///
/// Newlines are flattened so the result fits on one line.
pub fn truncate(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max {
        return flat;
    }
    let keep = max.saturating_sub(3);
    let mut out: String = flat.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// One line per conversation: id, title, last message snippet and time.
pub fn format_conversation_line(conversation: &Conversation) -> String {
    let title = truncate(&conversation.title(), TITLE_WIDTH);
    match &conversation.last_message {
        Some(last) => format!(
            "{:>5}  {:<width$}  {}  {}",
            conversation.id,
            title,
            format_timestamp(&last.timestamp),
            truncate(&last.content, SNIPPET_WIDTH),
            width = TITLE_WIDTH
        ),
        None => format!(
            "{:>5}  {:<width$}  (no messages yet)",
            conversation.id,
            title,
            width = TITLE_WIDTH
        ),
    }
}

/// Name of the message sender as known to `conversation`.
pub fn sender_name(message: &Message, conversation: Option<&Conversation>) -> String {
    conversation
        .and_then(|c| c.participants.iter().find(|p| p.id == message.sender_id))
        .map(|p| p.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("user {}", message.sender_id))
}

pub fn format_message_line(message: &Message, conversation: Option<&Conversation>) -> String {
    format!(
        "[{}] {}: {}",
        format_timestamp(&message.timestamp),
        sender_name(message, conversation),
        message.content
    )
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
