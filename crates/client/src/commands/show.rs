// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use convo_core::ConversationId;

use crate::api::ChatApi;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_message_line;
use crate::error::Result;
use crate::session::Session;
use crate::store::ConversationStore;
use crate::sync::Transport;

use super::check_loaded;

pub async fn run(config: &Config, id: ConversationId, output: OutputFormat) -> Result<()> {
    let session = Session::from_config(config)?;
    run_impl(session.store(), id, output, &mut std::io::stdout()).await
}

/// Internal implementation that accepts a store and writer for testing.
pub(crate) async fn run_impl<A, T, W>(
    store: &ConversationStore<A, T>,
    id: ConversationId,
    output: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    A: ChatApi + 'static,
    T: Transport + 'static,
    W: Write,
{
    store.load_conversations(false).await;
    check_loaded(store)?;
    store.set_active_conversation(Some(id)).await?;
    check_loaded(store)?;

    let conversation = store.conversation(id);
    let messages = store.messages(id);

    match output {
        OutputFormat::Text => {
            if let Some(conversation) = &conversation {
                writeln!(out, "{} (#{})", conversation.title(), conversation.id)?;
            }
            if messages.is_empty() {
                writeln!(out, "No messages yet.")?;
            }
            for message in &messages {
                writeln!(out, "{}", format_message_line(message, conversation.as_ref()))?;
            }
        }
        OutputFormat::Json => {
            let body = serde_json::json!({
                "conversation": conversation,
                "messages": messages,
            });
            serde_json::to_writer_pretty(&mut *out, &body)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
