// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use convo_core::ConversationId;

use crate::api::ChatApi;
use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::store::ConversationStore;
use crate::sync::Transport;

pub async fn run(config: &Config, id: ConversationId, text: &str) -> Result<()> {
    let session = Session::from_config(config)?;
    run_impl(session.store(), id, text, &mut std::io::stdout()).await
}

/// Internal implementation that accepts a store and writer for testing.
pub(crate) async fn run_impl<A, T, W>(
    store: &ConversationStore<A, T>,
    id: ConversationId,
    text: &str,
    out: &mut W,
) -> Result<()>
where
    A: ChatApi + 'static,
    T: Transport + 'static,
    W: Write,
{
    match store.send_message(id, text).await? {
        Some(message) => writeln!(out, "Sent message {} to conversation {}", message.id, id)?,
        None => writeln!(out, "Nothing to send: message is blank.")?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
