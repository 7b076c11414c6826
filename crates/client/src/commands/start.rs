// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use convo_core::UserId;

use crate::api::ChatApi;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::store::ConversationStore;
use crate::sync::Transport;

pub async fn run(config: &Config, user_ids: Vec<UserId>, output: OutputFormat) -> Result<()> {
    let session = Session::from_config(config)?;
    run_impl(session.store(), user_ids, output, &mut std::io::stdout()).await
}

/// Internal implementation that accepts a store and writer for testing.
pub(crate) async fn run_impl<A, T, W>(
    store: &ConversationStore<A, T>,
    user_ids: Vec<UserId>,
    output: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    A: ChatApi + 'static,
    T: Transport + 'static,
    W: Write,
{
    let (id, is_new) = store.start_conversation(user_ids).await?;

    match output {
        OutputFormat::Text if is_new => writeln!(out, "Started conversation {id}")?,
        OutputFormat::Text => writeln!(out, "Conversation {id} already exists")?,
        OutputFormat::Json => {
            let body = serde_json::json!({ "id": id, "isNew": is_new });
            serde_json::to_writer_pretty(&mut *out, &body)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "start_tests.rs"]
mod tests;
