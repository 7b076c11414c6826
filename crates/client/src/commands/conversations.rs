// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use convo_core::filter_by_name;

use crate::api::ChatApi;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_conversation_line;
use crate::error::Result;
use crate::session::Session;
use crate::store::ConversationStore;
use crate::sync::Transport;

use super::check_loaded;

pub async fn run(config: &Config, filter: Option<String>, output: OutputFormat) -> Result<()> {
    let session = Session::from_config(config)?;
    run_impl(
        session.store(),
        filter.as_deref(),
        output,
        &mut std::io::stdout(),
    )
    .await
}

/// Internal implementation that accepts a store and writer for testing.
pub(crate) async fn run_impl<A, T, W>(
    store: &ConversationStore<A, T>,
    filter: Option<&str>,
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

    let conversations = store.conversations();
    let shown = filter_by_name(&conversations, filter.unwrap_or_default());

    match output {
        OutputFormat::Text => {
            if shown.is_empty() {
                writeln!(out, "No conversations found.")?;
            }
            for conversation in shown {
                writeln!(out, "{}", format_conversation_line(conversation))?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &shown)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "conversations_tests.rs"]
mod tests;
