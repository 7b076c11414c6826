// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live view: pushes and polling feed the store, the view prints what
//! changed, and stdin lines are sent to the open conversation.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use convo_core::{ConversationId, MessageId};

use crate::api::ChatApi;
use crate::composer::Composer;
use crate::config::Config;
use crate::display::{format_conversation_line, format_message_line, truncate};
use crate::error::Result;
use crate::session::Session;
use crate::store::{ConversationStore, StoreSnapshot};
use crate::sync::Transport;

use super::check_loaded;

const SNIPPET_WIDTH: usize = 40;

const USAGE: &str = "commands: /open <id>, /list, /retry, /quit; any other line is sent";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Empty,
    Quit,
    List,
    Retry,
    Help,
    Open(ConversationId),
    Send(String),
    Invalid(String),
}

impl Input {
    pub(crate) fn parse(line: &str) -> Input {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Input::Send(line.to_string());
        };
        let mut words = command.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("quit" | "q"), None, None) => Input::Quit,
            (Some("list" | "ls"), None, None) => Input::List,
            (Some("retry"), None, None) => Input::Retry,
            (Some("help" | "?"), None, None) => Input::Help,
            (Some("open" | "o"), Some(id), None) => match id.parse() {
                Ok(id) => Input::Open(id),
                Err(_) => Input::Invalid(format!("not a conversation id: {id}")),
            },
            _ => Input::Invalid(format!("unknown command: /{command}")),
        }
    }
}

/// Tracks what has already been printed so each refresh prints only news.
#[derive(Debug, Default)]
pub(crate) struct WatchView {
    active: Option<ConversationId>,
    printed: HashSet<MessageId>,
    last_seen: HashMap<ConversationId, Option<MessageId>>,
}

impl WatchView {
    /// Start from the current list without announcing it.
    pub(crate) fn new(snapshot: &StoreSnapshot) -> Self {
        let mut view = WatchView::default();
        for conversation in &snapshot.conversations {
            view.last_seen.insert(
                conversation.id,
                conversation.last_message.as_ref().map(|m| m.id),
            );
        }
        view
    }

    /// Switch to `id` and return its history lines.
    pub(crate) fn open(&mut self, id: ConversationId, snapshot: &StoreSnapshot) -> Vec<String> {
        self.active = Some(id);
        self.printed.clear();
        let conversation = snapshot.conversations.iter().find(|c| c.id == id);

        let mut lines = Vec::new();
        if let Some(conversation) = conversation {
            lines.push(format!("── {} (#{}) ──", conversation.title(), id));
        }
        for message in snapshot.messages_by_conversation.get(&id).into_iter().flatten() {
            self.printed.insert(message.id);
            lines.push(format_message_line(message, conversation));
        }
        lines
    }

    /// Lines describing what changed since the last call.
    pub(crate) fn updates(&mut self, snapshot: &StoreSnapshot) -> Vec<String> {
        let mut lines = Vec::new();

        if snapshot.active_conversation_id != self.active {
            self.active = None;
            self.printed.clear();
        }

        if let Some(active) = self.active {
            let conversation = snapshot.conversations.iter().find(|c| c.id == active);
            for message in snapshot
                .messages_by_conversation
                .get(&active)
                .into_iter()
                .flatten()
            {
                if self.printed.insert(message.id) {
                    lines.push(format_message_line(message, conversation));
                }
            }
        }

        for conversation in &snapshot.conversations {
            let latest = conversation.last_message.as_ref().map(|m| m.id);
            let previous = self.last_seen.insert(conversation.id, latest);
            if Some(conversation.id) == self.active {
                continue;
            }
            match (previous, &conversation.last_message) {
                (None, _) => lines.push(format!("new conversation: {}", conversation.title())),
                (Some(previous), Some(last)) if previous != Some(last.id) => lines.push(format!(
                    "{} › {}",
                    conversation.title(),
                    truncate(&last.content, SNIPPET_WIDTH)
                )),
                _ => {}
            }
        }

        lines
    }
}

pub async fn run(config: &Config, id: Option<ConversationId>) -> Result<()> {
    let session = Session::from_config(config)?;
    if let Err(e) = session.sign_in().await {
        warn!(error = %e, "realtime channel unavailable, relying on polling");
        eprintln!("warning: realtime channel unavailable ({e}); updates arrive by polling");
    }

    let store = session.store();
    store.load_conversations(false).await;
    check_loaded(store)?;

    let mut out = std::io::stdout();
    let mut view = WatchView::new(&store.snapshot());
    for conversation in store.conversations() {
        writeln!(out, "{}", format_conversation_line(&conversation))?;
    }
    writeln!(out, "{USAGE}")?;

    let mut composer = None;
    if let Some(id) = id {
        composer = open(&session, id, &mut view, &mut out).await;
    }

    let _list_poller = session.watch_conversations();
    let _message_poller = session.watch_active_conversation();
    let mut changes = store.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                for line in view.updates(&store.snapshot()) {
                    writeln!(out, "{line}")?;
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Input::parse(&line) {
                    Input::Empty => {}
                    Input::Quit => break,
                    Input::Help => writeln!(out, "{USAGE}")?,
                    Input::Invalid(reason) => eprintln!("{reason}"),
                    Input::List => {
                        for conversation in store.conversations() {
                            writeln!(out, "{}", format_conversation_line(&conversation))?;
                        }
                    }
                    Input::Open(id) => {
                        if let Some(opened) = open(&session, id, &mut view, &mut out).await {
                            composer = Some(opened);
                        }
                    }
                    Input::Send(text) => match &composer {
                        Some(composer) => {
                            composer.set_draft(text);
                            submit(composer).await;
                        }
                        None => eprintln!("open a conversation first with /open <id>"),
                    },
                    Input::Retry => match &composer {
                        Some(composer) => submit(composer).await,
                        None => eprintln!("nothing to retry"),
                    },
                }
            }
        }
    }

    session.sign_out().await?;
    Ok(())
}

/// Activate `id`, print its history, and return a composer for it.
async fn open<A, T, W>(
    session: &Session<A, T>,
    id: ConversationId,
    view: &mut WatchView,
    out: &mut W,
) -> Option<Composer<A, T>>
where
    A: ChatApi + 'static,
    T: Transport + 'static,
    W: Write,
{
    let store: &ConversationStore<A, T> = session.store();
    if let Err(e) = store.set_active_conversation(Some(id)).await {
        eprintln!("error: {e}");
        return None;
    }
    if let Some(error) = store.error() {
        eprintln!("error: {error}");
        store.clear_error();
    }
    for line in view.open(id, &store.snapshot()) {
        if writeln!(out, "{line}").is_err() {
            break;
        }
    }
    Some(session.composer(id))
}

async fn submit<A, T>(composer: &Composer<A, T>)
where
    A: ChatApi + 'static,
    T: Transport + 'static,
{
    if let Err(e) = composer.submit().await {
        eprintln!("error: {e} (message kept, type /retry to resend)");
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
