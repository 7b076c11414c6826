// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod conversations;
pub mod send;
pub mod show;
pub mod start;
pub mod watch;

use crate::api::ChatApi;
use crate::error::{Error, Result};
use crate::store::ConversationStore;
use crate::sync::Transport;

/// Turn a load failure recorded by the store into a command error.
fn check_loaded<A, T>(store: &ConversationStore<A, T>) -> Result<()>
where
    A: ChatApi + 'static,
    T: Transport + 'static,
{
    match store.error() {
        Some(message) => Err(Error::Load(message)),
        None => Ok(()),
    }
}
