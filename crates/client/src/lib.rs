// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! convo - client-side conversation sync engine and terminal client.
//!
//! Keeps a local, ordered, de-duplicated view of a user's conversations and
//! their messages consistent across REST fetches, realtime pushes, and
//! polling fallbacks.
//!
//! # Main Components
//!
//! - [`ConversationStore`] - conversation list, message buffers, and the merge rules
//! - [`RealtimeChannel`] - persistent push connection with room join/leave
//! - [`ChatApi`] / [`HttpApi`] - the REST endpoints the store depends on
//! - [`Session`] - wires the above together for one signed-in user
//! - [`Composer`] - single-flight message sending with draft retention
//!
//! ```rust,ignore
//! use convo::{Config, Session};
//!
//! let config = Config::resolve(None)?;
//! let session = Session::from_config(&config)?;
//! session.sign_in().await?;
//! session.store().load_conversations(false).await;
//! let _poller = session.watch_conversations();
//! ```

mod cli;
mod commands;
mod display;

pub mod api;
pub mod composer;
pub mod config;
pub mod env;
pub mod error;
pub mod poller;
pub mod session;
pub mod store;
pub mod sync;

#[cfg(test)]
mod test_helpers;

pub use api::{ApiError, ChatApi, HttpApi};
pub use cli::{Cli, Command, ConfigCommand, OutputFormat};
pub use composer::{Composer, SubmitOutcome};
pub use config::{Config, RoomPolicy, SyncSettings};
pub use error::{Error, Result};
pub use poller::PollGuard;
pub use session::Session;
pub use store::{ConversationStore, StoreSnapshot};
pub use sync::{RealtimeChannel, Transport, WebSocketTransport};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the level from `warn`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let explicit = cli.config.as_deref();
    match cli.command {
        Command::Config(cmd) => commands::config::run(cmd, explicit),
        command => {
            let config = Config::resolve(explicit)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(dispatch(command, &config))
        }
    }
}

async fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Conversations { filter, output } => {
            commands::conversations::run(config, filter, output).await
        }
        Command::Show { id, output } => commands::show::run(config, id, output).await,
        Command::Send { id, text } => commands::send::run(config, id, &text.join(" ")).await,
        Command::Start { user_ids, output } => {
            commands::start::run(config, user_ids, output).await
        }
        Command::Watch { id } => commands::watch::run(config, id).await,
        Command::Config(_) => Err(Error::Config(
            "config commands do not need a session".into(),
        )),
    }
}
