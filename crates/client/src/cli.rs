// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use convo_core::{ConversationId, UserId};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  convo config init          Write a default config file
  convo conversations        List conversations
  convo show <id>            Show recent messages
  convo send <id> hello      Send a message
  convo watch <id>           Follow a conversation live";

#[derive(Parser)]
#[command(name = "convo", version)]
#[command(about = "Terminal client for one-to-one conversations with realtime sync")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file (default: <config_dir>/convo/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List conversations, most recent first
    #[command(alias = "ls")]
    Conversations {
        /// Only show conversations whose counterpart name contains this text
        #[arg(long, short)]
        filter: Option<String>,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show the latest messages of a conversation
    Show {
        id: ConversationId,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Send a message to a conversation
    Send {
        id: ConversationId,

        /// Message text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Start (or reopen) a conversation with other users
    Start {
        #[arg(required = true, num_args = 1..)]
        user_ids: Vec<UserId>,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Follow conversations live; lines typed on stdin are sent
    Watch {
        /// Conversation to open immediately
        id: Option<ConversationId>,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },
    /// Print the config file location
    Path,
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
