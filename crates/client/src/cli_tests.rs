// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use clap::{CommandFactory, Parser};
use yare::parameterized;

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("convo").chain(args.iter().copied())).unwrap()
}

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn send_joins_words() {
    let cli = parse(&["send", "4", "hello", "there"]);
    match cli.command {
        Command::Send { id, text } => {
            assert_eq!(id, 4);
            assert_eq!(text.join(" "), "hello there");
        }
        _ => unreachable!("expected send"),
    }
}

#[test]
fn global_options_after_subcommand() {
    let cli = parse(&["conversations", "-vv", "--config", "/tmp/c.toml"]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
}

#[parameterized(
    list_alias = { &["ls"] },
    filter = { &["conversations", "--filter", "ann", "-o", "json"] },
    show = { &["show", "3"] },
    start_many = { &["start", "2", "3"] },
    watch_none = { &["watch"] },
    watch_one = { &["watch", "9"] },
    config_init = { &["config", "init", "--force"] },
)]
fn accepts(args: &[&str]) {
    assert!(Cli::try_parse_from(std::iter::once("convo").chain(args.iter().copied())).is_ok());
}

#[parameterized(
    send_without_text = { &["send", "4"] },
    non_numeric_id = { &["show", "abc"] },
    start_without_users = { &["start"] },
    unknown_format = { &["conversations", "-o", "yaml"] },
)]
fn rejects(args: &[&str]) {
    assert!(Cli::try_parse_from(std::iter::once("convo").chain(args.iter().copied())).is_err());
}
