// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use convo::Cli;

fn main() {
    let cli = Cli::parse();
    convo::init_logging(cli.verbose);
    if let Err(e) = convo::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
