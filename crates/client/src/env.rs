// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by the client are defined here
//! with typed accessor functions.

/// Environment variable names.
pub mod vars {
    pub const CONVO_API_URL: &str = "CONVO_API_URL";
    pub const CONVO_WS_URL: &str = "CONVO_WS_URL";
    pub const CONVO_TOKEN: &str = "CONVO_TOKEN";
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `CONVO_API_URL` if set and non-empty.
pub fn api_url() -> Option<String> {
    non_empty(vars::CONVO_API_URL)
}

/// Returns the value of `CONVO_WS_URL` if set and non-empty.
pub fn ws_url() -> Option<String> {
    non_empty(vars::CONVO_WS_URL)
}

/// Returns the value of `CONVO_TOKEN` if set and non-empty.
pub fn token() -> Option<String> {
    non_empty(vars::CONVO_TOKEN)
}
