// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `<config_dir>/convo/config.toml` (or the file
//! given with `--config`) and includes:
//! - `api_url`: REST base URL
//! - `ws_url`: realtime channel URL
//! - `token`: optional bearer token attached to REST calls
//! - `[sync]`: polling intervals, page size, room membership policy, and
//!   reconnect delays
//!
//! `CONVO_API_URL`, `CONVO_WS_URL` and `CONVO_TOKEN` override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::Backoff;

const CONFIG_DIR_NAME: &str = "convo";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// REST base URL, e.g. `http://localhost:5000/api`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Realtime channel URL, e.g. `ws://localhost:5000/ws`.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Bearer token for REST calls, obtained by the sign-in flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Refresh and subscription settings.
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Refresh and subscription settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Conversation list polling period while a list view is open (default: 3000).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Active conversation polling period while a chat view is open (default: 3000).
    #[serde(default = "default_poll_interval_ms")]
    pub message_poll_interval_ms: u64,
    /// Messages requested per history page (default: 20, server max: 50).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// What happens to the previous room when the active conversation changes.
    #[serde(default)]
    pub room_policy: RoomPolicy,
    /// First delay before reconnecting a dropped realtime channel (default: 500).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Upper bound for the doubling reconnect delay (default: 30000).
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

/// Room membership policy applied on conversation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomPolicy {
    /// Leave the previous room before joining the next one.
    #[default]
    ReleasePrevious,
    /// Join on activation and never leave; the server tolerates the fan-out.
    Retain,
}

fn default_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:5000/ws".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

fn default_page_size() -> u32 {
    20
}

fn default_reconnect_delay_ms() -> u64 {
    500
}

fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            poll_interval_ms: default_poll_interval_ms(),
            message_poll_interval_ms: default_poll_interval_ms(),
            page_size: default_page_size(),
            room_policy: RoomPolicy::default(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            ws_url: default_ws_url(),
            token: None,
            sync: SyncSettings::default(),
        }
    }
}

impl SyncSettings {
    /// Conversation list polling period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Active conversation polling period.
    pub fn message_poll_interval(&self) -> Duration {
        Duration::from_millis(self.message_poll_interval_ms)
    }

    /// Reconnect schedule for the realtime channel.
    pub fn reconnect_backoff(&self) -> Backoff {
        Backoff {
            initial: Duration::from_millis(self.reconnect_delay_ms),
            max: Duration::from_millis(self.reconnect_max_delay_ms),
        }
    }
}

impl Config {
    /// Loads configuration from the given file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Resolves the effective configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present, otherwise built-in defaults. Environment overrides
    /// are applied last, then the result is validated.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Config::load(path)?,
            None => match default_path() {
                Some(path) if path.is_file() => Config::load(&path)?,
                _ => Config::default(),
            },
        };
        config.apply_overrides(env::api_url(), env::ws_url(), env::token());
        config.validate()?;
        Ok(config)
    }

    /// Replaces fields with any provided override.
    pub fn apply_overrides(
        &mut self,
        api_url: Option<String>,
        ws_url: Option<String>,
        token: Option<String>,
    ) {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(url) = ws_url {
            self.ws_url = url;
        }
        if token.is_some() {
            self.token = token;
        }
    }

    /// Validates URL schemes and numeric settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "invalid api_url '{}': must start with http:// or https://",
                self.api_url
            )));
        }
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "invalid ws_url '{}': must start with ws:// or wss://",
                self.ws_url
            )));
        }
        if self.sync.poll_interval_ms == 0 || self.sync.message_poll_interval_ms == 0 {
            return Err(Error::Config("poll intervals must be greater than zero".into()));
        }
        if self.sync.page_size == 0 {
            return Err(Error::Config("page_size must be greater than zero".into()));
        }
        if self.sync.reconnect_delay_ms == 0
            || self.sync.reconnect_delay_ms > self.sync.reconnect_max_delay_ms
        {
            return Err(Error::Config(
                "reconnect_delay_ms must be greater than zero and at most reconnect_max_delay_ms"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Saves configuration to the given file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Default config file location: `<config_dir>/convo/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
