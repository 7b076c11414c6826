// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::{ConfigCommand, OutputFormat};
use crate::config::{default_path, Config};
use crate::error::{Error, Result};

const REDACTED: &str = "********";

/// Execute a config subcommand.
pub fn run(cmd: ConfigCommand, explicit: Option<&Path>) -> Result<()> {
    let mut out = std::io::stdout();
    match cmd {
        ConfigCommand::Show { output } => {
            let config = Config::resolve(explicit)?;
            run_show(&config, output, &mut out)
        }
        ConfigCommand::Path => {
            let path = config_path(explicit)?;
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
        ConfigCommand::Init { force } => {
            let path = config_path(explicit)?;
            run_init(&path, force, &mut out)
        }
    }
}

fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_path()
            .ok_or_else(|| Error::Config("could not determine the config directory".into())),
    }
}

/// Print the effective configuration with the token redacted.
pub(crate) fn run_show<W: Write>(config: &Config, output: OutputFormat, out: &mut W) -> Result<()> {
    let mut shown = config.clone();
    if shown.token.is_some() {
        shown.token = Some(REDACTED.to_string());
    }
    match output {
        OutputFormat::Text => {
            let text = toml::to_string_pretty(&shown)
                .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
            write!(out, "{text}")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &shown)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write default settings to `path`, refusing to clobber without `force`.
pub(crate) fn run_init<W: Write>(path: &Path, force: bool, out: &mut W) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save(path)?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
