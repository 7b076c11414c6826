// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread::JoinHandle;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `convo` with configuration isolated from the host environment.
pub fn convo(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("convo");
    cmd.env_remove("CONVO_API_URL")
        .env_remove("CONVO_WS_URL")
        .env_remove("CONVO_TOKEN")
        .env_remove("RUST_LOG")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

/// A local address nothing listens on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

/// Write a config file pointing at `api_url` and return its path.
pub fn write_config(home: &TempDir, api_url: &str) -> PathBuf {
    let path = home.path().join("convo.toml");
    let ws_url = api_url.replace("http://", "ws://");
    std::fs::write(
        &path,
        format!("api_url = \"{api_url}\"\nws_url = \"{ws_url}\"\n"),
    )
    .unwrap();
    path
}

/// Answer one HTTP request with a 200 JSON `body`; returns the base URL.
pub fn serve_once(body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 8192];
        let n = stream.read(&mut buf).unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).into_owned();
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        request
    });
    (format!("http://{addr}/api"), handle)
}
