// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime sync module.
//!
//! Provides the persistent push channel used alongside REST fetches.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ RealtimeChannel │────►│  Transport  │────►│   Remote    │
//! │  (join/leave)   │◄────│   (trait)   │◄────│   Server    │
//! └─────────────────┘     └─────────────┘     └─────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ on_message      │  (handlers, e.g. the conversation store)
//! └─────────────────┘
//! ```
//!
//! # Features
//!
//! - Idempotent connect/disconnect
//! - Fire-and-forget room subscription frames
//! - Automatic reconnect on a doubling delay, with reconnect handlers
//! - Message handlers that survive reconnects
//! - Injectable transport trait for testing

mod channel;
mod transport;

pub use channel::{
    Backoff, ChannelError, ChannelResult, MessageHandler, RealtimeChannel, ReconnectHandler,
};
pub use transport::{
    Transport, TransportError, TransportFuture, TransportResult, WebSocketTransport,
};
