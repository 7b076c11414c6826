// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Message composer for one conversation.
//!
//! Holds the draft and enforces one in-flight send at a time. The draft is
//! cleared only after the server confirms the message; on failure it stays
//! so the user can retry. A submit that is cancelled mid-send (dropped by a
//! `select!`, a timeout, or an aborted task) counts as a failure.

use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use convo_core::{ConversationId, DeliveryState, Message};

use crate::api::ChatApi;
use crate::error::Result;
use crate::store::ConversationStore;
use crate::sync::{Transport, WebSocketTransport};

/// Result of [`Composer::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server accepted the message.
    Sent(Message),
    /// The draft was blank; nothing was sent.
    Blank,
    /// A previous submit is still in flight.
    Busy,
}

#[derive(Debug, Default)]
struct Draft {
    text: String,
    sending: bool,
    delivery: Option<DeliveryState>,
    last_error: Option<String>,
}

/// Holds the composer in `sending` for as long as it lives.
///
/// Dropping it without [`InFlight::finish`] means the submit future was
/// cancelled before the server answered.
struct InFlight<'a> {
    draft: &'a Mutex<Draft>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn finish(mut self) -> MutexGuard<'a, Draft> {
        self.finished = true;
        let mut draft = lock(self.draft);
        draft.sending = false;
        draft
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut draft = lock(self.draft);
        draft.sending = false;
        draft.delivery = Some(DeliveryState::Failed);
        draft.last_error = Some("send cancelled before the server answered".to_string());
    }
}

fn lock(draft: &Mutex<Draft>) -> MutexGuard<'_, Draft> {
    draft.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct Composer<A: ChatApi, T: Transport = WebSocketTransport> {
    store: ConversationStore<A, T>,
    conversation_id: ConversationId,
    draft: Mutex<Draft>,
}

impl<A: ChatApi + 'static, T: Transport + 'static> Composer<A, T> {
    pub fn new(store: ConversationStore<A, T>, conversation_id: ConversationId) -> Self {
        Composer {
            store,
            conversation_id,
            draft: Mutex::new(Draft::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Draft> {
        lock(&self.draft)
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn draft(&self) -> String {
        self.lock().text.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().text = text.into();
    }

    /// True while a submit is awaiting the server.
    pub fn is_sending(&self) -> bool {
        self.lock().sending
    }

    /// Delivery state of the most recent submit, if any.
    pub fn delivery(&self) -> Option<DeliveryState> {
        self.lock().delivery
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        let draft = self.lock();
        !draft.sending && !draft.text.trim().is_empty()
    }

    /// Send the current draft.
    ///
    /// A second call while the first is in flight returns
    /// [`SubmitOutcome::Busy`] without a network call. If the draft was
    /// edited during the send, the edit survives a successful send. If this
    /// future is dropped before the server answers, the composer returns to
    /// idle with [`DeliveryState::Failed`] and the draft kept.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let content = {
            let mut draft = self.lock();
            if draft.sending {
                return Ok(SubmitOutcome::Busy);
            }
            if draft.text.trim().is_empty() {
                return Ok(SubmitOutcome::Blank);
            }
            draft.sending = true;
            draft.delivery = Some(DeliveryState::Pending);
            draft.last_error = None;
            draft.text.clone()
        };
        let in_flight = InFlight {
            draft: &self.draft,
            finished: false,
        };

        let result = self.store.send_message(self.conversation_id, &content).await;

        let mut draft = in_flight.finish();
        match result {
            Ok(Some(message)) => {
                draft.delivery = Some(DeliveryState::Sent);
                if draft.text == content {
                    draft.text.clear();
                }
                Ok(SubmitOutcome::Sent(message))
            }
            Ok(None) => {
                draft.delivery = None;
                Ok(SubmitOutcome::Blank)
            }
            Err(e) => {
                warn!(conversation_id = self.conversation_id, error = %e, "send failed");
                draft.delivery = Some(DeliveryState::Failed);
                draft.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "composer_tests.rs"]
mod tests;
