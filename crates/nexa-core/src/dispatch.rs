//! One request/response exchange at a time
//!
//! [`Dispatcher::submit`] appends the user message, calls `/prompt`, and folds
//! the reply (or a canned fallback) back into the transcript. While an exchange
//! is in flight further submissions are dropped, not queued.

use std::sync::Arc;

use crate::client::{AssistantClient, PromptReply};
use crate::state::SessionStore;

pub const NO_RESPONSE_TEXT: &str = "Hmm, I didn't get a response.";
pub const UNREACHABLE_TEXT: &str =
    "I couldn't reach the server. Check the base URL and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing left after trimming
    Empty,
    /// Another exchange is still in flight
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(Rejection),
    Answered,
    /// 2xx without a usable answer
    NoAnswer,
    /// Transport failure, non-2xx, or malformed body
    Unreachable,
}

impl SubmitOutcome {
    pub fn was_accepted(&self) -> bool {
        !matches!(self, SubmitOutcome::Rejected(_))
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<SessionStore>,
    client: AssistantClient,
}

impl Dispatcher {
    pub fn new(store: Arc<SessionStore>, client: AssistantClient) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn client(&self) -> &AssistantClient {
        &self.client
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Rejected(Rejection::Empty);
        }

        let Some(_pending) = self.store.begin_exchange() else {
            tracing::debug!("exchange already in flight, dropping submission");
            return SubmitOutcome::Rejected(Rejection::Pending);
        };

        self.store.append_user(text);
        self.store.clear_draft();
        tracing::debug!(chars = text.chars().count(), "sending prompt");

        // `_pending` is released after the reply lands, whichever branch runs
        match self.client.prompt(text).await {
            Ok(PromptReply::Answer(answer)) => {
                self.store.append_assistant(answer, None);
                SubmitOutcome::Answered
            }
            Ok(PromptReply::Empty) => {
                tracing::info!("backend answered without a response field");
                self.store.append_assistant(NO_RESPONSE_TEXT, None);
                SubmitOutcome::NoAnswer
            }
            Err(e) => {
                tracing::warn!(error = %e, base_url = self.client.base_url(), "prompt request failed");
                self.store.append_assistant(UNREACHABLE_TEXT, None);
                SubmitOutcome::Unreachable
            }
        }
    }

    /// Submit whatever is currently in the input field.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.store.draft();
        self.submit(&draft).await
    }

    /// Same as typing suggested prompt `index` and submitting it.
    pub async fn activate_suggestion(&self, index: usize) -> SubmitOutcome {
        match self.store.suggested_prompt(index) {
            Some(prompt) => self.submit(&prompt).await,
            None => SubmitOutcome::Rejected(Rejection::Empty),
        }
    }
}
