//! UI-agnostic session state
//!
//! This module holds the transcript, the draft input, and the pending flag for
//! one mounted chat surface. Front ends (TUI today, anything else tomorrow)
//! render from a [`SessionStore`] and subscribe to its revision counter to know
//! when to redraw and scroll to the newest message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::suggestions;

/// A chat message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_prompts: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            suggested_prompts: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            suggested_prompts: None,
        }
    }

    pub fn with_prompts(mut self, prompts: Vec<String>) -> Self {
        self.suggested_prompts = Some(prompts);
        self
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Single source of truth for what a chat surface displays.
///
/// The transcript is append-only. Every mutation bumps the revision published
/// through [`SessionStore::subscribe`].
pub struct SessionStore {
    transcript: Mutex<Vec<ChatMessage>>,
    draft: Mutex<String>,
    pending: AtomicBool,
    revision: watch::Sender<u64>,
}

impl SessionStore {
    /// Create a store seeded with the welcome message and its suggested prompts.
    pub fn new() -> Self {
        Self::with_seed(suggestions::welcome_message())
    }

    pub fn with_seed(seed: ChatMessage) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            transcript: Mutex::new(vec![seed]),
            draft: Mutex::new(String::new()),
            pending: AtomicBool::new(false),
            revision,
        }
    }

    /// Append a user message. Returns false (and changes nothing) when the
    /// trimmed text is empty.
    pub fn append_user(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.lock_transcript().push(ChatMessage::user(text));
        self.bump();
        true
    }

    pub fn append_assistant(&self, text: impl Into<String>, prompts: Option<Vec<String>>) {
        let mut message = ChatMessage::assistant(text);
        message.suggested_prompts = prompts;
        self.lock_transcript().push(message);
        self.bump();
    }

    pub fn set_pending(&self, pending: bool) {
        self.pending.store(pending, Ordering::Release);
        self.bump();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Claim the single in-flight slot.
    ///
    /// Returns `None` if an exchange is already pending. The returned guard
    /// clears `pending` when dropped, on every exit path.
    pub fn begin_exchange(&self) -> Option<PendingGuard<'_>> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.bump();
        Some(PendingGuard { store: self })
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.lock_transcript().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_transcript().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_transcript().is_empty()
    }

    /// Suggested prompt `index` from the message carrying them (the seed).
    pub fn suggested_prompt(&self, index: usize) -> Option<String> {
        self.lock_transcript()
            .iter()
            .find_map(|m| m.suggested_prompts.as_ref())
            .and_then(|prompts| prompts.get(index).cloned())
    }

    pub fn draft(&self) -> String {
        self.lock_draft().clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *self.lock_draft() = text.into();
        self.bump();
    }

    pub fn clear_draft(&self) {
        self.lock_draft().clear();
        self.bump();
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that wakes on every store mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    // Poisoning is ignored: no critical section leaves partial state behind.
    fn lock_transcript(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_draft(&self) -> MutexGuard<'_, String> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the pending flag for one exchange
pub struct PendingGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.store.set_pending(false);
    }
}
