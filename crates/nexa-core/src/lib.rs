pub mod client;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod state;
pub mod suggestions;

// Re-export main types for convenience
pub use client::{AssistantClient, ClientError, HealthReport, PromptReply};
pub use config::Config;
pub use dispatch::{Dispatcher, Rejection, SubmitOutcome, NO_RESPONSE_TEXT, UNREACHABLE_TEXT};
pub use health::{check_health, HealthPath, HealthStatus};
pub use state::{ChatMessage, ChatRole, PendingGuard, SessionStore};
pub use suggestions::{welcome_message, SUGGESTED_PROMPTS};
