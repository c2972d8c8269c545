//! Suggested prompts attached to the opening assistant message

use crate::state::ChatMessage;

pub const WELCOME_TEXT: &str =
    "Hi! I'm NEXA - ask me anything about DVC to UC transfers. Here are some ideas to get started:";

/// Example questions offered as one-click substitutes for typed input
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "What CS courses should I take at DVC for UC Berkeley?",
    "What Science courses are required for Computer Science at UC Davis?",
    "Show me the required courses for UCSD and UCB.",
    "I've completed Math 192, what does that cover at UCB?",
];

pub fn suggested_prompts() -> Vec<String> {
    SUGGESTED_PROMPTS.iter().map(|p| p.to_string()).collect()
}

/// The seed message every session starts with.
pub fn welcome_message() -> ChatMessage {
    ChatMessage::assistant(WELCOME_TEXT).with_prompts(suggested_prompts())
}
