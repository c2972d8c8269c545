use std::sync::Arc;

use nexa_core::{AssistantClient, ChatMessage, Config, Dispatcher, HealthPath, SessionStore};

pub struct App {
    pub should_quit: bool,

    // Session (transcript, draft, pending) lives in the core store
    pub session: Arc<SessionStore>,
    pub dispatcher: Dispatcher,
    pub health_path: HealthPath,

    // Input state
    pub input_cursor: usize, // cursor position in the draft, in chars

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Health probe popup
    pub health_checking: bool,
    pub health_popup: Option<String>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let base_url = config.resolve_base_url();
        let session = Arc::new(SessionStore::new());
        let dispatcher = Dispatcher::new(session.clone(), AssistantClient::new(&base_url));

        Self {
            should_quit: false,
            session,
            dispatcher,
            health_path: config.health_path,
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            health_checking: false,
            health_popup: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.client().base_url()
    }

    pub fn tick_animation(&mut self) {
        if self.session.is_pending() || self.health_checking {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Called on every store revision.
    pub fn on_session_changed(&mut self) {
        let draft_len = self.session.draft().chars().count();
        self.input_cursor = self.input_cursor.min(draft_len);
        self.scroll_chat_to_bottom();
    }

    /// Scroll chat to bottom so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = transcript_height(
            &self.session.snapshot(),
            self.session.is_pending(),
            self.wrap_width(),
        );

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let wanted = self.chat_scroll.saturating_add(lines);
        self.scroll_chat_to_bottom();
        self.chat_scroll = self.chat_scroll.min(wanted);
    }

    fn wrap_width(&self) -> usize {
        // Use actual chat width for wrap calculation, default to 50 if not set
        if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        }
    }
}

/// Rendered line count of a transcript, matching the layout in `ui.rs`
pub fn transcript_height(messages: &[ChatMessage], pending: bool, wrap_width: usize) -> u16 {
    let wrapped = |text: &str| -> u16 {
        // Use character count, not byte length, for proper UTF-8 handling
        let chars = text.chars().count();
        if chars == 0 {
            1
        } else {
            chars.div_ceil(wrap_width.max(1)) as u16
        }
    };

    let mut total_lines: u16 = 0;
    for msg in messages {
        total_lines = total_lines.saturating_add(1); // Role line ("You:" or "NEXA:")
        for line in msg.content.lines() {
            total_lines = total_lines.saturating_add(wrapped(line));
        }
        if let Some(prompts) = &msg.suggested_prompts {
            for (i, prompt) in prompts.iter().enumerate() {
                total_lines = total_lines.saturating_add(wrapped(&suggestion_label(i, prompt)));
            }
        }
        total_lines = total_lines.saturating_add(1); // Blank line after message
    }

    if pending {
        total_lines = total_lines.saturating_add(2); // "NEXA:" + "Thinking..."
    }

    total_lines
}

pub fn suggestion_label(index: usize, prompt: &str) -> String {
    format!("  [{}] {}", index + 1, prompt)
}
