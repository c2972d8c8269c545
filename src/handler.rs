use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use nexa_core::check_health;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => app.scroll_chat_to_bottom(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::SessionChanged => app.on_session_changed(),
        AppEvent::Exchange(outcome) => {
            tracing::debug!(?outcome, "exchange settled");
        }
        AppEvent::Health(status) => {
            app.health_checking = false;
            app.health_popup = Some(status.summary());
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Any key dismisses the health popup
    if app.health_popup.take().is_some() {
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::F(2) => spawn_health_check(app, tx),
        KeyCode::Enter => spawn_submit(app, tx, None),

        // Suggested prompts, while nothing has been typed
        KeyCode::Char(c @ '1'..='9') if app.session.draft().is_empty() => {
            let index = (c as usize) - ('1' as usize);
            if app.session.suggested_prompt(index).is_some() {
                spawn_submit(app, tx, Some(index));
            } else {
                insert_char(app, c);
            }
        }

        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1) / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1) / 2),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),

        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let mut draft = app.session.draft();
                let byte_pos = char_to_byte_index(&draft, app.input_cursor);
                draft.remove(byte_pos);
                app.session.set_draft(draft);
            }
        }
        KeyCode::Delete => {
            let mut draft = app.session.draft();
            if app.input_cursor < draft.chars().count() {
                let byte_pos = char_to_byte_index(&draft, app.input_cursor);
                draft.remove(byte_pos);
                app.session.set_draft(draft);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.draft().chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.session.draft().chars().count();
        }
        KeyCode::Char(c) => insert_char(app, c),
        _ => {}
    }
}

fn insert_char(app: &mut App, c: char) {
    let mut draft = app.session.draft();
    let byte_pos = char_to_byte_index(&draft, app.input_cursor);
    draft.insert(byte_pos, c);
    app.input_cursor += 1;
    app.session.set_draft(draft);
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        _ => {}
    }
}

/// Run one exchange in the background so the UI loop keeps drawing.
/// The dispatcher drops the submission itself if one is already pending.
fn spawn_submit(app: &mut App, tx: &UnboundedSender<AppEvent>, suggestion: Option<usize>) {
    if app.session.is_pending() {
        return;
    }

    let dispatcher = app.dispatcher.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match suggestion {
            Some(index) => dispatcher.activate_suggestion(index).await,
            None => dispatcher.submit_draft().await,
        };
        let _ = tx.send(AppEvent::Exchange(outcome));
    });
}

fn spawn_health_check(app: &mut App, tx: &UnboundedSender<AppEvent>) {
    if app.health_checking {
        return;
    }
    app.health_checking = true;

    let client = app.dispatcher.client().clone();
    let path = app.health_path;
    let tx = tx.clone();
    tokio::spawn(async move {
        let status = check_health(&client, path).await;
        let _ = tx.send(AppEvent::Health(status));
    });
}
