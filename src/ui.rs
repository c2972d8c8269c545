use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use nexa_core::ChatRole;

use crate::app::{suggestion_label, App};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**").filter(|&end| end > 0) else {
            // No closing **, treat as literal
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after[..end].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if let Some(message) = app.health_popup.as_deref() {
        render_health_popup(message, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            " NEXA Chat ",
            Style::default().fg(Color::Black).bg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" UCB · UCD · UCSD ", Style::default().fg(Color::Magenta)),
        Span::styled(app.base_url().to_string(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let pending = app.session.is_pending();
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.session.snapshot() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(msg.content));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "NEXA:",
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }

        if let Some(prompts) = &msg.suggested_prompts {
            // Greyed out while an exchange is in flight
            let style = if pending {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            };
            for (i, prompt) in prompts.iter().enumerate() {
                lines.push(Line::from(Span::styled(suggestion_label(i, prompt), style)));
            }
        }
        lines.push(Line::default());
    }

    if pending {
        lines.push(Line::from(Span::styled(
            "NEXA:",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.session.is_pending();
    let border_color = if pending { Color::DarkGray } else { Color::Yellow };
    let title = if pending {
        " Waiting for NEXA... "
    } else {
        " Ask me anything about transfers "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Scroll offset keeps the cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .session
        .draft()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if app.health_popup.is_none() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let health = if app.health_checking {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        format!("checking{} ", dots)
    } else {
        "F2 health ".to_string()
    };

    let footer = Line::from(vec![
        Span::styled(" Enter ", Style::default().fg(Color::Yellow)),
        Span::raw("send  "),
        Span::styled("1-4 ", Style::default().fg(Color::Yellow)),
        Span::raw("suggested prompt  "),
        Span::styled("PgUp/PgDn ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll  "),
        Span::styled(health, Style::default().fg(Color::Yellow)),
        Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
        Span::raw("quit"),
    ]);
    frame.render_widget(Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)), area);
}

fn render_health_popup(message: &str, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5.min(area.height.saturating_sub(2));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Backend health (any key to close) ");

    let popup = Paragraph::new(message.to_string())
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, popup_area);
}
