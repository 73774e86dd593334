use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Screen, SUGGESTED_PROMPTS};
use crate::message::{relative_age, Message};
use crate::theme::Theme;

/// Color roles resolved from the effective light/dark mode. Every widget
/// pulls from here so a theme change re-skins all screens at once.
struct Palette {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
    user: Color,
    assistant: Color,
    error: Color,
}

fn palette(dark: bool) -> Palette {
    if dark {
        Palette {
            bg: Color::Black,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Magenta,
            user: Color::Cyan,
            assistant: Color::Yellow,
            error: Color::Red,
        }
    } else {
        Palette {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Magenta,
            user: Color::Blue,
            assistant: Color::Green,
            error: Color::Red,
        }
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let colors = palette(app.is_dark());

    let background = Block::default().style(Style::default().bg(colors.bg).fg(colors.fg));
    frame.render_widget(background, frame.area());

    match app.screen {
        Screen::Chat => render_chat(frame, app, &colors),
        Screen::Explore => render_explore(frame, app, &colors),
        Screen::History => render_history(frame, app, &colors),
        Screen::Settings => render_settings(frame, app, &colors),
    }
}

/// Wrapped line count of one transcript message, including the author
/// line and the trailing blank. Saturates rather than overflowing; the
/// core puts no cap on message length.
fn message_lines(msg: &Message, width: usize) -> u32 {
    let mut count: u32 = 1; // author line
    for line in msg.text.lines() {
        let chars = line.chars().count();
        let wrapped = if chars == 0 { 1 } else { (chars / width.max(1)) + 1 };
        count = count.saturating_add(u32::try_from(wrapped).unwrap_or(u32::MAX));
    }
    count.saturating_add(1) // blank line after message
}

fn render_chat(frame: &mut Frame, app: &mut App, colors: &Palette) {
    let [header_area, chat_area, status_area, input_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_header(frame, header_area, "Neura", "Your AI Assistant", colors);

    // Transcript: user messages on the right, assistant on the left.
    let mut lines: Vec<Line> = Vec::new();
    for msg in app.conversation.transcript() {
        let (name_color, alignment) = if msg.is_user {
            (colors.user, Alignment::Right)
        } else {
            (colors.assistant, Alignment::Left)
        };

        lines.push(
            Line::from(Span::styled(
                format!("{}:", msg.author()),
                Style::default().fg(name_color).add_modifier(Modifier::BOLD),
            ))
            .alignment(alignment),
        );
        for text_line in msg.text.lines() {
            lines.push(Line::from(text_line.to_string()).alignment(alignment));
        }
        lines.push(Line::default());
    }

    if app.conversation.is_sending() {
        lines.push(Line::from(Span::styled(
            "Neura:",
            Style::default().fg(colors.assistant).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(colors.dim).add_modifier(Modifier::ITALIC),
        )));
    }

    // Clamp the scroll against the wrapped height so "scroll to bottom"
    // requests land on the last line.
    let inner_width = chat_area.width.saturating_sub(2) as usize;
    let total_lines: u32 = app
        .conversation
        .transcript()
        .iter()
        .fold(0u32, |sum, m| sum.saturating_add(message_lines(m, inner_width)))
        .saturating_add(if app.conversation.is_sending() { 2 } else { 0 });
    app.chat_height = chat_area.height.saturating_sub(2);
    app.total_chat_lines = total_lines;
    let max_scroll = total_lines
        .saturating_sub(u32::from(app.chat_height))
        .min(u32::from(u16::MAX)) as u16;
    if app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.dim)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    // Send failures surface here; the transcript above stays intact.
    let status = if let Some(reason) = app.conversation.error() {
        Line::from(Span::styled(reason, Style::default().fg(colors.error))).alignment(Alignment::Center)
    } else {
        Line::from(Span::styled(
            "Tab: switch screen | Esc: normal mode | q: quit",
            Style::default().fg(colors.dim),
        ))
    };
    frame.render_widget(Paragraph::new(status), status_area);

    render_input(frame, input_area, app, colors);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App, colors: &Palette) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { colors.accent } else { colors.dim };

    let draft = app.conversation.draft();
    let content = if draft.is_empty() && !editing {
        Span::styled("Type your message...", Style::default().fg(colors.dim))
    } else {
        Span::raw(draft)
    };

    let input = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Message (Enter to send) "),
    );
    frame.render_widget(input, area);

    if editing {
        let cursor_x = area.x + 1 + app.draft_cursor.min(u16::MAX as usize) as u16;
        frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
    }
}

fn render_explore(frame: &mut Frame, app: &mut App, colors: &Palette) {
    let [header_area, body_area, help_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header_area, "Try This", "Suggested prompts", colors);

    let items: Vec<ListItem> = SUGGESTED_PROMPTS
        .iter()
        .map(|prompt| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(*prompt),
                    Span::styled("  >", Style::default().fg(colors.dim)),
                ]),
                Line::default(),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.dim)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(colors.accent))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, body_area, &mut app.prompt_state);

    let help = Paragraph::new(Line::from(Span::styled(
        "Enter: use prompt | j/k: move | Tab: switch screen",
        Style::default().fg(colors.dim),
    )));
    frame.render_widget(help, help_area);
}

fn render_history(frame: &mut Frame, app: &mut App, colors: &Palette) {
    let [header_area, body_area, help_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let subtitle = if app.history.is_private() {
        "private".to_string()
    } else if app.history.is_empty() {
        "no messages".to_string()
    } else {
        format!("{} messages", app.history.len())
    };
    render_header(frame, header_area, "Chat History", &subtitle, colors);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.dim));

    if app.history.is_private() {
        let placeholder = Paragraph::new(vec![
            Line::default(),
            Line::from("Private Mode Enabled").alignment(Alignment::Center),
            Line::from(Span::styled(
                "Chat history is hidden for privacy",
                Style::default().fg(colors.dim),
            ))
            .alignment(Alignment::Center),
        ])
        .block(block);
        frame.render_widget(placeholder, body_area);
    } else if app.history.is_loading() {
        let loading = Paragraph::new(Line::from("Loading...").alignment(Alignment::Center)).block(block);
        frame.render_widget(loading, body_area);
    } else if let Some(error) = app.history.error() {
        let banner = Paragraph::new(Line::from(Span::styled(error, Style::default().fg(colors.error))).alignment(Alignment::Center))
            .block(block);
        frame.render_widget(banner, body_area);
    } else if app.history.visible().is_empty() {
        let empty = Paragraph::new(
            Line::from(Span::styled("No chat history yet", Style::default().fg(colors.dim)))
                .alignment(Alignment::Center),
        )
        .block(block);
        frame.render_widget(empty, body_area);
    } else {
        let now = Utc::now();
        let width = body_area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = app
            .history
            .visible()
            .iter()
            .map(|msg| {
                let name_color = if msg.is_user { colors.user } else { colors.assistant };
                let mut preview: String = msg.text.chars().take(width.max(8)).collect();
                if msg.text.chars().count() > width.max(8) {
                    preview.push('…');
                }
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            msg.author(),
                            Style::default().fg(name_color).add_modifier(Modifier::BOLD),
                        ),
                        Span::raw("  "),
                        Span::styled(relative_age(msg.timestamp, now), Style::default().fg(colors.dim)),
                    ]),
                    Line::from(preview),
                    Line::default(),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(colors.accent))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, body_area, &mut app.history_state);
    }

    let help = Paragraph::new(Line::from(Span::styled(
        "p: private mode | r: reload | j/k: move | Tab: switch screen",
        Style::default().fg(colors.dim),
    )));
    frame.render_widget(help, help_area);
}

fn render_settings(frame: &mut Frame, app: &mut App, colors: &Palette) {
    let [header_area, body_area, help_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header_area, "Settings", "Appearance", colors);

    let current = app.theme_store.theme();
    let items: Vec<ListItem> = Theme::all()
        .iter()
        .map(|theme| {
            let marker = if *theme == current { "(x)" } else { "( )" };
            let label = match theme {
                Theme::Auto => format!("{} {}  follows the system setting", marker, theme.label()),
                _ => format!("{} {}", marker, theme.label()),
            };
            ListItem::new(Line::from(label))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.dim))
                .title(" Theme "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(colors.accent))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, body_area, &mut app.theme_state);

    let help = Paragraph::new(Line::from(Span::styled(
        "Enter: apply | j/k: move | Tab: switch screen",
        Style::default().fg(colors.dim),
    )));
    frame.render_widget(help, help_area);
}

fn render_header(frame: &mut Frame, area: Rect, title: &str, subtitle: &str, colors: &Palette) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(colors.fg).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(subtitle, Style::default().fg(colors.dim))).alignment(Alignment::Center),
    ]);
    frame.render_widget(header, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn test_message_lines_counts_wraps() {
        let msg = Message::assistant("a".repeat(25));
        // author line + 3 wrapped lines (25 chars at width 10) + blank
        assert_eq!(message_lines(&msg, 10), 5);
    }

    #[test]
    fn test_message_lines_empty_text() {
        let msg = Message::assistant("");
        // "" has no lines() entries; author line + blank only
        assert_eq!(message_lines(&msg, 10), 2);
    }

    #[test]
    fn test_message_lines_huge_message_does_not_wrap_around() {
        // Far past what a u16 line count could hold.
        let msg = Message::assistant("a".repeat(100_000));
        let lines = message_lines(&msg, 1);
        assert_eq!(lines, 100_003);
    }
}
