//! UI rendering functions for TUI

use crate::conversation::{ChatMessage, QUICK_SUGGESTIONS};
use crate::format::{format_message, format_timestamp, parse_markup, Fragment};
use crate::transport::ConnectionState;
use crate::tui::app::App;
use crate::tui::types::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Main UI rendering function
pub fn ui(f: &mut Frame, app: &App) {
    let size = f.size();
    let theme = Theme::from_dark(app.conversation.is_dark_theme());

    f.render_widget(
        Block::default().style(Style::default().bg(theme.background()).fg(theme.foreground())),
        size,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Message history
            Constraint::Length(3), // Quick suggestions
            Constraint::Length(3), // Input box
            Constraint::Length(1), // Status/Help
        ])
        .split(size);

    render_header(f, app, theme, chunks[0]);
    render_messages(f, app, theme, chunks[1]);
    render_suggestions(f, app, theme, chunks[2]);
    render_input(f, app, theme, chunks[3]);
    render_help(f, app, theme, chunks[4]);
}

fn render_header(f: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let online = app.conversation.is_online();
    let connection = match app.connection {
        ConnectionState::Unconnected => "connecting",
        ConnectionState::Open => "connected",
        ConnectionState::Closed => "disconnected",
    };

    let header = Line::from(vec![
        Span::styled(
            "Hotel Assistant ",
            Style::default().fg(theme.user()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if online { "● Online" } else { "● Offline" },
            Style::default().fg(theme.online(online)),
        ),
        Span::styled(
            format!(
                "  | {} | {} messages",
                connection,
                app.conversation.message_count()
            ),
            Style::default().fg(theme.muted()),
        ),
    ]);

    let widget = Paragraph::new(header)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_messages(f: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible_height = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = app
        .conversation
        .messages()
        .iter()
        .flat_map(|msg| message_lines(msg, theme, inner_width, app.tick))
        .collect();

    let total = lines.len();
    let max_back = total.saturating_sub(visible_height);
    let back = app.scroll_back.min(max_back);
    let start = total.saturating_sub(visible_height + back);
    let end = (start + visible_height).min(total);

    let title = if back > 0 {
        format!("Messages (scrolled {} lines)", back)
    } else {
        "Messages".to_string()
    };

    let widget = Paragraph::new(lines[start..end].to_vec())
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}

/// Lines for one message: a header line, the wrapped body and a blank separator
pub fn message_lines(msg: &ChatMessage, theme: Theme, width: usize, tick: u64) -> Vec<Line<'static>> {
    let (label, color) = if msg.is_from_user() {
        ("You", theme.user())
    } else {
        ("Assistant", theme.assistant())
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", format_timestamp(&msg.created_at)),
            Style::default().fg(theme.muted()),
        ),
        Span::styled(
            format!("{}:", label),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])];

    if msg.is_pending {
        let dots = ".".repeat((tick % 3 + 1) as usize);
        lines.push(Line::from(Span::styled(
            format!("  typing{}", dots),
            Style::default().fg(theme.muted()).add_modifier(Modifier::ITALIC),
        )));
    } else {
        for fragments in parse_markup(&format_message(&msg.content)) {
            for wrapped in wrap_fragments(&fragments, width.saturating_sub(2)) {
                let mut spans = vec![Span::raw("  ")];
                spans.extend(wrapped.into_iter().map(|frag| fragment_span(frag, theme)));
                lines.push(Line::from(spans));
            }
        }
    }

    lines.push(Line::from(""));
    lines
}

fn fragment_span(frag: Fragment, theme: Theme) -> Span<'static> {
    let mut style = Style::default();
    if frag.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if frag.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if frag.code {
        style = style.fg(theme.code());
    }
    Span::styled(frag.text, style)
}

/// Break one line of fragments into rows of at most `width` characters
pub fn wrap_fragments(fragments: &[Fragment], width: usize) -> Vec<Vec<Fragment>> {
    let width = width.max(1);
    let mut rows: Vec<Vec<Fragment>> = vec![Vec::new()];
    let mut used = 0;

    for frag in fragments {
        let mut current = Fragment {
            text: String::new(),
            ..frag.clone()
        };

        for c in frag.text.chars() {
            if used == width {
                if !current.text.is_empty() {
                    let full = std::mem::replace(
                        &mut current,
                        Fragment {
                            text: String::new(),
                            ..frag.clone()
                        },
                    );
                    if let Some(row) = rows.last_mut() {
                        row.push(full);
                    }
                }
                rows.push(Vec::new());
                used = 0;
            }
            current.text.push(c);
            used += 1;
        }

        if !current.text.is_empty() {
            if let Some(row) = rows.last_mut() {
                row.push(current);
            }
        }
    }

    rows
}

fn render_suggestions(f: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let mut spans = Vec::new();
    for (i, suggestion) in QUICK_SUGGESTIONS.iter().enumerate() {
        let style = if app.selected_suggestion == Some(i) {
            Style::default()
                .fg(theme.background())
                .bg(theme.user())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted())
        };
        spans.push(Span::styled(format!(" {} ", suggestion), style));
        spans.push(Span::raw(" "));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Suggestions (Tab to pick, Ctrl+S to send)"),
    );
    f.render_widget(widget, area);
}

fn render_input(f: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let title = if app.conversation.is_awaiting_reply() {
        "Waiting for the assistant..."
    } else {
        "Type your message"
    };

    let widget = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(theme.foreground()))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}

fn render_help(f: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let help_text = if let Some(status) = &app.status_message {
        status.clone()
    } else {
        "Enter: Send | Ctrl+L: Clear | Ctrl+T: Theme | Ctrl+E: Export | PgUp/PgDn: Scroll | Esc: Quit"
            .to_string()
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(theme.muted()))
        .alignment(Alignment::Center);
    f.render_widget(help, area);
}
