pub mod detail;
mod notifications;
mod popup;

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{Model, Page};
use crate::config::ThemeConfig;

pub fn render(frame: &mut Frame, model: &Model, theme: &ThemeConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    match model.page {
        Page::Notifications => notifications::render(frame, model, chunks[0]),
        Page::NotificationDetail => detail::render(frame, model, theme, chunks[0]),
        Page::Labels => {
            detail::render(frame, model, theme, chunks[0]);
            render_labels(frame, model);
        }
        Page::Priorities => {
            detail::render(frame, model, theme, chunks[0]);
            let items: Vec<String> = model
                .priorities
                .options
                .iter()
                .map(|p| p.name.clone())
                .collect();
            popup::render_select(frame, "Priority", &items, model.priorities.cursor);
        }
        Page::Comment => {
            detail::render(frame, model, theme, chunks[0]);
            popup::render_input(frame, "Comment", &model.comment.input);
        }
    }

    render_status_line(frame, model, chunks[1]);
    render_shortcuts(frame, model, chunks[2]);
}

fn render_labels(frame: &mut Frame, model: &Model) {
    if model.labels.loading {
        popup::render_select(frame, "Labels", &["Loading labels...".to_string()], 0);
        return;
    }

    let items: Vec<String> = model
        .labels
        .repo_labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mark = if model.labels.selected.contains(&i) {
                "[x]"
            } else {
                "[ ]"
            };
            format!("{} {}", mark, label.name)
        })
        .collect();

    if items.is_empty() {
        popup::render_select(frame, "Labels", &["No labels".to_string()], 0);
    } else {
        popup::render_select(frame, "Labels", &items, model.labels.cursor);
    }
}

fn render_status_line(frame: &mut Frame, model: &Model, area: Rect) {
    let status = if let Some(error) = &model.error {
        Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(notice) = &model.notice {
        Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Green)))
    } else if model.loading && model.page == Page::Notifications {
        Line::from(Span::styled(
            "Loading notifications...",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(status), area);
}

fn render_shortcuts(frame: &mut Frame, model: &Model, area: Rect) {
    let help = match model.page {
        Page::Notifications if model.list.searching => "type: filter | enter: done | esc: clear",
        Page::Notifications => {
            "j/k: nav | enter: open | r: read | u: unsubscribe | U: unwatch | o: browser | y: yank | /: search | R: refresh | q: quit"
        }
        Page::NotificationDetail => {
            "j/k: scroll | ←: back | r: read | u: unsubscribe | l: labels | p: priority | c: comment | o: browser | y: yank | R: reload"
        }
        Page::Labels => "j/k: nav | space: toggle | enter: save | esc: cancel",
        Page::Priorities => "j/k: nav | enter: set | esc: cancel",
        Page::Comment => "enter: post | esc: cancel",
    };

    let bar = Paragraph::new(Line::from(Span::styled(
        help,
        Style::default().fg(Color::Gray),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(bar, area);
}

/// Parse `#RRGGBB` (leading `#` optional) into a terminal color.
pub fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Black or white, whichever reads better on `background`.
fn contrast(background: Color) -> Color {
    match background {
        Color::Rgb(r, g, b) => {
            let luma = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
            if luma > 128_000 {
                Color::Black
            } else {
                Color::White
            }
        }
        _ => Color::White,
    }
}

/// A label rendered as a colored chip.
fn label_chip(name: &str, color: &str) -> Span<'static> {
    let bg = hex_color(color).unwrap_or(Color::DarkGray);
    Span::styled(
        format!(" {} ", name),
        Style::default()
            .bg(bg)
            .fg(contrast(bg))
            .add_modifier(Modifier::BOLD),
    )
}

fn format_age(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

fn hr(width: u16) -> Line<'static> {
    Line::from(Span::styled(
        "─".repeat(width as usize),
        Style::default().fg(Color::DarkGray),
    ))
}
