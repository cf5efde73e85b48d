use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::Model;
use crate::types::Notification;
use crate::viewport::viewport;

use super::format_age;

fn search_line(model: &Model) -> Line<'static> {
    let mut spans = vec![
        Span::styled("  Searching: ", Style::default().fg(Color::Gray)),
        Span::raw(model.list.search.clone()),
    ];
    if model.list.searching {
        spans.push(Span::styled("█", Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}

fn in_flight(model: &Model) -> Option<&'static str> {
    if model.marking_as_read {
        Some("Marking as read.")
    } else if model.unsubscribing {
        Some("Unsubscribing.")
    } else if model.unwatching {
        Some("Unwatching.")
    } else {
        None
    }
}

fn item(notification: &Notification, selected: bool, now: DateTime<Utc>) -> [Line<'static>; 4] {
    let (marker, title_style) = if selected {
        (
            Span::styled("▌ ", Style::default().fg(Color::Yellow)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (Span::raw("  "), Style::default())
    };

    [
        Line::from(vec![
            marker.clone(),
            Span::styled(
                notification.full_name().to_string(),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(vec![
            marker.clone(),
            Span::styled(notification.subject.title.clone(), title_style),
        ]),
        Line::from(vec![
            marker,
            Span::styled(
                format!(
                    "Updated {} ({})",
                    format_age(notification.updated_at, now),
                    notification.reason
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::default(),
    ]
}

/// The list page as lines: a sticky header of `model.list_sticky()` lines,
/// then four lines per visible notification and a trailing blank.
pub fn document(model: &Model) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default()];
    if model.search_visible() {
        lines.push(search_line(model));
        lines.push(Line::default());
    }

    let visible = model.visible();
    if visible.is_empty() && !model.loading {
        lines.push(Line::from(Span::styled(
            "  No notifications.",
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    let now = Utc::now();
    for (i, notification) in visible.iter().enumerate() {
        let selected = i == model.list.selected;
        match in_flight(model) {
            Some(note) if selected => {
                lines.push(Line::from(Span::styled(
                    format!("▌ {}", note),
                    Style::default().fg(Color::Yellow),
                )));
                lines.extend([Line::default(), Line::default(), Line::default()]);
            }
            _ => lines.extend(item(notification, selected, now)),
        }
    }
    lines.push(Line::default());

    lines
}

pub fn render(frame: &mut Frame, model: &Model, area: Rect) {
    let lines = document(model);
    let visible = viewport(
        &lines,
        model.list.scroll,
        area.height as usize,
        model.list_sticky(),
    );
    frame.render_widget(Paragraph::new(visible), area);
}
