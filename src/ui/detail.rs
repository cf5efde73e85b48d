use chrono::Utc;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::Model;
use crate::config::ThemeConfig;
use crate::markdown;
use crate::viewport::viewport;

use super::{format_age, hr, label_chip};

const INDENT: &str = "    ";

/// Rendered lines of the detail page plus how many of them form the fixed header.
pub struct Document {
    pub lines: Vec<Line<'static>>,
    pub sticky: usize,
}

fn status(text: &str) -> Document {
    Document {
        lines: vec![
            Line::default(),
            Line::from(Span::styled(
                format!("{}{}", INDENT, text),
                Style::default().fg(Color::Yellow),
            )),
        ],
        sticky: 0,
    }
}

fn indented(lines: Vec<Line<'static>>) -> impl Iterator<Item = Line<'static>> {
    lines.into_iter().map(|line| {
        let mut spans = vec![Span::raw(INDENT)];
        spans.extend(line.spans);
        Line::from(spans)
    })
}

/// Build the whole detail page. The reducer uses its length to clamp scrolling.
pub fn document(model: &Model, theme: &ThemeConfig) -> Document {
    let detail = &model.detail;

    if model.marking_as_read {
        return status("Marking as read.");
    }
    if model.unsubscribing {
        return status("Unsubscribing.");
    }
    let (Some(notification), Some(issue)) = (&detail.notification, &detail.issue) else {
        return status("Loading...");
    };

    let now = Utc::now();
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            notification.full_name().to_string(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(vec![
            Span::styled(
                issue.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" #{}", issue.number),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "Opened {} by @{}",
                format_age(issue.created_at, now),
                issue.user.login
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    let chips: Vec<Span> = if detail.loading_labels {
        vec![Span::styled("Loading labels...", Style::default().fg(Color::DarkGray))]
    } else {
        detail
            .labels
            .iter()
            .flat_map(|l| [label_chip(&l.name, &l.color), Span::raw(" ")])
            .collect()
    };
    lines.push(Line::from(chips));
    lines.push(Line::default());
    lines.push(hr(model.width));
    lines.push(Line::default());
    let sticky = lines.len();

    let body = issue.body.as_deref().unwrap_or("").trim();
    if body.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{}No description provided.", INDENT),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(indented(markdown::render(body, theme)));
    }

    if detail.loading_comments {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("{}Loading comments...", INDENT),
            Style::default().fg(Color::DarkGray),
        )));
    }

    for comment in &detail.comments {
        lines.push(Line::default());
        lines.push(hr(model.width));
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(
                format!("@{}", comment.user.login),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" commented {}", format_age(comment.created_at, now)),
                Style::default().fg(Color::Gray),
            ),
        ]));
        lines.push(Line::default());
        lines.extend(indented(markdown::render(
            comment.body.as_deref().unwrap_or(""),
            theme,
        )));
    }
    lines.push(Line::default());

    Document { lines, sticky }
}

pub fn render(frame: &mut Frame, model: &Model, theme: &ThemeConfig, area: Rect) {
    let doc = document(model, theme);
    let visible = viewport(&doc.lines, model.detail.scroll, area.height as usize, doc.sticky);
    frame.render_widget(Paragraph::new(visible), area);
}
