use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::config::ThemeConfig;
use crate::ui::hex_color;

#[derive(Debug, Clone)]
struct StyleStack {
    styles: Vec<Style>,
}

impl StyleStack {
    fn new() -> Self {
        Self {
            styles: vec![Style::default()],
        }
    }

    fn current(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push(&mut self, modifier: impl Fn(Style) -> Style) {
        let next = modifier(self.current());
        self.styles.push(next);
    }

    fn pop(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }
}

struct Palette {
    code: Color,
    heading: Color,
    link: Color,
    quote: Color,
}

impl Palette {
    fn from_theme(theme: &ThemeConfig) -> Self {
        Self {
            code: hex_color(&theme.code).unwrap_or(Color::DarkGray),
            heading: hex_color(&theme.heading).unwrap_or(Color::Yellow),
            link: hex_color(&theme.link).unwrap_or(Color::Blue),
            quote: hex_color(&theme.quote).unwrap_or(Color::Gray),
        }
    }
}

fn flush(lines: &mut Vec<Line<'static>>, current: &mut Vec<Span<'static>>) {
    if !current.is_empty() {
        lines.push(Line::from(std::mem::take(current)));
    }
}

/// Render an issue or comment body to styled lines.
///
/// Lines are never wrapped; each soft break starts a new line so the result
/// maps one-to-one onto terminal rows.
pub fn render(text: &str, theme: &ThemeConfig) -> Vec<Line<'static>> {
    let palette = Palette::from_theme(theme);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut styles = StyleStack::new();
    let mut in_code_block = false;
    let mut list_level: usize = 0;

    for event in Parser::new(text) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { .. } => {
                    styles.push(|s| s.fg(palette.heading).add_modifier(Modifier::BOLD));
                }
                Tag::BlockQuote(_) => {
                    styles.push(|s| s.fg(palette.quote).add_modifier(Modifier::ITALIC));
                    current.push(Span::styled("│ ", Style::default().fg(palette.quote)));
                }
                Tag::CodeBlock(_) => {
                    in_code_block = true;
                }
                Tag::List(_) => {
                    flush(&mut lines, &mut current);
                    list_level += 1;
                }
                Tag::Item => {
                    let indent = "  ".repeat(list_level.saturating_sub(1));
                    current.push(Span::raw(format!("{}• ", indent)));
                }
                Tag::Emphasis => styles.push(|s| s.add_modifier(Modifier::ITALIC)),
                Tag::Strong => styles.push(|s| s.add_modifier(Modifier::BOLD)),
                Tag::Strikethrough => styles.push(|s| s.add_modifier(Modifier::CROSSED_OUT)),
                Tag::Link { .. } => {
                    styles.push(|s| s.fg(palette.link).add_modifier(Modifier::UNDERLINED));
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Paragraph => {
                    flush(&mut lines, &mut current);
                    if list_level == 0 {
                        lines.push(Line::default());
                    }
                }
                TagEnd::Heading(_) => {
                    flush(&mut lines, &mut current);
                    lines.push(Line::default());
                    styles.pop();
                }
                TagEnd::BlockQuote(_) => {
                    flush(&mut lines, &mut current);
                    styles.pop();
                }
                TagEnd::CodeBlock => {
                    in_code_block = false;
                    lines.push(Line::default());
                }
                TagEnd::List(_) => {
                    list_level = list_level.saturating_sub(1);
                    flush(&mut lines, &mut current);
                    if list_level == 0 {
                        lines.push(Line::default());
                    }
                }
                TagEnd::Item => flush(&mut lines, &mut current),
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                    styles.pop();
                }
                _ => {}
            },
            Event::Text(text) if in_code_block => {
                // a fenced block arrives as a single event
                for line in text.lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(palette.code),
                    )));
                }
            }
            Event::Text(text) => {
                current.push(Span::styled(text.to_string(), styles.current()));
            }
            Event::Code(code) => {
                current.push(Span::styled(code.to_string(), Style::default().fg(palette.code)));
            }
            Event::SoftBreak | Event::HardBreak => flush(&mut lines, &mut current),
            Event::Rule => {
                lines.push(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::default());
            }
            _ => {}
        }
    }

    flush(&mut lines, &mut current);

    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }

    lines
}
