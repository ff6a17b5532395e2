//! Insights view widget - AI-generated cost summary

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use super::spinner::spinner_char;
use super::tabs::{Tab, TabBar};
use super::{centered_content, render_keybindings, render_separator};
use crate::tui::theme::Theme;

/// Width of the insights text column
const TEXT_WIDTH: u16 = 100;

/// Lifecycle of an insights request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsightsState {
    /// Not requested yet
    #[default]
    Idle,
    /// Request running on a background thread
    Loading { spinner_frame: usize, scope: String },
    /// Summary text for the given month scope
    Ready { text: String, scope: String },
    Failed { message: String },
}

impl InsightsState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Style markdown-ish summary lines: headings bold, bullets indented
fn styled_lines(text: &str, theme: Theme) -> Vec<Line<'static>> {
    text.lines()
        .map(|raw| {
            let trimmed = raw.trim();
            let heading = trimmed.trim_start_matches('#').trim().trim_matches('*');
            if trimmed.starts_with('#')
                || (trimmed.starts_with("**") && trimmed.ends_with("**") && trimmed.len() > 4)
            {
                Line::from(Span::styled(
                    heading.to_string(),
                    Style::default()
                        .fg(theme.month())
                        .add_modifier(Modifier::BOLD),
                ))
            } else if let Some(item) = trimmed
                .strip_prefix("* ")
                .or_else(|| trimmed.strip_prefix("- "))
            {
                Line::from(vec![
                    Span::styled("  • ", Style::default().fg(theme.accent())),
                    Span::styled(item.replace("**", ""), Style::default().fg(theme.text())),
                ])
            } else {
                Line::from(Span::styled(
                    trimmed.replace("**", ""),
                    Style::default().fg(theme.text()),
                ))
            }
        })
        .collect()
}

/// Insights view widget
pub struct InsightsView<'a> {
    state: &'a InsightsState,
    scroll_offset: u16,
    selected_tab: Tab,
    theme: Theme,
}

impl<'a> InsightsView<'a> {
    pub fn new(state: &'a InsightsState, scroll_offset: u16, theme: Theme) -> Self {
        Self {
            state,
            scroll_offset,
            selected_tab: Tab::Insights,
            theme,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.selected_tab = tab;
        self
    }

    fn render_message(&self, area: Rect, buf: &mut Buffer, text: String, style: Style) {
        let y = area.y + area.height / 2;
        Paragraph::new(Line::from(Span::styled(text, style)))
            .alignment(Alignment::Center)
            .render(Rect { y, height: 1, ..area }, buf);
    }
}

impl Widget for InsightsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let centered_area = centered_content(area);

        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: TabBar
            Constraint::Length(1), // 1: Separator
            Constraint::Length(1), // 2: Title
            Constraint::Length(1), // 3: Blank
            Constraint::Fill(1),   // 4: Body
            Constraint::Length(1), // 5: Separator
            Constraint::Length(1), // 6: Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.selected_tab, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);

        let title = match self.state {
            InsightsState::Ready { scope, .. } | InsightsState::Loading { scope, .. } => {
                format!("AI insights · {}", scope)
            }
            _ => "AI insights".to_string(),
        };
        Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        let body = chunks[4];
        match self.state {
            InsightsState::Idle => self.render_message(
                body,
                buf,
                "Press a to generate insights from the current data".to_string(),
                Style::default().fg(self.theme.muted()),
            ),
            InsightsState::Loading { spinner_frame, .. } => self.render_message(
                body,
                buf,
                format!("{} Analyzing costs...", spinner_char(*spinner_frame)),
                Style::default().fg(self.theme.accent()),
            ),
            InsightsState::Failed { message } => self.render_message(
                body,
                buf,
                format!("Insights failed: {}", message),
                Style::default().fg(self.theme.error()),
            ),
            InsightsState::Ready { text, .. } => {
                let width = body.width.min(TEXT_WIDTH);
                let text_area = Rect {
                    x: body.x + (body.width - width) / 2,
                    width,
                    ..body
                };
                Paragraph::new(styled_lines(text, self.theme))
                    .wrap(Wrap { trim: false })
                    .scroll((self.scroll_offset, 0))
                    .render(text_area, buf);
            }
        }

        render_separator(chunks[5], buf, self.theme);
        render_keybindings(
            chunks[6],
            buf,
            self.theme,
            &[
                ("a", "Generate"),
                ("↑↓", "Scroll"),
                ("f/F", "Month"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
        );
    }
}
