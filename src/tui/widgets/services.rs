//! Services view widget - per-provider service distribution

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::overview::format_cost;
use super::tabs::{Tab, TabBar};
use super::{centered_content, render_keybindings, render_separator, truncate_label};
use crate::tui::theme::Theme;
use crate::types::{MonthFilter, ProviderServices};

/// Format a percentage bar with filled/empty blocks
/// Example: 50.0% with width 10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Share of `part` in `total` as a percentage (0 when total is 0)
pub fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

const SERVICE_WIDTH: usize = 24;
const COST_WIDTH: usize = 14;
const BAR_WIDTH: usize = 20;
const PCT_WIDTH: usize = 7;
const ROW_WIDTH: usize = SERVICE_WIDTH + COST_WIDTH + 2 + BAR_WIDTH + PCT_WIDTH;

/// Data for the services view
#[derive(Debug)]
pub struct ServicesData<'a> {
    pub breakdowns: &'a [ProviderServices],
    pub selected: usize,
    pub filter: &'a MonthFilter,
}

/// Services view widget
pub struct ServicesView<'a> {
    data: ServicesData<'a>,
    scroll_offset: usize,
    selected_tab: Tab,
    theme: Theme,
}

impl<'a> ServicesView<'a> {
    pub fn new(data: ServicesData<'a>, scroll_offset: usize, theme: Theme) -> Self {
        Self {
            data,
            scroll_offset,
            selected_tab: Tab::Services,
            theme,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.selected_tab = tab;
        self
    }

    /// Maximum scroll offset for the service rows
    pub fn max_scroll_offset(service_count: usize, visible_rows: usize) -> usize {
        service_count.saturating_sub(visible_rows)
    }
}

impl Widget for ServicesView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let centered_area = centered_content(area);

        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: TabBar
            Constraint::Length(1), // 1: Separator
            Constraint::Length(1), // 2: Provider selector
            Constraint::Length(1), // 3: Provider total
            Constraint::Length(1), // 4: Blank
            Constraint::Fill(1),   // 5: Services
            Constraint::Length(1), // 6: Separator
            Constraint::Length(1), // 7: Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.selected_tab, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);

        match self.data.breakdowns.get(self.data.selected) {
            Some(breakdown) => {
                self.render_selector(chunks[2], buf, breakdown);
                self.render_total(chunks[3], buf, breakdown);
                self.render_services(chunks[5], buf, breakdown);
            }
            None => {
                let message = format!("No service costs for {}", self.data.filter.label());
                Paragraph::new(Line::from(Span::styled(
                    message,
                    Style::default().fg(self.theme.muted()),
                )))
                .alignment(Alignment::Center)
                .render(chunks[5], buf);
            }
        }

        render_separator(chunks[6], buf, self.theme);
        render_keybindings(
            chunks[7],
            buf,
            self.theme,
            &[
                ("←→", "Provider"),
                ("↑↓", "Scroll"),
                ("f/F", "Month"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
        );
    }
}

impl ServicesView<'_> {
    fn render_selector(&self, area: Rect, buf: &mut Buffer, breakdown: &ProviderServices) {
        let count = self.data.breakdowns.len();
        let line = Line::from(vec![
            Span::styled("◀ ", Style::default().fg(self.theme.accent())),
            Span::styled(
                breakdown.provider.clone(),
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({}/{})", self.data.selected + 1, count),
                Style::default().fg(self.theme.muted()),
            ),
            Span::styled(" ▶", Style::default().fg(self.theme.accent())),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_total(&self, area: Rect, buf: &mut Buffer, breakdown: &ProviderServices) {
        let line = Line::from(vec![
            Span::styled(
                format_cost(breakdown.total),
                Style::default()
                    .fg(self.theme.cost())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {}", self.data.filter.label()),
                Style::default().fg(self.theme.muted()),
            ),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_services(&self, area: Rect, buf: &mut Buffer, breakdown: &ProviderServices) {
        let x_offset = area.width.saturating_sub(ROW_WIDTH as u16) / 2;

        for (i, service) in breakdown
            .services
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let pct = share(service.cost, breakdown.total);
            let spans = vec![
                Span::styled(
                    format!(
                        "{:<width$}",
                        truncate_label(&service.service, SERVICE_WIDTH - 1),
                        width = SERVICE_WIDTH
                    ),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>width$}", format_cost(service.cost), width = COST_WIDTH),
                    Style::default().fg(self.theme.cost()),
                ),
                Span::raw("  "),
                Span::styled(
                    format_percentage_bar(pct, BAR_WIDTH),
                    Style::default().fg(self.theme.bar()),
                ),
                Span::styled(
                    format!("{:>width$.1}%", pct, width = PCT_WIDTH - 1),
                    Style::default().fg(self.theme.muted()),
                ),
            ];

            buf.set_line(
                area.x + x_offset,
                area.y + i as u16,
                &Line::from(spans),
                area.width - x_offset,
            );
        }
    }
}
