//! Providers view widget - cost trend by provider per month

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
use crate::types::{CostTrendPoint, MonthFilter, ProviderTotal};

const MONTH_WIDTH: usize = 12;
const BAR_WIDTH: usize = 48;
const VALUE_WIDTH: usize = 14;
const ROW_WIDTH: usize = MONTH_WIDTH + 2 + BAR_WIDTH + 2 + VALUE_WIDTH;

/// Split a stacked bar of `width` cells between the given costs.
///
/// Boundaries are rounded on the running sum so segments always add up to
/// the bar length for the month total.
pub fn stacked_segments(costs: &[f64], max: f64, width: usize) -> Vec<usize> {
    if max <= 0.0 {
        return vec![0; costs.len()];
    }

    let mut segments = Vec::with_capacity(costs.len());
    let mut running = 0.0;
    let mut drawn = 0usize;
    for cost in costs {
        running += cost.max(0.0);
        let edge = ((running / max) * width as f64).round() as usize;
        let edge = edge.min(width);
        segments.push(edge.saturating_sub(drawn));
        drawn = drawn.max(edge);
    }
    segments
}

/// Data for the providers view
#[derive(Debug)]
pub struct ProvidersData<'a> {
    pub providers: &'a [String],
    pub cost_trend: &'a [CostTrendPoint],
    pub provider_totals: &'a [ProviderTotal],
    pub filter: &'a MonthFilter,
}

/// Providers view widget
pub struct ProvidersView<'a> {
    data: ProvidersData<'a>,
    scroll_offset: usize,
    selected_tab: Tab,
    theme: Theme,
}

impl<'a> ProvidersView<'a> {
    pub fn new(data: ProvidersData<'a>, scroll_offset: usize, theme: Theme) -> Self {
        Self {
            data,
            scroll_offset,
            selected_tab: Tab::Providers,
            theme,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.selected_tab = tab;
        self
    }

    /// Maximum scroll offset for the month rows
    pub fn max_scroll_offset(month_count: usize, visible_rows: usize) -> usize {
        month_count.saturating_sub(visible_rows)
    }

    fn provider_index(&self, provider: &str) -> usize {
        self.data
            .providers
            .iter()
            .position(|p| p == provider)
            .unwrap_or(0)
    }
}

impl Widget for ProvidersView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let centered_area = centered_content(area);
        let total_rows = self.data.provider_totals.len().min(8) as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),          // 0: TabBar
            Constraint::Length(1),          // 1: Separator
            Constraint::Length(1),          // 2: Title
            Constraint::Length(1),          // 3: Legend
            Constraint::Length(1),          // 4: Blank
            Constraint::Fill(1),            // 5: Month rows
            Constraint::Length(1),          // 6: Blank
            Constraint::Length(1),          // 7: Totals label
            Constraint::Length(total_rows), // 8: Totals
            Constraint::Length(1),          // 9: Separator
            Constraint::Length(1),          // 10: Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.selected_tab, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);

        Paragraph::new(Line::from(Span::styled(
            "Cost by provider per month",
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        self.render_legend(chunks[3], buf);
        self.render_months(chunks[5], buf);
        self.render_totals(chunks[7], chunks[8], buf);

        render_separator(chunks[9], buf, self.theme);
        render_keybindings(
            chunks[10],
            buf,
            self.theme,
            &[
                ("Tab", "Switch view"),
                ("↑↓", "Scroll"),
                ("f/F", "Month"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
        );
    }
}

impl ProvidersView<'_> {
    fn render_legend(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();
        for (i, provider) in self.data.providers.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled("■ ", Style::default().fg(self.theme.series(i))));
            spans.push(Span::styled(
                provider.clone(),
                Style::default().fg(self.theme.text()),
            ));
        }
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_months(&self, area: Rect, buf: &mut Buffer) {
        let month_total = |point: &CostTrendPoint| point.costs.iter().map(|(_, c)| c).sum::<f64>();
        let max = self
            .data
            .cost_trend
            .iter()
            .map(month_total)
            .fold(0.0, f64::max);

        let x_offset = area.width.saturating_sub(ROW_WIDTH as u16) / 2;

        for (row, point) in self
            .data
            .cost_trend
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + row as u16;
            let costs: Vec<f64> = point.costs.iter().map(|(_, c)| *c).collect();
            let segments = stacked_segments(&costs, max, BAR_WIDTH);

            let selected = matches!(self.data.filter, MonthFilter::Month(m) if *m == point.month);
            let month_style = if selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.month())
            };

            let mut spans = vec![
                Span::styled(
                    format!(
                        "{:>width$}",
                        truncate_label(&point.month, MONTH_WIDTH),
                        width = MONTH_WIDTH
                    ),
                    month_style,
                ),
                Span::raw("  "),
            ];

            let mut drawn = 0;
            for ((provider, _), cells) in point.costs.iter().zip(segments) {
                drawn += cells;
                spans.push(Span::styled(
                    "█".repeat(cells),
                    Style::default().fg(self.theme.series(self.provider_index(provider))),
                ));
            }
            spans.push(Span::styled(
                "░".repeat(BAR_WIDTH.saturating_sub(drawn)),
                Style::default().fg(self.theme.muted()),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!(
                    "{:>width$}",
                    format_cost(month_total(point)),
                    width = VALUE_WIDTH
                ),
                Style::default().fg(self.theme.cost()),
            ));

            buf.set_line(area.x + x_offset, y, &Line::from(spans), area.width - x_offset);
        }
    }

    fn render_totals(&self, label_area: Rect, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(Span::styled(
            format!("Totals · {}", self.data.filter.label()),
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(label_area, buf);

        for (i, total) in self
            .data
            .provider_totals
            .iter()
            .take(area.height as usize)
            .enumerate()
        {
            let color = self.theme.series(self.provider_index(&total.provider));
            let line = Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::styled(
                    format!("{:<16}", truncate_label(&total.provider, 16)),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>14}", format_cost(total.total)),
                    Style::default().fg(self.theme.cost()),
                ),
            ]);
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(
                    Rect {
                        y: area.y + i as u16,
                        height: 1,
                        ..area
                    },
                    buf,
                );
        }
    }
}
