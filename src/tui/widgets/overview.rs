//! Overview layout widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::tabs::{Tab, TabBar};
use super::{centered_content, render_keybindings, render_separator, truncate_label};
use crate::tui::theme::{trend, Theme};
use crate::types::{Kpis, MonthFilter, TopProviders};

/// Format a number with thousand separators (e.g., 1234567 -> "1,234,567")
/// Digits are ASCII, so byte iteration is safe
pub fn format_number(n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    for (i, ch) in s.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}

/// Format a dollar amount with cents (e.g., 1234.5 -> "$1,234.50")
pub fn format_cost(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, format_number(cents / 100), cents % 100)
}

/// Format a growth percentage with explicit sign (e.g., "+12.5%")
pub fn format_growth(pct: f64) -> String {
    if pct > 0.0 {
        format!("+{:.1}%", pct)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Proportional bar: `value / max` of `width` cells.
/// Non-zero values always get at least one filled cell.
pub fn format_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * width as f64).round() as usize;
    let filled = if value > 0.0 { filled.max(1) } else { filled };
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Data for the overview display (references to avoid cloning)
#[derive(Debug)]
pub struct OverviewData<'a> {
    pub kpis: &'a Kpis,
    pub monthly_trend: &'a [(String, f64)],
    pub top_providers: &'a TopProviders,
    pub filter: &'a MonthFilter,
}

/// Bar row layout
const LABEL_WIDTH: usize = 14;
const BAR_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 14;
const BAR_LINE_WIDTH: usize = 2 + LABEL_WIDTH + 2 + BAR_WIDTH + 2 + VALUE_WIDTH;

/// Overview widget: KPI cards, monthly evolution and top providers
pub struct Overview<'a> {
    data: OverviewData<'a>,
    selected_tab: Tab,
    theme: Theme,
}

impl<'a> Overview<'a> {
    pub fn new(data: OverviewData<'a>, theme: Theme) -> Self {
        Self {
            data,
            selected_tab: Tab::Overview,
            theme,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.selected_tab = tab;
        self
    }
}

impl Widget for Overview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let centered_area = centered_content(area);

        let month_rows = self.data.monthly_trend.len() as u16;
        let top_rows = self.data.top_providers.providers.len() as u16;

        let chunks = Layout::vertical([
            Constraint::Length(1),          // 0: TabBar
            Constraint::Length(1),          // 1: Separator
            Constraint::Length(3),          // 2: Hero stat
            Constraint::Length(1),          // 3: KPI cards
            Constraint::Length(1),          // 4: Blank
            Constraint::Length(1),          // 5: Monthly label
            Constraint::Length(month_rows), // 6: Monthly bars
            Constraint::Length(1),          // 7: Blank
            Constraint::Length(1),          // 8: Top providers label
            Constraint::Length(top_rows),   // 9: Top provider bars
            Constraint::Fill(1),            // 10: Spacer
            Constraint::Length(1),          // 11: Separator
            Constraint::Length(1),          // 12: Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.selected_tab, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);

        self.render_hero_stat(chunks[2], buf);
        self.render_kpi_cards(chunks[3], buf);

        self.render_label(chunks[5], buf, "Monthly evolution:");
        self.render_monthly_bars(chunks[6], buf);

        let top_label = format!(
            "Top {} providers ({}):",
            self.data.top_providers.providers.len(),
            format_cost(self.data.top_providers.total)
        );
        self.render_label(chunks[8], buf, &top_label);
        self.render_top_providers(chunks[9], buf);

        render_separator(chunks[11], buf, self.theme);
        render_keybindings(
            chunks[12],
            buf,
            self.theme,
            &[
                ("Tab", "Switch view"),
                ("f/F", "Month"),
                ("a", "Insights"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
        );
    }
}

impl Overview<'_> {
    fn render_hero_stat(&self, area: Rect, buf: &mut Buffer) {
        let formatted = format_cost(self.data.kpis.total_cost);

        let hero = Paragraph::new(vec![
            Line::from(Span::styled(
                formatted,
                Style::default()
                    .fg(self.theme.stat_warm())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("total spend · {}", self.data.filter.label()),
                Style::default().fg(self.theme.muted()),
            )),
        ])
        .alignment(Alignment::Center);

        hero.render(area, buf);
    }

    fn render_kpi_cards(&self, area: Rect, buf: &mut Buffer) {
        let kpis = self.data.kpis;
        let period = match (&kpis.first_month, &kpis.last_month) {
            (Some(first), Some(last)) if first != last => format!("{} – {}", first, last),
            (Some(first), _) => first.clone(),
            _ => "-".to_string(),
        };

        let muted = Style::default().fg(self.theme.muted());
        let stats = Paragraph::new(Line::from(vec![
            Span::styled("Avg/month: ", muted),
            Span::styled(
                format_cost(kpis.avg_monthly_cost),
                Style::default().fg(self.theme.stat_blue()),
            ),
            Span::raw("   "),
            Span::styled("Growth: ", muted),
            Span::styled(
                format_growth(kpis.growth_pct),
                Style::default().fg(self.theme.trend_color(trend(kpis.growth_pct))),
            ),
            Span::raw("   "),
            Span::styled("Providers: ", muted),
            Span::styled(
                kpis.provider_count.to_string(),
                Style::default().fg(self.theme.accent()),
            ),
            Span::raw("   "),
            Span::styled("Period: ", muted),
            Span::styled(period, Style::default().fg(self.theme.month())),
        ]))
        .alignment(Alignment::Center);

        stats.render(area, buf);
    }

    fn render_label(&self, area: Rect, buf: &mut Buffer, text: &str) {
        let label = Paragraph::new(Line::from(Span::styled(
            text.to_string(),
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);

        label.render(area, buf);
    }

    /// One bar per month; the filtered month is marked
    fn render_monthly_bars(&self, area: Rect, buf: &mut Buffer) {
        let max = self
            .data
            .monthly_trend
            .iter()
            .map(|(_, total)| *total)
            .fold(0.0, f64::max);

        let rows = self.data.monthly_trend.iter().map(|(month, total)| {
            let selected = self.data.filter.matches(month)
                && matches!(self.data.filter, MonthFilter::Month(_));
            (month.as_str(), *total, selected)
        });
        self.render_bar_rows(area, buf, rows, max, self.theme.month());
    }

    fn render_top_providers(&self, area: Rect, buf: &mut Buffer) {
        let providers = &self.data.top_providers.providers;
        let max = providers.iter().map(|p| p.total).fold(0.0, f64::max);

        let rows = providers
            .iter()
            .map(|p| (p.provider.as_str(), p.total, false));
        self.render_bar_rows(area, buf, rows, max, self.theme.text());
    }

    fn render_bar_rows<'r>(
        &self,
        area: Rect,
        buf: &mut Buffer,
        rows: impl Iterator<Item = (&'r str, f64, bool)>,
        max: f64,
        label_color: ratatui::style::Color,
    ) {
        let x_offset = area.width.saturating_sub(BAR_LINE_WIDTH as u16) / 2;

        for (i, (label, value, selected)) in rows.enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }

            let marker = if selected { "▸ " } else { "  " };
            let name = format!(
                "{:>width$}",
                truncate_label(label, LABEL_WIDTH),
                width = LABEL_WIDTH
            );
            let name_style = if selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(label_color)
            };

            let spans = vec![
                Span::styled(marker, Style::default().fg(self.theme.accent())),
                Span::styled(name, name_style),
                Span::raw("  "),
                Span::styled(
                    format_bar(value, max, BAR_WIDTH),
                    Style::default().fg(self.theme.bar()),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:>width$}", format_cost(value), width = VALUE_WIDTH),
                    Style::default().fg(self.theme.cost()),
                ),
            ];

            let line = Line::from(spans);
            buf.set_line(area.x + x_offset, y, &line, area.width - x_offset);
        }
    }
}
