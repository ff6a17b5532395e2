//! Breakdown table widget - provider × month costs

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::overview::format_cost;
use super::tabs::{Tab, TabBar};
use super::{centered_content, render_keybindings, render_separator, truncate_label};
use crate::tui::theme::Theme;
use crate::types::BreakdownRow;

const PROVIDER_WIDTH: usize = 16;
const CELL_WIDTH: usize = 13;

/// Data for the breakdown table
#[derive(Debug)]
pub struct TableData<'a> {
    pub months: &'a [String],
    pub rows: &'a [BreakdownRow],
}

/// Number of month columns that fit next to the provider and total columns
pub fn visible_month_columns(width: u16, month_count: usize) -> usize {
    let fixed = PROVIDER_WIDTH + CELL_WIDTH;
    let available = (width as usize).saturating_sub(fixed);
    (available / CELL_WIDTH).min(month_count)
}

/// Breakdown table widget
pub struct TableView<'a> {
    data: TableData<'a>,
    scroll_offset: usize,
    selected_tab: Tab,
    theme: Theme,
}

impl<'a> TableView<'a> {
    pub fn new(data: TableData<'a>, scroll_offset: usize, theme: Theme) -> Self {
        Self {
            data,
            scroll_offset,
            selected_tab: Tab::Table,
            theme,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.selected_tab = tab;
        self
    }

    /// Maximum scroll offset for the provider rows
    pub fn max_scroll_offset(row_count: usize, visible_rows: usize) -> usize {
        row_count.saturating_sub(visible_rows)
    }
}

impl Widget for TableView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let centered_area = centered_content(area);

        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: TabBar
            Constraint::Length(1), // 1: Separator
            Constraint::Length(1), // 2: Header
            Constraint::Length(1), // 3: Header rule
            Constraint::Fill(1),   // 4: Rows
            Constraint::Length(1), // 5: Footer rule
            Constraint::Length(1), // 6: Column totals
            Constraint::Length(1), // 7: Separator
            Constraint::Length(1), // 8: Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.selected_tab, self.theme).render(chunks[0], buf);
        render_separator(chunks[1], buf, self.theme);

        // Show the most recent months when columns don't fit
        let columns = visible_month_columns(centered_area.width, self.data.months.len());
        let first_col = self.data.months.len() - columns;
        let table_width = (PROVIDER_WIDTH + CELL_WIDTH * (columns + 1)) as u16;
        let x = centered_area.x + centered_area.width.saturating_sub(table_width) / 2;

        self.render_header(Rect { x, width: table_width, ..chunks[2] }, buf, first_col);
        render_separator(Rect { x, width: table_width, ..chunks[3] }, buf, self.theme);
        self.render_rows(Rect { x, width: table_width, ..chunks[4] }, buf, first_col);
        render_separator(Rect { x, width: table_width, ..chunks[5] }, buf, self.theme);
        self.render_column_totals(Rect { x, width: table_width, ..chunks[6] }, buf, first_col);

        render_separator(chunks[7], buf, self.theme);
        render_keybindings(
            chunks[8],
            buf,
            self.theme,
            &[
                ("Tab", "Switch view"),
                ("↑↓", "Scroll"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
        );
    }
}

impl TableView<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer, first_col: usize) {
        let bold = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);

        let mut spans = vec![Span::styled(
            format!("{:<width$}", "Provider", width = PROVIDER_WIDTH),
            bold(self.theme.text()),
        )];
        for month in &self.data.months[first_col..] {
            spans.push(Span::styled(
                format!("{:>width$}", truncate_label(month, CELL_WIDTH - 1), width = CELL_WIDTH),
                bold(self.theme.month()),
            ));
        }
        spans.push(Span::styled(
            format!("{:>width$}", "Total", width = CELL_WIDTH),
            bold(self.theme.text()),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer, first_col: usize) {
        for (i, row) in self
            .data
            .rows
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let mut spans = vec![Span::styled(
                format!(
                    "{:<width$}",
                    truncate_label(&row.provider, PROVIDER_WIDTH - 1),
                    width = PROVIDER_WIDTH
                ),
                Style::default().fg(self.theme.text()),
            )];
            for cost in &row.months[first_col.min(row.months.len())..] {
                let style = if *cost == 0.0 {
                    Style::default().fg(self.theme.muted())
                } else {
                    Style::default().fg(self.theme.text())
                };
                spans.push(Span::styled(
                    format!("{:>width$}", format_cost(*cost), width = CELL_WIDTH),
                    style,
                ));
            }
            spans.push(Span::styled(
                format!("{:>width$}", format_cost(row.total), width = CELL_WIDTH),
                Style::default()
                    .fg(self.theme.cost())
                    .add_modifier(Modifier::BOLD),
            ));

            buf.set_line(area.x, area.y + i as u16, &Line::from(spans), area.width);
        }
    }

    fn render_column_totals(&self, area: Rect, buf: &mut Buffer, first_col: usize) {
        let column_total =
            |i: usize| -> f64 { self.data.rows.iter().filter_map(|r| r.months.get(i)).sum() };
        let grand_total: f64 = self.data.rows.iter().map(|r| r.total).sum();

        let mut spans = vec![Span::styled(
            format!("{:<width$}", "Total", width = PROVIDER_WIDTH),
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        )];
        for i in first_col..self.data.months.len() {
            spans.push(Span::styled(
                format!("{:>width$}", format_cost(column_total(i)), width = CELL_WIDTH),
                Style::default().fg(self.theme.cost()),
            ));
        }
        spans.push(Span::styled(
            format!("{:>width$}", format_cost(grand_total), width = CELL_WIDTH),
            Style::default()
                .fg(self.theme.stat_warm())
                .add_modifier(Modifier::BOLD),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
