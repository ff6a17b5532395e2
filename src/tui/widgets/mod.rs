//! TUI widgets

pub mod help;
pub mod insights;
pub mod overview;
pub mod providers;
pub mod services;
pub mod spinner;
pub mod table;
pub mod tabs;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Maximum content width (keeps layout clean on wide terminals)
pub const MAX_CONTENT_WIDTH: u16 = 170;

/// Apply the max width constraint and center the content
pub fn centered_content(area: Rect) -> Rect {
    let content_width = area.width.min(MAX_CONTENT_WIDTH);
    let x_offset = (area.width.saturating_sub(content_width)) / 2;
    Rect {
        x: area.x + x_offset,
        y: area.y,
        width: content_width,
        height: area.height,
    }
}

/// Full-width horizontal rule
pub fn render_separator(area: Rect, buf: &mut Buffer, theme: Theme) {
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(theme.muted()));
}

/// Centered `key: action` hints
pub fn render_keybindings(area: Rect, buf: &mut Buffer, theme: Theme, bindings: &[(&str, &str)]) {
    let mut spans = Vec::with_capacity(bindings.len() * 3);
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(key.to_string(), Style::default().fg(theme.accent())));
        spans.push(Span::styled(
            format!(": {}", action),
            Style::default().fg(theme.muted()),
        ));
    }

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// Truncate to `width` chars, marking the cut with an ellipsis
pub fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() > width {
        let kept: String = label.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", kept)
    } else {
        label.to_string()
    }
}
