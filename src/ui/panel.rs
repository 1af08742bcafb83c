//! Panel widget for the board
//!
//! Renders one widget's [`PanelState`] as a bordered box:
//! - Title, with a marker when the panel holds focus
//! - Error line (if the last refresh failed)
//! - Content lines, truncated to the panel width
//! - Age of the last update in the bottom border

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Widget},
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::widget::PanelState;

const FOCUS_MARKER: &str = "▶ ";

pub struct PanelView<'a> {
    state: &'a PanelState,
    theme: &'a Theme,
    focused: bool,
    now: Instant,
}

impl<'a> PanelView<'a> {
    pub fn new(state: &'a PanelState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            focused: false,
            now: Instant::now(),
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Reference time for the update age
    pub fn now(mut self, now: Instant) -> Self {
        self.now = now;
        self
    }
}

impl<'a> Widget for PanelView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let border_color = if self.focused {
            self.theme.accent
        } else {
            self.theme.border
        };
        let title_style = if self.focused {
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.title)
        };
        let title = if self.focused {
            format!(" {}{} ", FOCUS_MARKER, self.state.title)
        } else {
            format!(" {} ", self.state.title)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(self.theme.background))
            .title(Line::styled(title, title_style));
        if let Some(updated) = self.state.updated_at {
            let age = format_age(self.now.saturating_duration_since(updated));
            block = block.title_bottom(
                Line::styled(format!(" {} ", age), Style::default().fg(self.theme.dimmed))
                    .right_aligned(),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let max_y = inner.y + inner.height;
        let mut y = inner.y;

        if let Some(ref error) = self.state.error {
            let style = Style::default()
                .fg(self.theme.error)
                .bg(self.theme.background)
                .add_modifier(Modifier::BOLD);
            buf.set_string(inner.x, y, truncate(&format!("✗ {}", error), width), style);
            y += 1;
        }

        if self.state.updated_at.is_none() {
            let style = Style::default().fg(self.theme.dimmed).bg(self.theme.background);
            buf.set_string(inner.x, y, truncate("loading…", width), style);
            return;
        }

        let style = Style::default()
            .fg(self.theme.foreground)
            .bg(self.theme.background);
        for line in &self.state.lines {
            if y >= max_y {
                break;
            }
            buf.set_string(inner.x, y, truncate(line, width), style);
            y += 1;
        }
    }
}

/// Compact age: "3s", "2m", "1h"
fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        _ => format!("{}h", secs / 3600),
    }
}

/// Truncate string to fit within max_width, adding ellipsis if needed
fn truncate(s: &str, max_width: usize) -> String {
    let width = s.width();
    if width <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        let mut result = String::new();
        let mut current_width = 0;

        for c in s.chars() {
            let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width + 1 > max_width {
                result.push('…');
                break;
            }
            result.push(c);
            current_width += char_width;
        }

        result
    }
}
