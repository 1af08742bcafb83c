use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use std::time::Instant;

use super::panel::PanelView;
use super::theme::Theme;
use crate::app::App;

const KEY_HINTS: &str = " Tab/S-Tab: focus | Esc: unfocus | ^R: refresh | q: quit";

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let snapshot = app.snapshot();
    let theme = snapshot.config.resolve_theme();

    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    let [board, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    let now = Instant::now();
    let rects = snapshot.grid.layout(board);
    for (index, (placement, rect)) in snapshot.grid.placements().iter().zip(rects).enumerate() {
        let Some(rect) = rect else {
            continue;
        };
        let state = placement.surface.snapshot();
        let view = PanelView::new(&state, &theme)
            .focused(app.is_focused(index))
            .now(now);
        f.render_widget(view, rect);
    }

    draw_status_bar(f, app, status, &theme);
}

/// Key hints on the left, reload state on the right
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let snapshot = app.snapshot();

    let right = match app.last_reload_error() {
        Some(error) => Span::styled(
            format!(" reload failed: {} ", error),
            Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(
            format!(
                " v{} | {} widgets | gen {}{} ",
                snapshot.version,
                snapshot.widgets.enabled_count(),
                app.generation().unwrap_or(0),
                if app.hot_reload_active() { "" } else { " | no hot reload" }
            ),
            Style::default().fg(theme.dimmed),
        ),
    };
    let right_width = right.width() as u16;

    let [hints, state] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(right_width)]).areas(area);

    f.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().fg(theme.dimmed).bg(theme.background)),
        hints,
    );
    f.render_widget(
        Paragraph::new(Line::from(right)).style(Style::default().bg(theme.background)),
        state,
    );
}
