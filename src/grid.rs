//! Grid layout for the board
//!
//! Builds the placement table for a widget set and resolves it onto a
//! terminal area. Track sizes use the usual terminal-grid convention:
//!
//! ```text
//!   n > 0   fixed size, n cells
//!   n = 0   one proportional share of the remaining space
//!   n < 0   |n| proportional shares
//! ```
//!
//! Overlapping placements are not detected; keeping regions disjoint is up to
//! the configuration.

use ratatui::layout::{Constraint, Layout, Rect};

use crate::widget::{Geometry, Surface, WidgetSet};

/// One enabled widget mapped onto the grid
#[derive(Debug, Clone)]
pub struct Placement {
    pub name: String,
    pub region: Geometry,
    pub surface: Surface,
}

/// Row/column tracks plus the placements of every enabled widget, in order.
///
/// A `Grid` is never modified after `build`; a reload builds a new one.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<i32>,
    columns: Vec<i32>,
    placements: Vec<Placement>,
}

impl Grid {
    /// Place every enabled widget at its declared region. Disabled widgets
    /// contribute nothing.
    pub fn build(widgets: &WidgetSet, rows: &[i32], columns: &[i32]) -> Self {
        let placements = widgets
            .enabled()
            .map(|w| Placement {
                name: w.name().to_string(),
                region: w.geometry(),
                surface: w.surface().clone(),
            })
            .collect();

        Self {
            rows: rows.to_vec(),
            columns: columns.to_vec(),
            placements,
        }
    }

    /// Placements in enabled-widget order (index matches focus index)
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn rows(&self) -> &[i32] {
        &self.rows
    }

    pub fn columns(&self) -> &[i32] {
        &self.columns
    }

    /// Screen rectangle for every placement, `None` where the region falls
    /// outside the tracks
    pub fn layout(&self, area: Rect) -> Vec<Option<Rect>> {
        let row_rects = Layout::vertical(track_constraints(&self.rows)).split(area);
        let col_rects = Layout::horizontal(track_constraints(&self.columns)).split(area);

        self.placements
            .iter()
            .map(|p| {
                if !p.region.fits(row_rects.len(), col_rects.len()) {
                    tracing::warn!("Widget {} is placed outside the grid, skipping", p.name);
                    return None;
                }
                let first_row = row_rects[p.region.top as usize];
                let last_row = row_rects[p.region.bottom() - 1];
                let first_col = col_rects[p.region.left as usize];
                let last_col = col_rects[p.region.right() - 1];

                Some(Rect {
                    x: first_col.x,
                    y: first_row.y,
                    width: last_col.right().saturating_sub(first_col.x),
                    height: last_row.bottom().saturating_sub(first_row.y),
                })
            })
            .collect()
    }
}

/// Convert configured track sizes to layout constraints
fn track_constraints(sizes: &[i32]) -> Vec<Constraint> {
    sizes
        .iter()
        .map(|&size| match size {
            n if n > 0 => Constraint::Length(n.min(u16::MAX as i32) as u16),
            0 => Constraint::Fill(1),
            n => Constraint::Fill(n.unsigned_abs().min(u16::MAX as u32) as u16),
        })
        .collect()
}
