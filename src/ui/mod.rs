//! UI module - handles all TUI rendering
//!
//! Structure:
//! - `draw.rs` - Board and status bar
//! - `theme.rs` - Color themes and presets
//! - `panel.rs` - Panel widget for one surface

mod draw;
pub mod panel;
pub mod theme;

pub use draw::draw;
pub use theme::Theme;
