//! Built-in data sources
//!
//! Each source only knows how to fetch its lines; [`Panel`] wraps a source
//! with the common widget settings (name, placement, interval) and implements
//! the [`Widget`] contract on top of it.
//!
//! - `clocks` - current time at fixed UTC offsets
//! - `cmdrunner` - output of a local command
//! - `textfile` - contents of a file, scrollable while focused
//! - `status` - heartbeat showing the refresh cycle is alive

mod clocks;
mod cmdrunner;
mod status;
mod textfile;

use anyhow::Result;
use crossterm::event::KeyEvent;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{WidgetConfig, WidgetKind};
use crate::widget::{Geometry, Surface, Widget, WidgetHandle, WidgetSet};

pub use clocks::Clocks;
pub use cmdrunner::CmdRunner;
pub use status::Status;
pub use textfile::TextFile;

/// Something that produces panel content
pub trait Source: Send + Sync {
    /// Fetch the current content. May block.
    fn fetch(&self) -> Result<Vec<String>>;

    /// Handle a key while focused, redrawing into `surface` if needed
    fn handle_key(&self, _key: KeyEvent, _surface: &Surface) -> bool {
        false
    }
}

/// A configured widget backed by a [`Source`]
pub struct Panel<S> {
    name: String,
    enabled: bool,
    geometry: Geometry,
    interval: Duration,
    surface: Surface,
    source: S,
}

impl<S: Source> Panel<S> {
    pub fn new(config: &WidgetConfig, source: S) -> Self {
        let name = config.display_name();
        Self {
            surface: Surface::new(name.clone()),
            name,
            enabled: config.enabled,
            geometry: config.position,
            interval: config.interval(),
            source,
        }
    }
}

impl<S: Source> Widget for Panel<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn refresh_interval(&self) -> Duration {
        self.interval
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn refresh(&self) {
        let result = self.source.fetch();
        if let Err(ref e) = result {
            tracing::debug!("Widget {} fetch failed: {:#}", self.name, e);
        }
        self.surface.apply(result);
    }

    fn handle_key(&self, key: KeyEvent) -> bool {
        self.source.handle_key(key, &self.surface)
    }
}

/// Construct one widget per config entry, in config order
pub fn build_all(configs: &[WidgetConfig]) -> WidgetSet {
    WidgetSet::new(configs.iter().map(build).collect())
}

fn build(config: &WidgetConfig) -> WidgetHandle {
    match &config.kind {
        WidgetKind::Clocks { zones } => Arc::new(Panel::new(config, Clocks::new(zones.clone()))),
        WidgetKind::CmdRunner { cmd, args } => {
            Arc::new(Panel::new(config, CmdRunner::new(cmd.clone(), args.clone())))
        }
        WidgetKind::TextFile { path } => Arc::new(Panel::new(config, TextFile::new(path.clone()))),
        WidgetKind::Status => Arc::new(Panel::new(config, Status::new())),
    }
}
