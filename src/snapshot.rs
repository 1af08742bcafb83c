//! Versioned, atomically swappable view of the running board.
//!
//! A [`Snapshot`] bundles the config with the widget set and grid built from
//! it, so nobody can pair a widget set from one config with a grid from
//! another. [`SnapshotStore`] is the only place a snapshot is replaced; readers
//! take an `Arc` and keep a consistent view for as long as they hold it.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::Config;
use crate::grid::Grid;
use crate::widget::WidgetSet;
use crate::widgets;

/// Config plus everything derived from it
#[derive(Debug)]
pub struct Snapshot {
    /// Increases by one on every successful reload
    pub version: u64,
    pub config: Config,
    pub widgets: WidgetSet,
    pub grid: Grid,
}

impl Snapshot {
    /// Construct the widget set and lay it out
    pub fn build(config: Config, version: u64) -> Self {
        let widgets = widgets::build_all(&config.widgets);
        let grid = Grid::build(&widgets, &config.grid.rows, &config.grid.columns);
        if widgets.is_empty() {
            tracing::warn!("Config v{} defines no widgets", version);
        }
        tracing::debug!(
            "Built snapshot v{}: {} widgets, {} placed on a {}x{} grid",
            version,
            widgets.len(),
            grid.placements().len(),
            grid.rows().len(),
            grid.columns().len()
        );
        Self {
            version,
            config,
            widgets,
            grid,
        }
    }
}

/// Shared handle to the active snapshot. Clones share the same cell.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// The active snapshot
    pub fn load(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Install `next` as a single unit and return the one it replaced
    pub fn replace(&self, next: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(next);
        std::mem::replace(&mut *self.current.write(), next)
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(widgets: &str) -> Config {
        Config::parse(&format!(
            "[grid]\ncolumns = [0, 0]\nrows = [0]\n\n{}",
            widgets
        ))
        .unwrap()
    }

    #[test]
    fn test_build_places_enabled_only() {
        let snapshot = Snapshot::build(
            config(
                r#"
[[widget]]
type = "status"
name = "on"

[[widget]]
type = "status"
name = "off"
enabled = false
position = { top = 0, left = 1, height = 1, width = 1 }
"#,
            ),
            1,
        );
        assert_eq!(snapshot.widgets.len(), 2);
        let placed: Vec<_> = snapshot
            .grid
            .placements()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(placed, vec!["on"]);
    }

    #[test]
    fn test_replace_swaps_whole_snapshot() {
        let store = SnapshotStore::new(Snapshot::build(config(""), 1));
        let reader = store.clone();
        let before = reader.load();

        let old = store.replace(Snapshot::build(
            config("[[widget]]\ntype = \"status\"\n"),
            2,
        ));
        assert!(Arc::ptr_eq(&old, &before));

        let after = reader.load();
        assert_eq!(after.version, 2);
        assert_eq!(store.version(), 2);
        assert_eq!(after.widgets.len(), 1);
        assert_eq!(after.grid.placements().len(), 1);

        // A reader holding the old Arc keeps a consistent view
        assert_eq!(before.version, 1);
        assert!(before.widgets.is_empty());
        assert!(before.grid.placements().is_empty());
    }
}
