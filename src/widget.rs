//! Widget capability contract.
//!
//! Every panel on the board is a [`Widget`]. The scheduler, focus tracker and
//! grid builder only ever talk to this trait, so a new data source is just a
//! new implementation - the core never branches on widget type.
//!
//! # Rendered state
//!
//! A widget owns a [`Surface`]: a shared handle to its current [`PanelState`].
//! The widget writes it from `refresh()`, the grid hands clones of the handle
//! to the drawing code, and nobody else mutates it.

use crossterm::event::KeyEvent;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Grid-cell placement of a widget (row/column indices and spans)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub top: u16,
    pub left: u16,
    pub height: u16,
    pub width: u16,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            top: 0,
            left: 0,
            height: 1,
            width: 1,
        }
    }
}

impl Geometry {
    #[cfg(test)]
    pub fn new(top: u16, left: u16, height: u16, width: u16) -> Self {
        Self {
            top,
            left,
            height,
            width,
        }
    }

    /// One past the last row covered
    pub fn bottom(&self) -> usize {
        self.top as usize + self.height as usize
    }

    /// One past the last column covered
    pub fn right(&self) -> usize {
        self.left as usize + self.width as usize
    }

    /// Whether the region lies inside a grid of `rows` x `columns`
    pub fn fits(&self, rows: usize, columns: usize) -> bool {
        self.height > 0 && self.width > 0 && self.bottom() <= rows && self.right() <= columns
    }
}

/// Current rendered content of a panel
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub title: String,
    pub lines: Vec<String>,
    /// Set when the last refresh failed; `lines` keeps the last good content
    pub error: Option<String>,
    pub updated_at: Option<Instant>,
    pub refreshes: u64,
    /// The owning widget set was retired; further writes are dropped
    pub detached: bool,
}

/// Shared handle to a widget's rendered state.
///
/// Cloning is cheap and every clone points at the same state.
#[derive(Debug, Clone, Default)]
pub struct Surface(Arc<RwLock<PanelState>>);

impl Surface {
    pub fn new(title: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(PanelState {
            title: title.into(),
            ..Default::default()
        })))
    }

    /// Copy of the current state, for drawing
    pub fn snapshot(&self) -> PanelState {
        self.0.read().clone()
    }

    /// Replace the content and clear any previous error
    pub fn set_content(&self, lines: Vec<String>) {
        let mut state = self.0.write();
        if state.detached {
            return;
        }
        state.lines = lines;
        state.error = None;
        state.updated_at = Some(Instant::now());
        state.refreshes += 1;
    }

    /// Mark the panel as failed, keeping the stale content visible
    pub fn set_error(&self, error: impl Into<String>) {
        let mut state = self.0.write();
        if state.detached {
            return;
        }
        state.error = Some(error.into());
        state.updated_at = Some(Instant::now());
        state.refreshes += 1;
    }

    /// Replace the visible lines without counting as a refresh (scrolling)
    pub fn replace_lines(&self, lines: Vec<String>) {
        let mut state = self.0.write();
        if !state.detached {
            state.lines = lines;
        }
    }

    /// Stop accepting writes. Called when the widget's generation retires.
    pub fn detach(&self) {
        self.0.write().detached = true;
    }

    /// Store the outcome of a fetch
    pub fn apply(&self, result: anyhow::Result<Vec<String>>) {
        match result {
            Ok(lines) => self.set_content(lines),
            Err(e) => self.set_error(format!("{:#}", e)),
        }
    }

    /// Whether two handles point at the same panel
    #[cfg(test)]
    pub fn same_as(&self, other: &Surface) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// The contract every dashboard panel satisfies.
pub trait Widget: Send + Sync {
    /// Stable name, used in logs and as a key
    fn name(&self) -> &str;

    /// Decided once at construction; disabled widgets are never scheduled,
    /// laid out or focused
    fn is_enabled(&self) -> bool;

    fn geometry(&self) -> Geometry;

    /// How often the scheduler calls `refresh()`
    fn refresh_interval(&self) -> Duration;

    fn surface(&self) -> &Surface;

    /// Fetch fresh data into the surface.
    ///
    /// May block. Failures are written to the surface as an error, never
    /// returned.
    fn refresh(&self);

    /// Offered keys the root did not consume while this widget has focus.
    /// Returns true if the key was used.
    fn handle_key(&self, _key: KeyEvent) -> bool {
        false
    }
}

pub type WidgetHandle = Arc<dyn Widget>;

/// Ordered set of widgets built from one configuration snapshot.
///
/// Never mutated after construction; a reload builds a new set.
#[derive(Clone, Default)]
pub struct WidgetSet {
    widgets: Vec<WidgetHandle>,
}

impl WidgetSet {
    pub fn new(widgets: Vec<WidgetHandle>) -> Self {
        Self { widgets }
    }

    /// Every widget, enabled or not, in configuration order
    #[cfg(test)]
    pub fn all(&self) -> &[WidgetHandle] {
        &self.widgets
    }

    /// Enabled widgets in configuration order
    pub fn enabled(&self) -> impl Iterator<Item = &WidgetHandle> {
        self.widgets.iter().filter(|w| w.is_enabled())
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled().count()
    }

    /// The `index`-th enabled widget
    pub fn enabled_at(&self, index: usize) -> Option<&WidgetHandle> {
        self.enabled().nth(index)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl fmt::Debug for WidgetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.widgets.iter().map(|w| w.name()))
            .finish()
    }
}

#[cfg(test)]
pub mod testing {
    //! Scriptable widget for scheduler, focus and reload tests

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Behavior {
        Succeed,
        Fail,
        Panic,
        /// Block the refresh thread before succeeding
        Slow(Duration),
    }

    pub struct FakeWidget {
        name: String,
        enabled: bool,
        geometry: Geometry,
        interval: Duration,
        behavior: Behavior,
        surface: Surface,
        refreshes: AtomicUsize,
        keys: AtomicUsize,
    }

    impl FakeWidget {
        pub fn new(name: &str, interval: Duration) -> Self {
            Self {
                name: name.to_string(),
                enabled: true,
                geometry: Geometry::default(),
                interval,
                behavior: Behavior::Succeed,
                surface: Surface::new(name),
                refreshes: AtomicUsize::new(0),
                keys: AtomicUsize::new(0),
            }
        }

        pub fn disabled(mut self) -> Self {
            self.enabled = false;
            self
        }

        pub fn at(mut self, geometry: Geometry) -> Self {
            self.geometry = geometry;
            self
        }

        pub fn behavior(mut self, behavior: Behavior) -> Self {
            self.behavior = behavior;
            self
        }

        pub fn refresh_count(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }

        pub fn key_count(&self) -> usize {
            self.keys.load(Ordering::SeqCst)
        }

        pub fn handle(self) -> Arc<Self> {
            Arc::new(self)
        }
    }

    impl Widget for FakeWidget {
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
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            match self.behavior {
                Behavior::Succeed => self.surface.set_content(vec![format!("refresh #{}", n)]),
                Behavior::Fail => self.surface.apply(Err(anyhow::anyhow!("backend unreachable"))),
                Behavior::Panic => panic!("{} blew up", self.name),
                Behavior::Slow(delay) => {
                    std::thread::sleep(delay);
                    self.surface.set_content(vec![format!("refresh #{}", n)]);
                }
            }
        }

        fn handle_key(&self, _key: KeyEvent) -> bool {
            self.keys.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    /// Build a set from concrete fakes, keeping typed handles for assertions
    pub fn set_of(widgets: &[Arc<FakeWidget>]) -> WidgetSet {
        WidgetSet::new(
            widgets
                .iter()
                .map(|w| Arc::clone(w) as WidgetHandle)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeWidget;
    use super::*;

    #[test]
    fn test_geometry_fits() {
        assert!(Geometry::new(0, 0, 2, 2).fits(2, 2));
        assert!(!Geometry::new(1, 0, 2, 1).fits(2, 2));
        assert!(!Geometry::new(0, 1, 1, 2).fits(2, 2));
        assert!(!Geometry::new(0, 0, 0, 1).fits(2, 2));
    }

    #[test]
    fn test_surface_error_keeps_content() {
        let surface = Surface::new("weather");
        surface.set_content(vec!["sunny".to_string()]);
        surface.apply(Err(anyhow::anyhow!("timeout")));

        let state = surface.snapshot();
        assert_eq!(state.lines, vec!["sunny"]);
        assert_eq!(state.error.as_deref(), Some("timeout"));
        assert_eq!(state.refreshes, 2);

        surface.set_content(vec!["rain".to_string()]);
        assert!(surface.snapshot().error.is_none());
    }

    #[test]
    fn test_detached_surface_ignores_writes() {
        let surface = Surface::new("weather");
        surface.set_content(vec!["sunny".to_string()]);
        surface.clone().detach();

        surface.set_content(vec!["rain".to_string()]);
        surface.set_error("timeout");
        surface.replace_lines(vec!["scrolled".to_string()]);

        let state = surface.snapshot();
        assert!(state.detached);
        assert_eq!(state.lines, vec!["sunny"]);
        assert!(state.error.is_none());
        assert_eq!(state.refreshes, 1);
    }

    #[test]
    fn test_surface_clones_share_state() {
        let a = Surface::new("a");
        let b = a.clone();
        b.set_content(vec!["x".to_string()]);
        assert!(a.same_as(&b));
        assert_eq!(a.snapshot().lines, vec!["x"]);
        assert!(!a.same_as(&Surface::new("a")));
    }

    #[test]
    fn test_widget_set_enabled_order() {
        let set = testing::set_of(&[
            FakeWidget::new("a", Duration::from_secs(1)).handle(),
            FakeWidget::new("b", Duration::from_secs(1)).disabled().handle(),
            FakeWidget::new("c", Duration::from_secs(1)).handle(),
        ]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.enabled_count(), 2);
        let names: Vec<_> = set.enabled().map(|w| w.name().to_string()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(set.enabled_at(1).map(|w| w.name()), Some("c"));
        assert!(set.enabled_at(2).is_none());
    }
}
