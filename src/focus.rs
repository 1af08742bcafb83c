//! Keyboard focus over the enabled panels.
//!
//! Only the event loop drives transitions, so the state is a plain value with
//! a single writer. The tracker does not touch widgets: each transition
//! returns a [`FocusChange`] and the drawing code decides how the marker looks.

/// Focus state over the enabled-widget subsequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    At(usize),
}

/// Result of a transition: which panel lost the marker and which gained it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl FocusChange {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Cyclic focus state machine
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    state: Focus,
    len: usize,
}

impl FocusTracker {
    /// Tracker over `len` enabled widgets, starting unfocused
    pub fn new(len: usize) -> Self {
        Self {
            state: Focus::None,
            len,
        }
    }

    pub fn state(&self) -> Focus {
        self.state
    }

    pub fn focused(&self) -> Option<usize> {
        match self.state {
            Focus::None => None,
            Focus::At(i) => Some(i),
        }
    }

    pub fn is_focused(&self, index: usize) -> bool {
        self.focused() == Some(index)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Move to the next panel, wrapping; no-op with no panels
    pub fn next(&mut self) -> FocusChange {
        if self.len == 0 {
            return self.transition(self.state);
        }
        let target = match self.state {
            Focus::None => 0,
            Focus::At(i) => (i + 1) % self.len,
        };
        self.transition(Focus::At(target))
    }

    /// Move to the previous panel, wrapping; no-op with no panels
    pub fn prev(&mut self) -> FocusChange {
        if self.len == 0 {
            return self.transition(self.state);
        }
        let target = match self.state {
            Focus::None => self.len - 1,
            Focus::At(i) => (i + self.len - 1) % self.len,
        };
        self.transition(Focus::At(target))
    }

    /// Drop focus
    pub fn clear(&mut self) -> FocusChange {
        self.transition(Focus::None)
    }

    /// The widget set was replaced: forget the old index entirely
    pub fn reset(&mut self, len: usize) -> FocusChange {
        self.len = len;
        self.transition(Focus::None)
    }

    fn transition(&mut self, to: Focus) -> FocusChange {
        let change = FocusChange {
            from: self.focused(),
            to: match to {
                Focus::None => None,
                Focus::At(i) => Some(i),
            },
        };
        self.state = to;
        if !change.is_noop() {
            tracing::debug!("Focus {:?} -> {:?}", change.from, change.to);
        }
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unfocused() {
        let tracker = FocusTracker::new(3);
        assert_eq!(tracker.state(), Focus::None);
        assert_eq!(tracker.focused(), None);
    }

    #[test]
    fn test_next_cycles_back_to_first() {
        for n in 1..8 {
            let mut tracker = FocusTracker::new(n);
            tracker.next();
            assert_eq!(tracker.state(), Focus::At(0));
            for _ in 0..n {
                tracker.next();
            }
            assert_eq!(tracker.state(), Focus::At(0), "n = {}", n);
        }
    }

    #[test]
    fn test_prev_cycles_back_to_last() {
        for n in 1..8 {
            let mut tracker = FocusTracker::new(n);
            tracker.prev();
            assert_eq!(tracker.state(), Focus::At(n - 1));
            for _ in 0..n {
                tracker.prev();
            }
            assert_eq!(tracker.state(), Focus::At(n - 1), "n = {}", n);
        }
    }

    #[test]
    fn test_prev_wraps_from_first() {
        let mut tracker = FocusTracker::new(3);
        tracker.next();
        tracker.prev();
        assert_eq!(tracker.state(), Focus::At(2));
    }

    #[test]
    fn test_clear_then_next_starts_over() {
        let mut tracker = FocusTracker::new(4);
        tracker.next();
        tracker.next();
        let change = tracker.clear();
        assert_eq!(change, FocusChange { from: Some(1), to: None });
        assert_eq!(tracker.state(), Focus::None);

        tracker.next();
        assert_eq!(tracker.state(), Focus::At(0));
    }

    #[test]
    fn test_clear_from_none() {
        let mut tracker = FocusTracker::new(2);
        assert!(tracker.clear().is_noop());
        assert_eq!(tracker.state(), Focus::None);
    }

    #[test]
    fn test_empty_set_is_noop() {
        let mut tracker = FocusTracker::new(0);
        assert!(tracker.next().is_noop());
        assert!(tracker.prev().is_noop());
        assert_eq!(tracker.state(), Focus::None);
    }

    #[test]
    fn test_change_reports_marker_moves() {
        let mut tracker = FocusTracker::new(2);
        assert_eq!(tracker.next(), FocusChange { from: None, to: Some(0) });
        assert_eq!(tracker.next(), FocusChange { from: Some(0), to: Some(1) });
        assert_eq!(tracker.next(), FocusChange { from: Some(1), to: Some(0) });
    }

    #[test]
    fn test_reset_drops_stale_index() {
        let mut tracker = FocusTracker::new(5);
        tracker.prev();
        assert_eq!(tracker.state(), Focus::At(4));

        tracker.reset(2);
        assert_eq!(tracker.state(), Focus::None);
        assert_eq!(tracker.len(), 2);
        tracker.prev();
        assert_eq!(tracker.state(), Focus::At(1));
    }
}
