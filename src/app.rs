use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::event::AppEvent;
use crate::focus::{Focus, FocusTracker};
use crate::redraw::RedrawLoop;
use crate::reload::{self, ConfigWatcher};
use crate::scheduler::Scheduler;
use crate::snapshot::{Snapshot, SnapshotStore};

/// What a key did, as far as the main loop cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Consumed by the board itself (focus, refresh)
    Handled,
    /// Given to the focused widget, which used it
    Forwarded,
    /// Nobody wanted it
    Ignored,
    Quit,
}

/// Application state
pub struct App {
    /// Active config, widget set and grid
    store: SnapshotStore,
    focus: FocusTracker,
    scheduler: Scheduler,
    redraw: RedrawLoop,
    watcher: Option<ConfigWatcher>,
    /// File hot reload reads from
    config_path: PathBuf,
    /// Sender side of the main loop's channel, handed to timers
    events: UnboundedSender<AppEvent>,
    /// Shown in the status bar until the next successful reload
    last_reload_error: Option<String>,
    should_quit: bool,
}

impl App {
    /// Build the board from `config` and start its timers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: Config, config_path: PathBuf, events: UnboundedSender<AppEvent>) -> Self {
        Self::from_snapshot(Snapshot::build(config, 1), config_path, events)
    }

    pub fn from_snapshot(
        snapshot: Snapshot,
        config_path: PathBuf,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let mut scheduler =
            Scheduler::new(snapshot.config.scheduler.reset_timer_on_manual_refresh);
        scheduler.start(&snapshot.widgets);
        let focus = FocusTracker::new(snapshot.widgets.enabled_count());
        let redraw = RedrawLoop::start(snapshot.config.redraw_interval(), events.clone());

        Self {
            store: SnapshotStore::new(snapshot),
            focus,
            scheduler,
            redraw,
            watcher: None,
            config_path,
            events,
            last_reload_error: None,
            should_quit: false,
        }
    }

    /// Start polling the config file for changes
    pub fn enable_hot_reload(&mut self) {
        let poll = self.store.load().config.watch.poll_interval();
        self.watcher = Some(ConfigWatcher::spawn(
            self.config_path.clone(),
            poll,
            self.events.clone(),
        ));
    }

    /// False when hot reload is off or the watcher gave up
    pub fn hot_reload_active(&self) -> bool {
        self.watcher.as_ref().is_some_and(|w| w.is_running())
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.load()
    }

    /// Refresh generation driving the current board
    pub fn generation(&self) -> Option<u64> {
        self.scheduler.generation()
    }

    #[cfg(test)]
    pub fn focus(&self) -> Focus {
        self.focus.state()
    }

    pub fn is_focused(&self, index: usize) -> bool {
        self.focus.is_focused(index)
    }

    pub fn last_reload_error(&self) -> Option<&str> {
        self.last_reload_error.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Apply one event from the main loop
    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => {
                if self.handle_key(key) == KeyOutcome::Quit {
                    self.quit();
                }
            }
            AppEvent::ConfigChanged => self.reload().await,
            AppEvent::Resize(cols, rows) => tracing::debug!("Terminal resized to {}x{}", cols, rows),
            AppEvent::Redraw => {}
        }
    }

    /// Board keys first, everything else goes to the focused widget
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return KeyOutcome::Quit,
            KeyCode::Char('r') if ctrl => {
                tracing::info!("Manual refresh of all widgets");
                self.scheduler.refresh_all();
                return KeyOutcome::Handled;
            }
            KeyCode::Tab => {
                self.focus.next();
                return KeyOutcome::Handled;
            }
            KeyCode::BackTab => {
                self.focus.prev();
                return KeyOutcome::Handled;
            }
            KeyCode::Esc => {
                self.focus.clear();
                return KeyOutcome::Handled;
            }
            _ => {}
        }

        let Focus::At(index) = self.focus.state() else {
            return match key.code {
                KeyCode::Char('q') => KeyOutcome::Quit,
                _ => KeyOutcome::Ignored,
            };
        };

        let snapshot = self.store.load();
        match snapshot.widgets.enabled_at(index) {
            Some(widget) if widget.handle_key(key) => KeyOutcome::Forwarded,
            Some(_) => KeyOutcome::Ignored,
            None => {
                tracing::warn!("Focus index {} has no widget", index);
                KeyOutcome::Ignored
            }
        }
    }

    /// Reload the config file, keeping the current board on failure
    pub async fn reload(&mut self) {
        match reload::reload(
            &self.config_path,
            &self.store,
            &mut self.scheduler,
            &mut self.focus,
        )
        .await
        {
            Ok(active) => {
                self.redraw
                    .retune(active.config.redraw_interval(), self.events.clone());
                self.last_reload_error = None;
            }
            Err(e) => {
                tracing::error!("Config reload failed, keeping previous config: {:#}", e);
                self.last_reload_error = Some(format!("{:#}", e));
            }
        }
    }
}
