//! Config hot reload.
//!
//! # Watching
//!
//! The config file is polled (default every 100ms). Only content changes
//! count: a change is reported once the file's size/mtime have been stable
//! for one poll, so an editor writing in several steps triggers one reload.
//! A file that is briefly missing (editors saving via rename) is ignored.
//! Any other metadata error disables hot reload but leaves the board running.
//!
//! # Reloading
//!
//! ```text
//! load + validate config ──fail──> log, keep everything as is
//!        │
//!        ▼
//! build widget set + grid (new Snapshot)
//!        │
//!        ▼
//! retire old refresh generation
//! swap snapshot (config, widgets, grid as one unit)
//! reset focus
//! start new refresh generation
//! ```

use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::Config;
use crate::event::AppEvent;
use crate::focus::FocusTracker;
use crate::scheduler::Scheduler;
use crate::snapshot::{Snapshot, SnapshotStore};

/// What the watcher compares between polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

/// Turns a stream of polled fingerprints into settled change notifications
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<Fingerprint>,
    pending: bool,
}

impl ChangeDetector {
    pub fn new(initial: Option<Fingerprint>) -> Self {
        Self {
            last: initial,
            pending: false,
        }
    }

    /// Feed one poll result. Returns true when a change has settled.
    pub fn observe(&mut self, current: Option<Fingerprint>) -> bool {
        let Some(current) = current else {
            return false;
        };
        if self.last != Some(current) {
            self.last = Some(current);
            self.pending = true;
            false
        } else if self.pending {
            self.pending = false;
            true
        } else {
            false
        }
    }
}

async fn fingerprint(path: &Path) -> io::Result<Option<Fingerprint>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(Fingerprint {
            modified: meta.modified().ok(),
            len: meta.len(),
        })),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Background task polling the config file
pub struct ConfigWatcher {
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    pub fn spawn(path: PathBuf, poll: Duration, events: UnboundedSender<AppEvent>) -> Self {
        tracing::info!("Watching {} every {:?}", path.display(), poll);
        let task = tokio::spawn(watch(path, poll, events));
        Self { task }
    }

    /// False once the watcher gave up or the app went away
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch(path: PathBuf, poll: Duration, events: UnboundedSender<AppEvent>) {
    let initial = fingerprint(&path).await.ok().flatten();
    let mut detector = ChangeDetector::new(initial);
    let mut ticker = time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let current = match fingerprint(&path).await {
            Ok(current) => current,
            Err(e) => {
                tracing::error!(
                    "Cannot watch {}: {}. Hot reload disabled",
                    path.display(),
                    e
                );
                return;
            }
        };
        if detector.observe(current) {
            tracing::info!("Config file {} changed", path.display());
            if events.send(AppEvent::ConfigChanged).is_err() {
                return;
            }
        }
    }
}

/// Load the config at `path` and swap it in with everything derived from it.
///
/// On error nothing is touched: the previous snapshot, refresh generation and
/// focus stay as they were.
pub async fn reload(
    path: &Path,
    store: &SnapshotStore,
    scheduler: &mut Scheduler,
    focus: &mut FocusTracker,
) -> Result<Arc<Snapshot>> {
    let config = Config::read(path).await?;
    let reset_on_manual = config.scheduler.reset_timer_on_manual_refresh;
    let next = Snapshot::build(config, store.version() + 1);
    let enabled = next.widgets.enabled_count();

    scheduler.retire();
    let previous = store.replace(next);
    let active = store.load();
    focus.reset(enabled);
    scheduler.set_reset_on_manual(reset_on_manual);
    scheduler.start(&active.widgets);

    tracing::info!(
        "Reloaded config v{} -> v{}: {} widgets ({} enabled)",
        previous.version,
        active.version,
        active.widgets.len(),
        enabled
    );
    Ok(active)
}
