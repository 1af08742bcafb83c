//! Per-widget refresh cycles.
//!
//! # Architecture
//!
//! Each enabled widget gets its own tokio task ("cycle") that fires
//! `refresh()` immediately and then every `refresh_interval`. The refresh
//! itself runs on the blocking pool, so a slow data source never stalls
//! another cycle, the redraw timer or the event loop.
//!
//! All cycles started for one widget set form a *generation*. A generation
//! shares two channels:
//!
//! ```text
//!   shutdown: watch<bool>    retire signal, checked before every refresh
//!   manual:   broadcast<()>  "refresh now" from Ctrl-R
//! ```
//!
//! Starting a new generation retires the old one first. Retiring also
//! detaches the generation's surfaces, so a refresh that was already running
//! on the blocking pool cannot write into a discarded widget set either.
//!
//! # Failure isolation
//!
//! A panic inside `refresh()` only fails that one call: it surfaces as a
//! `JoinError`, is written to the widget's surface as an error and the cycle
//! keeps going.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::widget::{Surface, WidgetHandle, WidgetSet};

/// Capacity of the manual refresh channel; extra requests coalesce
const MANUAL_REFRESH_BACKLOG: usize = 4;

/// Cycles attached to one widget set
struct Generation {
    id: u64,
    shutdown: watch::Sender<bool>,
    manual: broadcast::Sender<()>,
    cycles: Vec<JoinHandle<()>>,
    surfaces: Vec<Surface>,
}

/// Drives the refresh cycles of the active widget set
pub struct Scheduler {
    /// Whether a manual refresh restarts the widget's interval
    reset_on_manual: bool,
    current: Option<Generation>,
    next_id: u64,
}

impl Scheduler {
    pub fn new(reset_on_manual: bool) -> Self {
        Self {
            reset_on_manual,
            current: None,
            next_id: 1,
        }
    }

    /// Applies to generations started after this call
    pub fn set_reset_on_manual(&mut self, reset: bool) {
        self.reset_on_manual = reset;
    }

    /// Retire the running generation and start one cycle per enabled widget.
    ///
    /// Must be called from within a tokio runtime. Returns the new
    /// generation id.
    pub fn start(&mut self, widgets: &WidgetSet) -> u64 {
        self.retire();

        let id = self.next_id;
        self.next_id += 1;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let (manual, _) = broadcast::channel(MANUAL_REFRESH_BACKLOG);

        let surfaces: Vec<Surface> = widgets.enabled().map(|w| w.surface().clone()).collect();
        let cycles: Vec<_> = widgets
            .enabled()
            .map(|widget| {
                let cycle = Cycle {
                    widget: Arc::clone(widget),
                    shutdown: shutdown_rx.clone(),
                    manual: manual.subscribe(),
                    reset_on_manual: self.reset_on_manual,
                };
                tokio::spawn(cycle.run())
            })
            .collect();

        tracing::info!("Started refresh generation {} with {} cycles", id, cycles.len());

        self.current = Some(Generation {
            id,
            shutdown,
            manual,
            cycles,
            surfaces,
        });
        id
    }

    /// Signal every cycle of the running generation to stop
    pub fn retire(&mut self) {
        if let Some(generation) = self.current.take() {
            // Receivers may all be gone already (empty set); nothing to do then
            let _ = generation.shutdown.send(true);
            for surface in &generation.surfaces {
                surface.detach();
            }
            tracing::info!(
                "Retired refresh generation {} ({} cycles)",
                generation.id,
                generation.cycles.len()
            );
        }
    }

    /// Ask every enabled widget of the running generation to refresh now.
    ///
    /// Does not touch the widgets' own timers unless configured to.
    pub fn refresh_all(&self) {
        let Some(ref generation) = self.current else {
            return;
        };
        match generation.manual.send(()) {
            Ok(n) => tracing::debug!("Manual refresh sent to {} cycles", n),
            Err(_) => tracing::debug!("Manual refresh with no running cycles"),
        }
    }

    /// Id of the running generation
    pub fn generation(&self) -> Option<u64> {
        self.current.as_ref().map(|g| g.id)
    }

    /// Number of cycles of the running generation still alive
    #[cfg(test)]
    pub fn active_cycles(&self) -> usize {
        self.current
            .as_ref()
            .map(|g| g.cycles.iter().filter(|c| !c.is_finished()).count())
            .unwrap_or(0)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.retire();
    }
}

/// One widget's repeating refresh loop
struct Cycle {
    widget: WidgetHandle,
    shutdown: watch::Receiver<bool>,
    manual: broadcast::Receiver<()>,
    reset_on_manual: bool,
}

impl Cycle {
    async fn run(mut self) {
        let period = self.widget.refresh_interval().max(Duration::from_millis(1));
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let manual = tokio::select! {
                biased;
                // Err means the scheduler itself is gone
                _ = self.shutdown.changed() => break,
                _ = ticker.tick() => false,
                msg = self.manual.recv() => match msg {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => true,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            if self.retired() {
                break;
            }
            if manual && self.reset_on_manual {
                ticker.reset();
            }
            self.refresh_once().await;
        }

        tracing::debug!("Refresh cycle for {} stopped", self.widget.name());
    }

    fn retired(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn refresh_once(&self) {
        let widget = Arc::clone(&self.widget);
        let result = tokio::task::spawn_blocking(move || widget.refresh()).await;

        let Err(err) = result else {
            return;
        };
        if self.retired() {
            return;
        }
        let reason = if err.is_panic() {
            panic_message(err.into_panic())
        } else {
            "refresh task cancelled".to_string()
        };
        tracing::warn!("Widget {} refresh failed: {}", self.widget.name(), reason);
        self.widget
            .surface()
            .set_error(format!("refresh panicked: {}", reason));
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
