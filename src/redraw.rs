//! Periodic redraw timer.
//!
//! Widgets update their surfaces on their own schedules; this timer is the
//! only thing that asks for the screen to be repainted, so N widgets never
//! fight over the terminal.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::event::AppEvent;

pub struct RedrawLoop {
    interval: Duration,
    task: JoinHandle<()>,
}

impl RedrawLoop {
    /// Start ticking; the first tick fires immediately
    pub fn start(interval: Duration, events: UnboundedSender<AppEvent>) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if events.send(AppEvent::Redraw).is_err() {
                    break;
                }
            }
        });
        tracing::debug!("Redraw every {:?}", interval);
        Self { interval, task }
    }

    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Restart with a new period if it differs from the current one
    pub fn retune(&mut self, interval: Duration, events: UnboundedSender<AppEvent>) {
        if interval != self.interval {
            tracing::info!("Redraw interval changed to {:?}", interval);
            *self = Self::start(interval, events);
        }
    }
}

impl Drop for RedrawLoop {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> usize {
        let mut n = 0;
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event, AppEvent::Redraw);
            n += 1;
        }
        n
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _redraw = RedrawLoop::start(Duration::from_secs(2), tx);

        time::sleep(Duration::from_millis(5500)).await;
        // t = 0, 2, 4
        assert_eq!(drain(&mut rx), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retune_replaces_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut redraw = RedrawLoop::start(Duration::from_secs(2), tx.clone());
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(drain(&mut rx), 1);

        redraw.retune(Duration::from_secs(1), tx.clone());
        assert_eq!(redraw.interval(), Duration::from_secs(1));
        time::sleep(Duration::from_millis(3500)).await;
        // New timer only: t = 0, 1, 2, 3 after retune
        assert_eq!(drain(&mut rx), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_interval_keeps_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut redraw = RedrawLoop::start(Duration::from_secs(2), tx.clone());
        time::sleep(Duration::from_millis(100)).await;
        redraw.retune(Duration::from_secs(2), tx);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let redraw = RedrawLoop::start(Duration::from_secs(1), tx);
        drop(rx);
        time::sleep(Duration::from_secs(2)).await;
        assert!(redraw.task.is_finished());
    }
}
