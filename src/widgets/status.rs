use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::Source;

const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Heartbeat: advances one animation frame per refresh
pub struct Status {
    started: Instant,
    beats: AtomicU64,
}

impl Status {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            beats: AtomicU64::new(0),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Status {
    fn fetch(&self) -> Result<Vec<String>> {
        let beat = self.beats.fetch_add(1, Ordering::Relaxed);
        let frame = FRAMES[(beat % FRAMES.len() as u64) as usize];
        let up = self.started.elapsed().as_secs();
        Ok(vec![format!(
            "{} running {:02}:{:02}:{:02}",
            frame,
            up / 3600,
            (up / 60) % 60,
            up % 60
        )])
    }
}
