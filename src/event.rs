//! Events feeding the main loop
//!
//! Everything that wants the event loop's attention (terminal input, redraw
//! ticks, config changes) arrives as an [`AppEvent`] on one channel, so the
//! loop is the single owner of the terminal and of the focus state.

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// How long the input thread blocks before checking whether the app is gone
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Periodic redraw tick
    Redraw,
    /// The config file was written
    ConfigChanged,
}

/// Read terminal input on a dedicated thread.
///
/// crossterm's reader blocks, so this stays off the runtime. The thread ends
/// when the receiving side is dropped or the terminal read fails.
pub fn spawn_input_thread(tx: UnboundedSender<AppEvent>) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("board-input".to_string())
        .spawn(move || loop {
            if tx.is_closed() {
                break;
            }
            let ready = match event::poll(INPUT_POLL) {
                Ok(ready) => ready,
                Err(e) => {
                    tracing::error!("Terminal poll failed: {}", e);
                    break;
                }
            };
            if !ready {
                continue;
            }
            let app_event = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(Event::Resize(cols, rows)) => AppEvent::Resize(cols, rows),
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("Terminal read failed: {}", e);
                    break;
                }
            };
            if tx.send(app_event).is_err() {
                break;
            }
        })
}
