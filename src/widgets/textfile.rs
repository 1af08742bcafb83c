use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::Source;
use crate::widget::Surface;

const PAGE: usize = 10;

/// Shows a text file; scrolls with the arrow keys while focused
pub struct TextFile {
    path: PathBuf,
    lines: Mutex<Vec<String>>,
    offset: AtomicUsize,
}

impl TextFile {
    pub fn new(path: String) -> Self {
        let path = PathBuf::from(shellexpand::tilde(&path).as_ref());
        Self {
            path,
            lines: Mutex::new(Vec::new()),
            offset: AtomicUsize::new(0),
        }
    }

    /// Lines from the current scroll offset on
    fn view(&self) -> Vec<String> {
        let lines = self.lines.lock();
        let offset = self.offset.load(Ordering::Relaxed).min(lines.len());
        lines[offset..].to_vec()
    }

    fn scroll(&self, target: impl FnOnce(usize, usize) -> usize) {
        let len = self.lines.lock().len();
        let current = self.offset.load(Ordering::Relaxed);
        let next = target(current, len).min(len.saturating_sub(1));
        self.offset.store(next, Ordering::Relaxed);
    }
}

impl Source for TextFile {
    fn fetch(&self) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        *self.lines.lock() = content.lines().map(|l| l.to_string()).collect();
        // File may have shrunk
        self.scroll(|current, _| current);
        Ok(self.view())
    }

    fn handle_key(&self, key: KeyEvent, surface: &Surface) -> bool {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.scroll(|cur, _| cur + 1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll(|cur, _| cur.saturating_sub(1)),
            KeyCode::PageDown => self.scroll(|cur, _| cur + PAGE),
            KeyCode::PageUp => self.scroll(|cur, _| cur.saturating_sub(PAGE)),
            KeyCode::Home | KeyCode::Char('g') => self.scroll(|_, _| 0),
            KeyCode::End | KeyCode::Char('G') => self.scroll(|_, len| len),
            _ => return false,
        }
        surface.replace_lines(self.view());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::io::Write;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn file_with(lines: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..lines {
            writeln!(file, "line {}", i).unwrap();
        }
        file
    }

    #[test]
    fn test_reads_file() {
        let file = file_with(3);
        let source = TextFile::new(file.path().display().to_string());
        assert_eq!(source.fetch().unwrap(), vec!["line 0", "line 1", "line 2"]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let source = TextFile::new("/nonexistent/notes.md".to_string());
        let err = format!("{:#}", source.fetch().unwrap_err());
        assert!(err.contains("/nonexistent/notes.md"));
    }

    #[test]
    fn test_scrolling_updates_surface() {
        let file = file_with(30);
        let source = TextFile::new(file.path().display().to_string());
        let surface = Surface::new("notes");
        surface.apply(source.fetch());

        assert!(source.handle_key(key(KeyCode::Down), &surface));
        assert_eq!(surface.snapshot().lines[0], "line 1");

        source.handle_key(key(KeyCode::PageDown), &surface);
        assert_eq!(surface.snapshot().lines[0], "line 11");

        source.handle_key(key(KeyCode::End), &surface);
        assert_eq!(surface.snapshot().lines, vec!["line 29"]);

        source.handle_key(key(KeyCode::Home), &surface);
        assert_eq!(surface.snapshot().lines.len(), 30);
        // Scrolling is not a refresh
        assert_eq!(surface.snapshot().refreshes, 1);
    }

    #[test]
    fn test_other_keys_pass() {
        let source = TextFile::new("/nonexistent".to_string());
        assert!(!source.handle_key(key(KeyCode::Char('x')), &Surface::new("notes")));
    }
}
