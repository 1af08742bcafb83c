use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ui::Theme;
use crate::widget::Geometry;

/// Written on first run when no config file exists
pub const DEFAULT_CONFIG: &str = r#"# darkwall-board configuration
#
# Edits are picked up while the board is running.

# Seconds between screen redraws
refresh_interval = 2

[grid]
# >0 fixed cells, 0 one share of the free space, <0 that many shares
columns = [0, 0]
rows = [0, 0, 3]

[watch]
enabled = true
poll_interval_ms = 100

[scheduler]
reset_timer_on_manual_refresh = false

[appearance]
theme = "darkwall"

[[widget]]
type = "clocks"
name = "Clocks"
refresh_interval = 1
position = { top = 0, left = 0, height = 1, width = 1 }
zones = [
  { label = "UTC", offset_minutes = 0 },
  { label = "Berlin", offset_minutes = 60 },
  { label = "New York", offset_minutes = -300 },
]

[[widget]]
type = "cmdrunner"
name = "Uptime"
refresh_interval = 30
position = { top = 0, left = 1, height = 1, width = 1 }
cmd = "uptime"

[[widget]]
type = "textfile"
name = "Notes"
refresh_interval = 10
position = { top = 1, left = 0, height = 1, width = 2 }
path = "~/.config/darkwall-board/notes.md"

[[widget]]
type = "status"
name = "Status"
refresh_interval = 1
position = { top = 2, left = 0, height = 1, width = 2 }
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between redraws of the whole screen
    pub refresh_interval: u64,
    pub grid: GridConfig,
    pub watch: WatchConfig,
    pub scheduler: SchedulerConfig,
    pub appearance: AppearanceConfig,
    #[serde(rename = "widget")]
    pub widgets: Vec<WidgetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: Vec<i32>,
    pub rows: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Hot-reload the config file on change
    pub enabled: bool,
    /// How often the file is checked; successive writes within one poll coalesce
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Restart a widget's interval after a manual refresh
    pub reset_timer_on_manual_refresh: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Theme preset: "darkwall", "catppuccin-mocha", "nord", "gruvbox"
    pub theme: String,
}

/// One `[[widget]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Display name, defaults to the widget type
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between refreshes
    #[serde(default = "default_widget_interval")]
    pub refresh_interval: u64,
    #[serde(default)]
    pub position: Geometry,
    #[serde(flatten)]
    pub kind: WidgetKind,
}

/// Data source of a widget and its source-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetKind {
    Clocks {
        #[serde(default)]
        zones: Vec<ZoneConfig>,
    },
    CmdRunner {
        cmd: String,
        #[serde(default)]
        args: Vec<String>,
    },
    TextFile {
        path: String,
    },
    Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub label: String,
    /// Offset from UTC in minutes
    pub offset_minutes: i32,
}

/// Semantic problems in an otherwise well-formed config
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid needs at least one row and one column")]
    EmptyGrid,
    #[error("refresh_interval must be at least 1 second")]
    ZeroRedrawInterval,
    #[error("watch.poll_interval_ms must be at least 1")]
    ZeroPollInterval,
    #[error("widget '{name}' has refresh_interval 0")]
    ZeroRefreshInterval { name: String },
    #[error(
        "widget '{name}' covers rows {top}..{bottom} and columns {left}..{right}, \
         but the grid is {rows} rows by {columns} columns"
    )]
    OutOfGrid {
        name: String,
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
        rows: usize,
        columns: usize,
    },
    #[error("more than one widget is named '{0}'")]
    DuplicateName(String),
    #[error("unknown theme '{0}'")]
    UnknownTheme(String),
}

fn default_true() -> bool {
    true
}

fn default_widget_interval() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: 2,
            grid: GridConfig::default(),
            watch: WatchConfig::default(),
            scheduler: SchedulerConfig::default(),
            appearance: AppearanceConfig::default(),
            widgets: Vec::new(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: vec![0, 0],
            rows: vec![0, 0],
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 100,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: "darkwall".to_string(),
        }
    }
}

impl WidgetKind {
    /// Type name as written in the config
    pub fn type_name(&self) -> &'static str {
        match self {
            WidgetKind::Clocks { .. } => "clocks",
            WidgetKind::CmdRunner { .. } => "cmdrunner",
            WidgetKind::TextFile { .. } => "textfile",
            WidgetKind::Status => "status",
        }
    }
}

impl WidgetConfig {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind.type_name().to_string())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }
}

impl Config {
    /// Parse and validate config text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Like [`Config::load`], without blocking the runtime. Used by hot reload.
    pub async fn read(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Startup load: write the default config first if none exists yet
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file not found, writing defaults to {}", path.display());
            write_default(path)?;
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval == 0 {
            return Err(ConfigError::ZeroRedrawInterval);
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.grid.rows.is_empty() || self.grid.columns.is_empty() {
            return Err(ConfigError::EmptyGrid);
        }
        if Theme::from_preset(&self.appearance.theme).is_none() {
            return Err(ConfigError::UnknownTheme(self.appearance.theme.clone()));
        }

        let rows = self.grid.rows.len();
        let columns = self.grid.columns.len();
        let mut names = HashSet::new();

        for widget in &self.widgets {
            let name = widget.display_name();
            if !names.insert(name.clone()) {
                return Err(ConfigError::DuplicateName(name));
            }
            if widget.refresh_interval == 0 {
                return Err(ConfigError::ZeroRefreshInterval { name });
            }
            // Disabled widgets are never laid out, so their position is free
            if widget.enabled && !widget.position.fits(rows, columns) {
                let p = widget.position;
                return Err(ConfigError::OutOfGrid {
                    name,
                    top: p.top as usize,
                    bottom: p.bottom(),
                    left: p.left as usize,
                    right: p.right(),
                    rows,
                    columns,
                });
            }
        }

        Ok(())
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    pub fn resolve_theme(&self) -> Theme {
        Theme::from_preset(&self.appearance.theme).unwrap_or_default()
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Expand `~` in a user-supplied path.
///
/// Fails when the path needs a home directory and none can be found.
pub fn resolve_path(raw: &str) -> Result<PathBuf> {
    if raw.starts_with('~') && dirs::home_dir().is_none() {
        bail!("Cannot resolve home directory for {}", raw);
    }
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// Create the config directory and the default config file
pub fn write_default(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write default config to {}", path.display()))
}
