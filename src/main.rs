mod app;
mod config;
mod event;
mod focus;
mod grid;
mod redraw;
mod reload;
mod scheduler;
mod snapshot;
mod ui;
mod widget;
mod widgets;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::Config;
use event::AppEvent;

/// How long refreshes still running at exit get before they are abandoned
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "board")]
#[command(about = "Terminal dashboard of independently refreshing widgets")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "~/.config/darkwall-board/config.toml")]
    config: String,

    /// Do not reload the config when the file changes
    #[arg(long)]
    no_watch: bool,

    /// Log file path (the terminal belongs to the board)
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(ref raw) => config::resolve_path(raw)?,
        None => default_log_path(),
    };
    init_logging(&log_path)?;
    install_panic_hook();

    let config_path = config::resolve_path(&cli.config)?;
    let config = Config::load_or_create(&config_path)?;
    tracing::info!(
        "Loaded {} widgets from {}",
        config.widgets.len(),
        config_path.display()
    );
    let watch = !cli.no_watch && config.watch.enabled;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("board-worker")
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(run(config, config_path, watch));
    // A widget stuck in a blocking refresh must not hold up exit
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(ref e) = result {
        tracing::error!("Exiting with error: {:#}", e);
    }
    result
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("darkwall-board")
        .join("board.log")
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "darkwall_board=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// Route panics to the log instead of the screen.
///
/// Widget panics are recovered by the scheduler and must leave the terminal
/// alone; a panic on the main thread restores it before the process dies.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        tracing::error!("Panic on thread {}: {}", name, info);
        if name == "main" {
            let _ = restore_terminal();
            default_hook(info);
        }
    }));
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

async fn run(config: Config, config_path: PathBuf, watch: bool) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::start(config, config_path, tx.clone());
    if watch {
        app.enable_hot_reload();
    }

    let result = match event::spawn_input_thread(tx) {
        Ok(_) => run_app(&mut terminal, &mut app, rx).await,
        Err(e) => Err(e).context("Failed to start input thread"),
    };

    // Stop refresh cycles before handing the terminal back
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut events: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let Some(event) = events.recv().await else {
            return Ok(());
        };
        app.handle_event(event).await;
        // Apply whatever else queued up before paying for a draw
        while let Ok(event) = events.try_recv() {
            app.handle_event(event).await;
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
