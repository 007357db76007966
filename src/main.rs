//! bookhub-tui binary entry point.
//!
//! Parses flags, sets up file logging, initializes the terminal in raw mode,
//! runs the TUI event loop, and restores the terminal state on exit.
//!
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bookhub_tui::Result;
use bookhub_tui::api::Gateways;
use bookhub_tui::api::memory::MemoryGateway;
use bookhub_tui::app::config::ClientConfig;
use bookhub_tui::app::keymap::Keymap;
use bookhub_tui::app::{self, ActiveTab, AppState};

#[derive(Parser, Debug)]
#[command(name = "bookhub-tui", version, about = "Manage BookHub users and books from the terminal")]
struct Cli {
    /// Root of the REST API (overrides bookhub.conf)
    #[arg(long, env = "BOOKHUB_BASE_URL")]
    base_url: Option<String>,

    /// Client configuration file
    #[arg(long, default_value = "bookhub.conf")]
    config: String,

    /// Tab shown at startup: users|catalog
    #[arg(long)]
    tab: Option<ActiveTab>,

    /// Serve both tabs from a seeded in-memory store instead of HTTP
    #[arg(long)]
    offline: bool,

    /// Log destination; the terminal is owned by the UI
    #[arg(long, env = "BOOKHUB_LOG_FILE", default_value = "bookhub.log")]
    log_file: String,
}

fn init_logging(path: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {path}"))?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let mut config = ClientConfig::load_or_init(&cli.config);
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if let Some(tab) = cli.tab {
        config.start_tab = tab;
    }

    let (gateways, source) = if cli.offline {
        info!("starting with the in-memory demo store");
        (
            Gateways::memory(Arc::new(MemoryGateway::seeded())),
            "offline".to_string(),
        )
    } else {
        info!(base_url = %config.base_url, "starting against REST API");
        (Gateways::http(&config.base_url)?, config.base_url.clone())
    };
    let keymap = Keymap::load_or_init("keybinds.conf");

    let mut terminal = init_terminal().context("init terminal")?;
    let app = AppState::new(gateways, config.start_tab, keymap, source);

    let res = app::run(&mut terminal, app).await;

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        warn!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
