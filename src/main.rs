//! Terminal front-end: wires config, provider, coordinator and the event
//! loop together.

use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, LevelFilter};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use txn_browser::app::App;
use txn_browser::cache::{EmployeeDirectory, StalePolicy};
use txn_browser::config::{Args, Config, LoggingConfig};
use txn_browser::coordinator::ViewCoordinator;
use txn_browser::dispatch::{Dispatcher, Intent};
use txn_browser::source::{Dataset, FixtureApi, HttpApi, TransactionApi};
use txn_browser::{input, ui};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before printing the panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// The terminal owns stdout, so logs go to a file or nowhere.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    match &config.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .parse_filters(&config.level)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn TransactionApi>> {
    let api = &config.api;
    if let Some(url) = &api.base_url {
        return Ok(Arc::new(HttpApi::new(url)));
    }
    let fixture = match &api.fixture {
        Some(path) => FixtureApi::load(path)?,
        None => FixtureApi::new("demo", Dataset::demo()?),
    };
    Ok(Arc::new(
        fixture
            .with_page_size(api.page_size)
            .with_latency(Duration::from_millis(api.latency_ms)),
    ))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::resolve(&args)?;
    init_logging(&config.logging)?;

    // -- provider & coordinator ----------------------------------------------
    let api = build_provider(&config)?;
    info!("using provider {}", api.name());
    let policy = StalePolicy::from_discard_flag(config.view.discard_superseded);
    let directory = Arc::new(EmployeeDirectory::new(api.clone(), policy));
    let coordinator = Arc::new(ViewCoordinator::new(api, directory, policy));

    let runtime = tokio::runtime::Runtime::new().context("cannot start tokio runtime")?;
    let (dispatcher, rx) = Dispatcher::new(runtime.handle().clone(), coordinator.clone());
    dispatcher.dispatch(Intent::Bootstrap);

    // -- terminal setup (RAII: Drop restores on exit or panic) ----------------
    install_panic_hook();
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain intent outcomes and refresh the coordinator snapshot.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            app.handle_msg(msg);
        }
        app.apply_snapshot(coordinator.snapshot());

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(intent) = input::handle_key_event(&mut app, key) {
                    dispatcher.dispatch(intent);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // Pending requests are abandoned with the runtime.
    runtime.shutdown_background();
    Ok(())
}
