//! vidsynth - Video Pipeline Dashboard
//!
//! Terminal UI for driving and inspecting a video segmentation pipeline.

mod app;
mod ui;
mod worker;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use vidsynth_core::{ApiClient, Config};

use crate::app::App;
use crate::worker::Worker;

/// Frame period; the simulated runs tick at 30-50 ms
const FRAME_POLL: Duration = Duration::from_millis(25);

#[derive(Parser, Debug)]
#[command(name = "vidsynth")]
#[command(about = "Terminal dashboard for a video segmentation pipeline")]
#[command(version)]
struct Args {
    /// Pipeline API base address (overrides config and VIDSYNTH_API_BASE)
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(base) = &args.api_base {
        config.api.set_base_url(base);
        config.api.validate().context("invalid --api-base")?;
    }

    if args.print_config {
        print!("{}", config.to_toml().context("failed to render configuration")?);
        return Ok(());
    }

    // Initialize logging (to file, not stdout since we have a TUI)
    let log_guard =
        vidsynth_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(base_url = %config.api.base_url, "vidsynth TUI starting up");

    let client = ApiClient::new(&config.api).context("failed to create API client")?;
    let worker = Worker::spawn(client.clone(), config.api.reconnect_delay())
        .context("failed to start network worker")?;

    // Create app and start in the pipeline view
    let mut app = App::new(client.base_url(), &config.sandbox, worker.sender());
    app.start();

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &worker);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    drop(app);
    worker.shutdown();

    tracing::info!("vidsynth TUI shutting down");

    if result.is_err() {
        eprintln!("Logs: {}", log_guard.log_dir().display());
    }
    result
}

/// Run the main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &Worker,
) -> Result<()> {
    loop {
        // Apply network results before drawing
        for event in worker.drain() {
            app.apply_worker_event(event);
        }

        app.tick(Instant::now());

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        if event::poll(FRAME_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
