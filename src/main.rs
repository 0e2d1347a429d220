use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use gridboard::app::{App, Effect, StatusLevel};
use gridboard::config::{self, Config};
use gridboard::infrastructure::opener;
use gridboard::infrastructure::runtime::{FileSource, LoaderSettings};
use gridboard::infrastructure::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
use gridboard::{input, logging, ui};

#[derive(Debug, Parser)]
#[command(
    name = "gridboard",
    version,
    about = "gridboard: a terminal dashboard with a routed table and chart"
)]
struct Args {
    /// Config file (defaults to $GRIDBOARD_CONFIG or the XDG config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial location, e.g. /reports/dailyoutput
    #[arg(long, default_value = "/")]
    route: String,

    /// JSON table payload `{ columns, rows }`
    #[arg(long)]
    table_data: Option<PathBuf>,

    /// JSON chart payload `{ labels, datasets, title? }`
    #[arg(long)]
    chart_data: Option<PathBuf>,

    /// Log file (defaults to gridboard.log in the data dir)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        // An explicit path must exist and parse.
        Some(path) => Ok(config::load_from(path)?),
        None => Ok(config::load()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(log_path) = args.log_file.clone().or_else(config::log_file_path) {
        logging::init(&log_path, &config.log_level);
    }
    tracing::info!(route = %args.route, "starting gridboard");

    let source = FileSource::new(
        args.table_data.clone().or_else(|| config.data.table.clone()),
        args.chart_data.clone().or_else(|| config.data.chart.clone()),
    );
    let settings = LoaderSettings {
        timeout: Duration::from_millis(config.load_timeout_ms),
        table_options: config.table.options(),
    };
    let runtime = RuntimeBridge::new(Arc::new(source), settings)?;

    let app = App::new(&config, &args.route);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "exited with error");
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        run_effects(&mut app);
        if app.take_dirty() {
            app.sync_context();
            terminal.draw(|f| ui::draw(f, &mut app))?;
        }
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            tracing::info!("quit");
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => input::handle_key(&mut app, key),
                Event::Mouse(mouse) => input::handle_mouse(&mut app, mouse),
                Event::Resize(_, _) => app.mark_dirty(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for (page, request_id) in app.take_load_requests() {
        if let Err(err) = runtime.send(RuntimeCommand::LoadPage { page, request_id }) {
            app.apply_page_failed(request_id, page, err.to_string());
        }
    }

    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::PageLoaded { request_id, page } => {
                app.apply_page_loaded(request_id, page)
            }
            RuntimeEvent::PageFailed {
                request_id,
                page,
                error,
            } => app.apply_page_failed(request_id, page, error),
        }
    }
}

fn run_effects(app: &mut App) {
    for effect in app.take_effects() {
        match effect {
            Effect::Copy(text) => copy_to_clipboard(app, text),
            Effect::OpenExternal(url) => open_external(app, &url),
        }
    }
}

fn copy_to_clipboard(app: &mut App, text: String) {
    use arboard::Clipboard;

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                let preview: String = text.chars().take(40).collect();
                let ellipsis = if text.chars().count() > 40 { "…" } else { "" };
                app.set_status(format!("Copied: {preview}{ellipsis}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}

fn open_external(app: &mut App, url: &str) {
    match opener::open_link(url) {
        Ok(()) => tracing::info!(url, "opened external link"),
        Err(err) => {
            tracing::warn!(url, error = %err, "failed to open external link");
            app.set_status(format!("Could not open {url}"), StatusLevel::Error);
        }
    }
}
