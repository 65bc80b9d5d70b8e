//! wodcast player
//!
//! Full-screen terminal client for a shared workout queue. The server owns
//! the "what plays next" cursor; this client shows whichever workout is
//! currently selected, plays its video through mpv, and feeds its own
//! remote-control input (and end-of-video auto-advance) back into the
//! server-side cursor.
//!
//! ## Keys
//!
//! - ←/p: previous workout
//! - →/n: next workout
//! - Space: play/pause (local only)
//! - q / Ctrl-C: quit

mod app;
mod mpv;
mod setup;
mod ui;

use std::io::stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;
use wodcast_core::{
    ApiClient, Config, Gateway, PlaybackEngine, PlaybackHandle, PushClient, SimRenderer,
};

use app::App;

#[derive(Parser)]
#[command(name = "wodcast")]
#[command(about = "Display client for a shared workout queue")]
#[command(version)]
struct Cli {
    /// Server URL (overrides the saved configuration)
    #[arg(long)]
    server: Option<String>,

    /// Select this workout group after connecting
    #[arg(long)]
    group: Option<i64>,

    /// Run without spawning the video player
    #[arg(long)]
    no_video: bool,

    /// Print the workout group catalog and exit
    #[arg(long)]
    list_groups: bool,

    /// Forget the saved server and run first-time setup again
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    init_logging(&config)?;

    if cli.reset {
        config.reset();
        config.save()?;
    }

    if cli.list_groups {
        return list_groups(&cli, &config).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run(&mut terminal, cli, config).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

/// Log to a file so the TUI owns the terminal
fn init_logging(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", config.data_dir))?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
        .with_context(|| format!("Failed to open log file: {:?}", config.log_path()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run<B: Backend>(terminal: &mut Terminal<B>, cli: Cli, mut config: Config) -> Result<()> {
    // Resolve the server address, running first-time setup if needed
    let server_url = match &cli.server {
        Some(url) => setup::normalize_server_url(url),
        None => match configured_server(&config) {
            Some(url) => url,
            None => match setup::run(terminal, &mut config).await? {
                Some(url) => url,
                None => return Ok(()), // user backed out of setup
            },
        },
    };

    let gateway = Arc::new(ApiClient::new(&server_url));
    let (engine, handle) = if cli.no_video {
        PlaybackEngine::new(gateway, |inbox| Box::new(SimRenderer::new(inbox)))
    } else {
        PlaybackEngine::new(gateway, |inbox| Box::new(mpv::MpvRenderer::new(inbox)))
    };

    let mut push = PushClient::new(&server_url, handle.inbox());
    push.connect();

    tokio::spawn(engine.run());
    handle.bootstrap();
    if let Some(group_id) = cli.group {
        handle.select_group(group_id);
    }

    let mut app = App::new(handle.subscribe(), push.subscribe());
    let result = run_app(terminal, &mut app, &handle);

    handle.shutdown();
    push.disconnect();
    result
}

fn configured_server(config: &Config) -> Option<String> {
    if config.setup_complete {
        config.server_url.clone()
    } else {
        None
    }
}

/// Print the group catalog, for picking a `--group` id
async fn list_groups(cli: &Cli, config: &Config) -> Result<()> {
    let server_url = match (&cli.server, configured_server(config)) {
        (Some(url), _) => setup::normalize_server_url(url),
        (None, Some(url)) => url,
        (None, None) => anyhow::bail!("No server configured. Pass --server or run setup first."),
    };

    let gateway = ApiClient::new(&server_url);
    for group in gateway.groups().await? {
        println!("{:>4}  {} ({} workouts)", group.id, group.name, group.workouts.len());
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    handle: &PlaybackHandle,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Handle events
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match key.code {
                    // Quit
                    KeyCode::Char('q') => {
                        app.should_quit = true;
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.should_quit = true;
                    }

                    // Navigation
                    KeyCode::Left | KeyCode::Char('p') => {
                        handle.previous();
                    }
                    KeyCode::Right | KeyCode::Char('n') => {
                        handle.next();
                    }

                    // Play/pause, purely local
                    KeyCode::Char(' ') => {
                        handle.toggle_play_pause();
                    }

                    _ => {}
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
