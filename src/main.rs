//! StayHub - a terminal client for managing short-term rentals.
//!
//! Runs the interactive TUI by default, or a single command given on the
//! command line.

mod api;
mod app;
mod cli;
mod clipboard;
mod config;
mod error;
mod events;
mod format;
mod logging;
mod stats;
mod table;
mod tasks;
mod ui;

use std::io::{self, Stdout};

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use crate::api::{Session, StayHubClient};
use crate::app::App;
use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::error::AppError;
use crate::events::EventHandler;
use crate::tasks::create_task_channel;
use crate::ui::theme::Theme;

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_guard = match logging::init(cli.debug) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load settings")?;

    let client = StayHubClient::new(&settings, Session::load())?;

    let result = match cli.command {
        None | Some(Command::Tui) => run_tui(&settings, client).await,
        Some(command) => cli::run(command, client).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "Exiting with error");
        if let Some(guard) = &log_guard {
            eprintln!("Logs: {}", guard.directory().display());
        }
    }
    logging::shutdown();
    result
}

fn setup_terminal() -> Result<Tui, AppError> {
    enable_raw_mode().map_err(|e| AppError::terminal(e.to_string()))?;
    execute!(io::stdout(), EnterAlternateScreen)
        .map_err(|e| AppError::terminal(e.to_string()))?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
        .map_err(|e| AppError::terminal(e.to_string()))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Restore the terminal before the default panic output.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));
}

async fn run_tui(settings: &Settings, client: StayHubClient) -> anyhow::Result<()> {
    if !client.is_authenticated() {
        bail!("not signed in. Run 'stayhub login' first");
    }
    ui::init_theme(Theme::dark());
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    info!("TUI started");

    let result = event_loop(&mut terminal, settings, client).await;

    restore_terminal().context("failed to restore terminal")?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    settings: &Settings,
    client: StayHubClient,
) -> anyhow::Result<()> {
    let (mut rx, spawner) = create_task_channel();
    let events = EventHandler::new();
    let mut app = App::new(settings);

    for command in app.init() {
        spawner.dispatch(&client, command);
    }

    while !app.should_quit() {
        terminal.draw(|frame| app.view(frame))?;

        let event = tokio::task::block_in_place(|| events.next())?;
        for command in app.update(event) {
            spawner.dispatch(&client, command);
        }

        while let Ok(message) = rx.try_recv() {
            for command in app.handle_api_message(message) {
                spawner.dispatch(&client, command);
            }
        }
    }

    info!("TUI stopped");
    Ok(())
}
