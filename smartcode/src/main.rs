//! smartcode: terminal client for an AI code review service.
//!
//! Entry point for the `smartcode` binary. Wires together configuration and
//! logging (`smartcode-core`), the account subcommands (`cli`), the terminal
//! lifecycle (`tui`), the unified event bus (`event`) and the UI (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse args, load config, start the file logger.
//! 2. Open local storage and build the API client with the stored token.
//! 3. A subcommand runs to completion without touching the terminal.
//! 4. Otherwise: load history, `install_panic_hook()`, `register_sigterm()`,
//!    `init_tui()`, spawn the event task, and run the loop.
//!
//! `restore_tui()` runs after the loop exits on every path; the loop itself
//! only leaves through `break`, never through `?`.

mod app;
mod cli;
mod dispatch;
mod event;
mod highlight;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use smartcode_core::api::ApiClient;
use smartcode_core::auth::TokenStore;
use smartcode_core::config::Config;
use smartcode_core::db::LocalStorage;
use smartcode_core::history::HistoryStore;
use smartcode_core::logging;

use crate::app::AppState;
use crate::event::AppEvent;
use crate::ui::keybindings::{self, KeyAction};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = cli::Cli::parse();

    let config = Config::load(args.api_url.as_deref());

    std::fs::create_dir_all(&config.data_dir)
        .wrap_err_with(|| format!("cannot create {}", config.data_dir.display()))?;
    logging::init(&config.data_dir)?;

    let storage = LocalStorage::open(config.db_path())
        .await
        .wrap_err("failed to open local storage")?;
    let tokens = TokenStore::new(storage.clone());
    let mut client = ApiClient::new(&config.api_url, tokens.load().await);
    tracing::info!(api_url = %config.api_url, signed_in = client.is_authenticated(), "configured");

    if let Some(cmd) = args.command {
        return cli::run(cmd, &mut client, &tokens).await;
    }

    let theme = theme::Theme::from_name(&config.theme);
    highlight::warm_up();
    let mut history = HistoryStore::load(storage).await;
    let mut state = AppState::new(history.entries().to_vec(), client.is_authenticated());

    // Innermost hook: restores the terminal before the panic message prints.
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let tx = handler.tx;
    let mut rx = handler.rx;

    let mut result = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            result = Err(e.into());
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Tick) => {
                        state.spinner_frame = state.spinner_frame.wrapping_add(1);
                    }
                    Some(AppEvent::Key(key)) => match keybindings::handle_key(key, &mut state) {
                        KeyAction::Quit => break 'event_loop,
                        KeyAction::Run(cmd) => {
                            dispatch::run(cmd, &mut state, &client, &mut history, &tx).await;
                        }
                        KeyAction::Continue => {}
                    },
                    Some(AppEvent::Mouse(mouse)) => keybindings::handle_mouse(mouse, &mut state),
                    Some(AppEvent::Paste(text)) => keybindings::handle_paste(&text, &mut state),
                    Some(AppEvent::Api(api)) => dispatch::apply(*api, &mut state, &mut history).await,
                    // ratatui picks up the new size from frame.area() on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                    Some(AppEvent::Quit) | None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    tracing::info!("smartcode exiting");
    result
}
