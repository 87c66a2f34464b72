//! Terminal host for SDUI screens.
//!
//! Drives a [`ScreenSession`] against a live BFF and draws the rendered
//! tree with ratatui. Logs go to a file so the alternate screen stays
//! clean.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sdui::adapters::{ChannelNavigator, ReqwestHttpClient};
use sdui::bff::BffClient;
use sdui::cli::{parse_args, run_cli_command, CliCommand, CliOptions};
use sdui::config::AppConfig;
use sdui::models::{NavigationRequest, TextCatalog};
use sdui::session::ScreenSession;
use sdui::terminal::{setup_panic_hook, TerminalManager};
use sdui::ui::{render_screen, UiState};

const LOG_FILE_ENV: &str = "SDUI_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "sdui.log";

/// Redraw cadence for spinners.
const TICK: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let command = parse_args(std::env::args())?;
    let options = match &command {
        CliCommand::Run(options) | CliCommand::Health(options) => options.clone(),
        _ => CliOptions::default(),
    };
    let config = options.apply(AppConfig::from_env());
    if let Some(result) = run_cli_command(&command, &config).await {
        return result;
    }
    config.validate()?;

    init_logging()?;
    info!("Starting sdui {} against {}", sdui::cli::VERSION, config.base_url);

    let http = ReqwestHttpClient::with_timeout(config.request_timeout)?;
    let mut client = BffClient::with_http_client(config.base_url.clone(), Arc::new(http));
    if let Some(key) = &config.api_key {
        client = client.with_api_key(key.clone());
    }

    match client.health_check().await {
        Ok(true) => info!("BFF is healthy"),
        Ok(false) => warn!("BFF health check returned an error status"),
        Err(e) => warn!("BFF health check failed: {}", e),
    }

    let texts = load_texts(&config, &client).await?;

    let (navigator, mut navigation_rx) = ChannelNavigator::new();
    let mut session = ScreenSession::new(client, navigator, texts, &config);
    session.activate(config.initial_screen.clone(), None);

    setup_panic_hook();
    let mut manager = TerminalManager::new()?;
    let result = run_host(manager.terminal(), &mut session, &mut navigation_rx).await;
    manager.restore()?;

    info!("sdui exiting");
    result
}

fn init_logging() -> Result<()> {
    let path = std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| eyre!("failed to initialize logging: {}", e))
}

/// Local catalog from disk, overlaid with the BFF's admin catalog when an
/// API key is configured.
async fn load_texts(config: &AppConfig, client: &BffClient) -> Result<TextCatalog> {
    let mut texts = match &config.texts_path {
        Some(path) => TextCatalog::load(path)?,
        None => TextCatalog::new(),
    };
    if config.api_key.is_some() {
        match client.fetch_texts().await {
            Ok(remote) => texts.merge_remote(&remote),
            Err(e) => warn!("Using local texts only: {}", e),
        }
    }
    Ok(texts)
}

async fn run_host(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut ScreenSession,
    navigation_rx: &mut UnboundedReceiver<NavigationRequest>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);
    let mut ui = UiState::default();

    loop {
        let view = session.view();
        let buttons = view.buttons().len();
        ui.clamp(buttons);
        terminal.draw(|frame| render_screen(frame, &view, &ui))?;

        tokio::select! {
            _ = ticker.tick() => ui.advance(),

            Some(event) = session.next_event() => session.handle(event),

            Some(request) = navigation_rx.recv() => {
                ui = UiState::default();
                session.activate(request.screen, request.params);
            }

            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Tab | KeyCode::Down | KeyCode::Right => ui.focus_next(buttons),
                    KeyCode::BackTab | KeyCode::Up | KeyCode::Left => ui.focus_prev(buttons),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(button) = ui.focused(&view).cloned() {
                            button.press(session);
                        }
                    }
                    _ => {}
                },
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}
