use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use riktech_core::orchestrator::CODE_LANGUAGES;
use riktech_core::{
    ChatTurns, Config, ConversationStore, FileSlot, HttpGateway, MemorySlot, Provider,
};
use tracing::{info, warn};

mod app;
mod clipboard;
mod handler;
mod highlight;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "riktech")]
#[command(version)]
#[command(about = "Terminal chat and code generation over the RikTech AI gateway")]
struct Cli {
    /// Gateway base URL serving /api/openai and /api/gemini
    #[arg(long)]
    base_url: Option<String>,

    /// Provider for chat prompts (openai or gemini)
    #[arg(short, long)]
    provider: Option<String>,

    /// Initial code generation language
    #[arg(short, long)]
    language: Option<String>,

    /// Chat history file
    #[arg(long, conflicts_with = "no_history")]
    history_file: Option<PathBuf>,

    /// Keep chat history in memory only
    #[arg(long)]
    no_history: bool,

    /// Log file (defaults to riktech.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn open_store(cli: &Cli) -> Result<ConversationStore> {
    if cli.no_history {
        return Ok(ConversationStore::open(MemorySlot::new()));
    }
    let slot = match &cli.history_file {
        Some(path) => FileSlot::new(path.clone()),
        None => FileSlot::default_location()?,
    };
    info!(path = %slot.path().display(), "chat history location");
    Ok(ConversationStore::open(slot))
}

fn resolve_language(cli: &Cli, config: &Config) -> Result<usize> {
    match &cli.language {
        Some(lang) => CODE_LANGUAGES
            .iter()
            .position(|l| l.eq_ignore_ascii_case(lang.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown language '{}'. Available: {}",
                    lang,
                    CODE_LANGUAGES.join(", ")
                )
            }),
        None => Ok(config.code_language_index()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = logging::init(cli.log_file.clone())?;
    info!(log = %log_path.display(), "RikTech AI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });

    let provider = match &cli.provider {
        Some(name) => Provider::from_str(name)
            .ok_or_else(|| anyhow!("Unknown provider '{}'. Use openai or gemini", name))?,
        None => config.provider(),
    };
    let language_idx = resolve_language(&cli, &config)?;
    let base_url = cli
        .base_url
        .clone()
        .unwrap_or_else(|| config.base_url().to_string());
    info!(%base_url, %provider, "gateway configured");

    let gateway = Arc::new(HttpGateway::new(&base_url));
    let chat = ChatTurns::new(open_store(&cli)?);
    let mut app = App::new(chat, gateway, provider, language_idx);
    app.save_settings = true;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("RikTech AI exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
        app.poll_tasks().await;
    }
    Ok(())
}
