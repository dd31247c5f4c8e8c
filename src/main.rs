//! Chat widget server and terminal client.
//!
//! `chat-widget serve` (the default) runs the reply service and chat page;
//! `chat-widget chat` talks to a reply service from the terminal.

#![allow(clippy::map_err_ignore)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};
use url::Url;

use chat_widget::AppState;
use chat_widget::assistant::{Assistant, catalog::Catalog};
use chat_widget::config::{AppConfig, Cli, Command, load_llm_settings};
use chat_widget::llm::ChatCompletionsDriver;
use chat_widget::{server, terminal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    let cli = Cli::parse();
    let in_terminal = matches!(cli.command, Some(Command::Chat { .. }));
    init_tracing(cli.log_json, in_terminal);

    let config = Arc::new(AppConfig::load_from_cli(&cli).context("Failed to load configuration")?);

    if in_terminal {
        let endpoint = Url::parse(&config.widget.endpoint)
            .with_context(|| format!("Invalid widget endpoint: {}", config.widget.endpoint))?;
        return terminal::run(endpoint).await;
    }

    let store_name = config.assistant.store_name.clone();
    let mut assistant = Assistant::new(Catalog::seeded(), store_name.clone());

    match load_llm_settings().map_err(anyhow::Error::msg)? {
        Some(settings) => {
            info!(
                name: "llm.config.loaded",
                base_url = %settings.base_url,
                model = %settings.model,
                "LLM configuration loaded"
            );
            assistant = assistant.with_llm(Arc::new(ChatCompletionsDriver::new(settings, store_name)));
        }
        None => {
            info!(name: "llm.config.absent", "LLM_BASE_URL not set, replying offline");
        }
    }

    let state = AppState::new(Arc::clone(&config), assistant);
    server::start_server(config, state).await
}

/// Initialize tracing (M-LOG-STRUCTURED).
///
/// The terminal front end owns stdout, so its logs go to stderr at `warn`.
fn init_tracing(json: bool, in_terminal: bool) {
    let (writer, default_level) = if in_terminal {
        (BoxMakeWriter::new(std::io::stderr), "warn")
    } else {
        (BoxMakeWriter::new(std::io::stdout), "info")
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(writer))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(writer))
            .init();
    }
}
