use crate::llm::{LlmSettings, Provider};
use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the reply service and the chat page (default)
    Serve {
        /// Address to bind
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Chat with a reply service from the terminal
    Chat {
        /// Reply service endpoint
        #[arg(long, env = "WIDGET_ENDPOINT")]
        endpoint: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub widget: WidgetConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    /// Reply service the terminal widget posts to.
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    pub store_name: String,
    /// Messages kept per conversation.
    pub history_limit: usize,
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::load_from_cli(&cli)
    }

    /// Priority: CLI flag > CLI env var > `CHAT_` env var > config file > defaults.
    pub fn load_from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 5000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("widget.endpoint", "http://127.0.0.1:5000/chat")?
            .set_default("assistant.store_name", "The Brands")?
            .set_default("assistant.history_limit", 10)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            // ./config.yaml (or .toml/.json) when present
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. CHAT_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("CHAT")
                .separator("__")
                .try_parsing(true),
        );

        match &cli.command {
            Some(Command::Serve { host, port }) => {
                if let Some(host) = host {
                    builder = builder.set_override("server.host", host.as_str())?;
                }
                if let Some(port) = port {
                    builder = builder.set_override("server.port", i64::from(*port))?;
                }
            }
            Some(Command::Chat { endpoint }) => {
                if let Some(endpoint) = endpoint {
                    builder = builder.set_override("widget.endpoint", endpoint.as_str())?;
                }
            }
            None => {}
        }

        let cfg = builder.build()?;
        let config: Self = cfg.try_deserialize()?;

        if config.assistant.history_limit == 0 {
            return Err(config::ConfigError::Message(
                "assistant.history_limit must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

/// Load LLM settings from the environment.
///
/// Returns `Ok(None)` when `LLM_BASE_URL` is unset: the assistant then
/// answers from the catalog and FAQ alone.
pub fn load_llm_settings() -> Result<Option<LlmSettings>, String> {
    let Some(base_url) = std::env::var("LLM_BASE_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
    else {
        return Ok(None);
    };

    let model = std::env::var("LLM_MODEL")
        .map_err(|_| "Missing required env var: LLM_MODEL".to_string())?;
    if model.trim().is_empty() {
        return Err("LLM_MODEL cannot be empty".to_string());
    }

    let api_key = std::env::var("LLM_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty());

    // Auto-detect provider from base URL
    let mut provider = Provider::detect_from_url(&base_url);

    if let Provider::AzureOpenAI { api_version, .. } = &provider {
        let deployment_name = std::env::var("AZURE_DEPLOYMENT_NAME")
            .map_err(|_| "Missing required env var for Azure: AZURE_DEPLOYMENT_NAME".to_string())?;
        provider = Provider::AzureOpenAI {
            deployment_name,
            api_version: std::env::var("AZURE_API_VERSION").unwrap_or_else(|_| api_version.clone()),
        };
    }

    Ok(Some(LlmSettings {
        base_url,
        api_key,
        model,
        provider,
    }))
}
