//! Chat widget with a storefront reply service.
//!
//! A chat widget that captures user input, shows a typing placeholder while
//! a reply is pending, and swaps in the rendered reply (or an error entry)
//! once the Reply Service answers.
//!
//! # Architecture
//!
//! - **Widget**: sans-IO controller, transcript model and inline renderers,
//!   driven on tokio by the widget runtime
//! - **Terminal**: hosts the widget on stdin/stdout
//! - **Server**: Axum reply service (`POST /chat`) and an HTMX chat page
//! - **Assistant**: catalog, FAQ and optional LLM behind the reply service
//!
//! # Modules
//!
//! - [`widget`]: controller, transcript, renderers, Reply Service client
//! - [`terminal`]: terminal front end
//! - [`assistant`]: storefront reply logic
//! - [`llm`]: OpenAI-compatible completion client
//! - [`session`]: conversation history storage

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::map_err_ignore)]

pub mod assistant;
pub mod config;
pub mod llm;
pub mod server;
pub mod session;
pub mod terminal;
pub mod ui;
pub mod widget;

use std::sync::{Arc, Mutex};

use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::widget::{HtmlInlineRenderer, PendingIdGenerator};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Storefront assistant answering messages.
    pub assistant: Arc<Assistant>,
    /// Conversation history per visitor.
    pub sessions: SessionStore,
    /// Renderer for bot entries on the chat page.
    pub renderer: HtmlInlineRenderer,
    /// Placeholder ids for the chat page.
    pub ids: Arc<Mutex<PendingIdGenerator>>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, assistant: Assistant) -> Self {
        Self {
            assistant: Arc::new(assistant),
            sessions: SessionStore::new(config.assistant.history_limit),
            renderer: HtmlInlineRenderer,
            ids: Arc::new(Mutex::new(PendingIdGenerator::new())),
            config,
        }
    }
}
