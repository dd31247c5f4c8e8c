use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tower_http::trace::TraceLayer;

use tracing::{debug, info};

use crate::AppState;
use crate::config::AppConfig;
use crate::session::Session;
use crate::ui::page;
use crate::widget::{Entry, InlineRenderer, ReplyPayload, ReplyRequest};

/// Cookie carrying the conversation id.
pub const SESSION_COOKIE: &str = "chat_session";

/// How often idle conversations are dropped.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, state: AppState) -> anyhow::Result<()> {
    // Sweep idle sessions in the background
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.cleanup_expired();
            if removed > 0 {
                debug!(removed, "Expired sessions removed");
            }
        }
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(api_chat))
        .route("/widget/send", post(widget_send))
        .route("/widget/reply", post(widget_reply))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// Resume the caller's conversation or start a new one.
///
/// Unknown ids are never adopted; a fresh session and cookie are issued.
fn session_for(state: &AppState, jar: CookieJar) -> (CookieJar, Session) {
    if let Some(session) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| state.sessions.get(c.value()))
    {
        return (jar, session);
    }

    let session = state.sessions.create();
    let cookie = Cookie::build((SESSION_COOKIE, session.id().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), session)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Chat page.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(page::index(&state.config.assistant.store_name))
}

/// POST /widget/send - User entry and reply placeholder.
///
/// Blank input produces no content, so nothing is appended.
async fn widget_send(State(state): State<AppState>, Form(req): Form<ReplyRequest>) -> Response {
    let message = req.message.trim();
    if message.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let id = state
        .ids
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next_id();
    debug!(id = %id, "Placeholder issued");

    Html(page::pending_fragment(&id, message)).into_response()
}

/// POST /widget/reply - Rendered bot entry that replaces a placeholder.
async fn widget_reply(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(req): Form<ReplyRequest>,
) -> (CookieJar, Html<String>) {
    let (jar, session) = session_for(&state, jar);
    let reply = state.assistant.reply(&session, req.message.trim()).await;
    let entry = Entry::bot_markup(state.renderer.render(&reply));
    (jar, Html(entry.to_html()))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /chat - Reply Service.
async fn api_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<ReplyRequest>,
) -> (CookieJar, Json<ReplyPayload>) {
    let (jar, session) = session_for(&state, jar);

    tracing::info!(
        session_id = %session.id(),
        chars = req.message.len(),
        "Received chat request"
    );

    let reply = state.assistant.reply(&session, &req.message).await;
    (jar, Json(ReplyPayload { reply }))
}
