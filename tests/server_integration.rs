use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chat_widget::AppState;
use chat_widget::assistant::{APOLOGY, Assistant, Catalog};
use chat_widget::config::{AppConfig, AssistantConfig, ServerConfig, WidgetConfig};
use chat_widget::llm::{LlmDriver, LlmError, Message};
use chat_widget::server::{SESSION_COOKIE, build_router};
use chat_widget::widget::{
    Author, ChatWidget, EntryBody, HtmlInlineRenderer, HttpReplyClient, Transcript, WidgetEvent,
    WidgetRuntime,
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Replies with the number of messages it was given.
#[derive(Debug)]
struct CountingLlm;

#[async_trait]
impl LlmDriver for CountingLlm {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        Ok(format!("**turns={}**", messages.len()))
    }
}

#[derive(Debug)]
struct BrokenLlm;

#[async_trait]
impl LlmDriver for BrokenLlm {
    async fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
        Err(LlmError::EmptyCompletion)
    }
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        widget: WidgetConfig {
            endpoint: "http://127.0.0.1:5000/chat".to_string(),
        },
        assistant: AssistantConfig {
            store_name: "The Brands".to_string(),
            history_limit: 10,
        },
    })
}

fn offline_state() -> AppState {
    AppState::new(test_config(), Assistant::new(Catalog::seeded(), "The Brands"))
}

fn state_with(llm: Arc<dyn LlmDriver>) -> AppState {
    let assistant = Assistant::new(Catalog::seeded(), "The Brands").with_llm(llm);
    AppState::new(test_config(), assistant)
}

fn json_request(body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .expect("ascii");
    let pair = set_cookie.split(';').next().expect("cookie pair");
    assert!(pair.starts_with(SESSION_COOKIE));
    pair.to_string()
}

#[tokio::test]
async fn test_index_page() {
    let app = build_router(offline_state());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<title>The Brands</title>"));
    assert!(html.contains(r#"hx-post="/widget/send""#));
}

#[tokio::test]
async fn test_chat_returns_reply_field() {
    let app = build_router(offline_state());
    let response = app
        .oneshot(json_request(&json!({ "message": "Tell me about the smart watch 110" }), None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let _ = session_cookie(&response);
    let payload: Value = serde_json::from_str(&body_string(response).await).expect("json");
    let reply = payload["reply"].as_str().expect("reply string");
    assert!(reply.contains("Product: Smart Watch 110"));
    assert!(reply.contains("Rs 1999.99"));
}

#[tokio::test]
async fn test_chat_rejects_malformed_body() {
    let app = build_router(offline_state());
    let response = app
        .oneshot(json_request(&json!({ "text": "hi" }), None))
        .await
        .expect("response");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_chat_keeps_history_per_cookie() {
    let app = build_router(state_with(Arc::new(CountingLlm)));

    let first = app
        .clone()
        .oneshot(json_request(&json!({ "message": "hello" }), None))
        .await
        .expect("response");
    let cookie = session_cookie(&first);
    let payload: Value = serde_json::from_str(&body_string(first).await).expect("json");
    // system + user
    assert_eq!(payload["reply"], "**turns=2**");

    let second = app
        .clone()
        .oneshot(json_request(&json!({ "message": "again" }), Some(&cookie)))
        .await
        .expect("response");
    assert!(second.headers().get(header::SET_COOKIE).is_none());
    let payload: Value = serde_json::from_str(&body_string(second).await).expect("json");
    // system + user + assistant + user
    assert_eq!(payload["reply"], "**turns=4**");

    // Unknown ids start over
    let stranger = app
        .oneshot(json_request(
            &json!({ "message": "hi" }),
            Some(&format!("{SESSION_COOKIE}=not-a-session")),
        ))
        .await
        .expect("response");
    let _ = session_cookie(&stranger);
    let payload: Value = serde_json::from_str(&body_string(stranger).await).expect("json");
    assert_eq!(payload["reply"], "**turns=2**");
}

#[tokio::test]
async fn test_chat_model_failure_apologizes() {
    let app = build_router(state_with(Arc::new(BrokenLlm)));
    let response = app
        .oneshot(json_request(&json!({ "message": "hello" }), None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload: Value = serde_json::from_str(&body_string(response).await).expect("json");
    assert_eq!(payload["reply"], APOLOGY);
}

#[tokio::test]
async fn test_widget_send_blank_is_no_content() {
    let app = build_router(offline_state());
    let response = app
        .oneshot(form_request("/widget/send", "message=+%0A+"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn test_widget_send_appends_entry_and_placeholder() {
    let app = build_router(offline_state());
    let response = app
        .oneshot(form_request("/widget/send", "message=++%3Cb%3Ehi%3C%2Fb%3E++"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.starts_with(r#"<div class="message user"><strong>You:</strong> &lt;b&gt;hi&lt;/b&gt;</div>"#));
    assert!(html.contains(r#"class="typing-indicator""#));
    assert!(html.contains(r#"id="typing-"#));
    assert!(html.contains(r#"hx-post="/widget/reply""#));
}

#[tokio::test]
async fn test_widget_reply_renders_markup() {
    let app = build_router(state_with(Arc::new(CountingLlm)));
    let response = app
        .oneshot(form_request("/widget/reply", "message=hello"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let _ = session_cookie(&response);
    let html = body_string(response).await;
    assert_eq!(
        html,
        r#"<div class="message bot"><strong>Bot:</strong> <strong>turns=2</strong></div>"#
    );
}

#[tokio::test]
async fn test_widget_against_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = build_router(state_with(Arc::new(CountingLlm)));
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let endpoint = url::Url::parse(&format!("http://{addr}/chat")).expect("url");
    let client = Arc::new(HttpReplyClient::new(endpoint).expect("client"));
    let handle = WidgetRuntime::attach(
        ChatWidget::new(Transcript::new(), HtmlInlineRenderer),
        client,
    );

    handle.dispatch(WidgetEvent::Text("hello".to_string()));
    handle.dispatch(WidgetEvent::enter());
    handle.dispatch(WidgetEvent::Text("   ".to_string()));
    handle.dispatch(WidgetEvent::Click);

    let widget = handle.close().await.expect("widget");
    let entries = widget.transcript().entries();
    assert_eq!(widget.input(), "   ");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].author(), Author::You);
    assert_eq!(
        entries[1].body(),
        &EntryBody::Markup("<strong>turns=2</strong>".to_string())
    );

    // Reattach the same widget
    let client = Arc::new(
        HttpReplyClient::new(url::Url::parse(&format!("http://{addr}/chat")).expect("url"))
            .expect("client"),
    );
    let handle = WidgetRuntime::attach(widget, client);
    handle.dispatch(WidgetEvent::Text("first".to_string()));
    handle.dispatch(WidgetEvent::enter());
    let widget = handle.close().await.expect("widget");
    assert_eq!(widget.transcript().len(), 4);

    server.abort();
}
