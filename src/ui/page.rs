//! Chat page and HTMX fragments.

use serde_json::json;

use crate::widget::transcript::{INPUT_ID, SEND_BUTTON_ID, TRANSCRIPT_ID, render_placeholder};
use crate::widget::{Entry, FAILURE_TEXT, PendingId};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

/// Generate the HTML shell for the application.
fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <script src="{HTMX_SRC}"></script>
    <style>{STYLES}</style>
</head>
<body>
    {content}
</body>
</html>"#
    )
}

const STYLES: &str = r"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;background:#f4f4f5;color:#18181b;height:100vh;display:flex;flex-direction:column;align-items:center;justify-content:center}
.chat{width:min(640px,100%);height:min(720px,100vh);display:flex;flex-direction:column;background:#fff;border-radius:16px;box-shadow:0 8px 24px #0002;overflow:hidden}
.chat h1{font-size:16px;padding:16px 20px;border-bottom:1px solid #e4e4e7}
#chat-box{flex:1;overflow-y:auto;padding:20px;display:flex;flex-direction:column;gap:10px;font-size:14px;line-height:1.5}
.message{word-wrap:break-word}
.message.user{align-self:flex-end;background:#eef2ff;padding:8px 12px;border-radius:12px}
.message.bot{align-self:flex-start}
.typing-indicator{align-self:flex-start;display:flex;align-items:center;gap:6px;color:#71717a}
.typing-dots{display:inline-flex;gap:3px}
.typing-dots .dot{width:6px;height:6px;border-radius:50%;background:#a1a1aa;animation:blink 1.4s infinite both}
.typing-dots .dot:nth-child(2){animation-delay:.2s}
.typing-dots .dot:nth-child(3){animation-delay:.4s}
@keyframes blink{0%,80%,100%{opacity:.2}40%{opacity:1}}
.input-bar{display:flex;gap:8px;padding:16px 20px;border-top:1px solid #e4e4e7}
.input-bar textarea{flex:1;padding:10px 14px;border:1px solid #d4d4d8;border-radius:8px;font:inherit;resize:none}
.input-bar button{padding:10px 20px;border:none;border-radius:8px;background:#4f46e5;color:#fff;font-weight:600;cursor:pointer}
";

/// The chat page.
#[must_use]
pub fn index(store_name: &str) -> String {
    let title = crate::widget::transcript::escape_html(store_name);
    let content = format!(
        r##"<main class="chat">
        <h1>{title}</h1>
        <div id="{TRANSCRIPT_ID}" aria-live="polite"
             hx-on::after-settle="this.scrollTop = this.scrollHeight"></div>
        <form class="input-bar"
              hx-post="/widget/send"
              hx-trigger="click from:#{SEND_BUTTON_ID}, keydown[key=='Enter'&&!shiftKey] from:#{INPUT_ID}"
              hx-target="#{TRANSCRIPT_ID}"
              hx-swap="beforeend scroll:bottom"
              hx-on::after-request="if (event.detail.xhr.status === 200) this.reset()">
            <textarea id="{INPUT_ID}" name="message" rows="1" placeholder="Type your message..."
                      hx-on:keydown="if (event.key === 'Enter' && !event.shiftKey) event.preventDefault()"></textarea>
            <button id="{SEND_BUTTON_ID}" type="button">Send</button>
        </form>
    </main>"##
    );
    html_shell(&title, &content)
}

/// User entry followed by a placeholder that fetches its own reply.
///
/// A transport or server error swaps in the failure entry carried on the
/// placeholder.
#[must_use]
pub fn pending_fragment(id: &PendingId, message: &str) -> String {
    let vals = json!({ "message": message }).to_string();
    let fallback = Entry::bot_text(FAILURE_TEXT).to_html();
    let swap_fallback = format!(
        "const box = htmx.find('#{TRANSCRIPT_ID}'); \
         this.outerHTML = this.dataset.fallback; \
         box.scrollTop = box.scrollHeight"
    );
    let placeholder = render_placeholder(
        id,
        &[
            ("hx-post", "/widget/reply"),
            ("hx-trigger", "load"),
            ("hx-swap", "outerHTML"),
            ("hx-vals", &vals),
            ("data-fallback", &fallback),
            ("hx-on::send-error", &swap_fallback),
            ("hx-on::response-error", &swap_fallback),
        ],
    );
    format!("{}{placeholder}", Entry::user(message).to_html())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_exposes_widget_handles() {
        let html = index("The Brands");
        assert!(html.contains(r#"id="user-input""#));
        assert!(html.contains(r#"id="send-button""#));
        assert!(html.contains(r#"id="chat-box""#));
        assert!(html.contains("keydown[key=='Enter'&&!shiftKey]"));
    }

    #[test]
    fn test_index_escapes_title() {
        assert!(index("<b>Shop</b>").contains("&lt;b&gt;Shop&lt;/b&gt;"));
    }

    #[test]
    fn test_pending_fragment() {
        let id = PendingId::from_raw("typing-7");
        let html = pending_fragment(&id, r#"<i>"quoted"</i>"#);

        assert!(html.starts_with(r#"<div class="message user">"#));
        assert!(html.contains("&lt;i&gt;&quot;quoted&quot;&lt;/i&gt;"));
        assert!(html.contains(r#"id="typing-7""#));
        assert!(html.contains(r#"hx-trigger="load""#));
        assert!(html.contains("data-fallback=\"&lt;div class=&quot;message bot&quot;&gt;"));
        assert!(!html.contains("<i>"));
    }

    #[test]
    fn test_fallback_swap_scrolls_transcript() {
        let html = pending_fragment(&PendingId::from_raw("typing-8"), "hi");
        assert!(html.contains(
            "hx-on::send-error=\"const box = htmx.find(&#39;#chat-box&#39;); \
             this.outerHTML = this.dataset.fallback; box.scrollTop = box.scrollHeight\""
        ));
        assert!(html.contains("hx-on::response-error=\"const box"));
    }
}
