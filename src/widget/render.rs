//! Inline renderers for bot replies.
//!
//! Replies are a single inline markdown-like string. Block structure is
//! flattened into line breaks, raw HTML is shown as text, and links with
//! script-capable schemes are reduced to their label.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

use super::transcript::strip_control;

/// Turns a lightweight-markup reply into display-safe markup.
pub trait InlineRenderer: Send + Sync + std::fmt::Debug {
    /// Render `source`. The output must be safe to display as-is.
    fn render(&self, source: &str) -> String;
}

/// Renders inline markdown to HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlInlineRenderer;

impl InlineRenderer for HtmlInlineRenderer {
    fn render(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + source.len() / 2);
        pulldown_cmark::html::push_html(&mut out, inline_events(source).into_iter());
        out
    }
}

/// Renders inline markdown to ANSI-styled terminal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiInlineRenderer;

impl InlineRenderer for AnsiInlineRenderer {
    fn render(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut link_dest: Vec<String> = Vec::new();

        for event in inline_events(source) {
            match event {
                Event::Start(Tag::Strong) => out.push_str("\x1b[1m"),
                Event::End(TagEnd::Strong) => out.push_str("\x1b[22m"),
                Event::Start(Tag::Emphasis) => out.push_str("\x1b[3m"),
                Event::End(TagEnd::Emphasis) => out.push_str("\x1b[23m"),
                Event::Start(Tag::Strikethrough) => out.push_str("\x1b[9m"),
                Event::End(TagEnd::Strikethrough) => out.push_str("\x1b[29m"),
                Event::Start(Tag::Link { dest_url, .. }) => {
                    link_dest.push(dest_url.to_string());
                    out.push_str("\x1b[4m");
                }
                Event::End(TagEnd::Link) => {
                    out.push_str("\x1b[24m");
                    if let Some(dest) = link_dest.pop() {
                        out.push_str(&format!(" <{}>", strip_control(&dest)));
                    }
                }
                Event::Code(code) => {
                    out.push_str("\x1b[36m");
                    out.push_str(&strip_control(&code));
                    out.push_str("\x1b[39m");
                }
                Event::Text(text) => out.push_str(&strip_control(&text)),
                Event::SoftBreak | Event::HardBreak => out.push('\n'),
                _ => {}
            }
        }
        out
    }
}

fn is_safe_link(dest: &str) -> bool {
    let lower = dest.trim_start().to_ascii_lowercase();
    !(lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("data:"))
}

/// Parse `source` and keep only inline events.
///
/// Block boundaries become hard breaks; raw HTML becomes text.
fn inline_events(source: &str) -> Vec<Event<'_>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut events = Vec::new();
    let mut pending_break = false;
    let mut dropped_link = false;

    for event in Parser::new_ext(source, options) {
        let keep = match event {
            Event::Start(Tag::Emphasis | Tag::Strong | Tag::Strikethrough)
            | Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough) => Some(event),
            Event::Start(Tag::Link { ref dest_url, .. }) => {
                if is_safe_link(dest_url) {
                    Some(event)
                } else {
                    dropped_link = true;
                    None
                }
            }
            Event::End(TagEnd::Link) => {
                if dropped_link {
                    dropped_link = false;
                    None
                } else {
                    Some(event)
                }
            }
            // Images show their alt text only.
            Event::Start(Tag::Image { .. }) | Event::End(TagEnd::Image) => None,
            Event::Text(_) | Event::Code(_) | Event::HardBreak => Some(event),
            // Replies are chat text: a newline is a line break.
            Event::SoftBreak => Some(Event::HardBreak),
            Event::Start(Tag::Item) => Some(Event::Text(CowStr::Borrowed("• "))),
            Event::Html(html) | Event::InlineHtml(html) => Some(Event::Text(html)),
            Event::InlineMath(math) | Event::DisplayMath(math) => Some(Event::Text(math)),
            Event::TaskListMarker(done) => Some(Event::Text(CowStr::Borrowed(if done {
                "[x] "
            } else {
                "[ ] "
            }))),
            Event::End(_) | Event::Rule => {
                pending_break = !events.is_empty();
                None
            }
            _ => None,
        };

        if let Some(event) = keep {
            if pending_break {
                events.push(Event::HardBreak);
                pending_break = false;
            }
            events.push(event);
        }
    }

    // A trailing newline inside a code block has no inline meaning.
    while matches!(events.last(), Some(Event::SoftBreak | Event::HardBreak)) {
        events.pop();
    }
    events
}
