//! Transcript entries, placeholder ids and the transcript surface.

use std::fmt;

/// Id of the transcript container.
pub const TRANSCRIPT_ID: &str = "chat-box";

/// Id of the text input field.
pub const INPUT_ID: &str = "user-input";

/// Id of the send button.
pub const SEND_BUTTON_ID: &str = "send-button";

/// Identifier of a pending reply placeholder.
///
/// Derived from the creation timestamp (`typing-<millis>`). A sequence
/// suffix is appended when several ids are generated within the same
/// millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PendingId(String);

impl PendingId {
    /// Wrap an id received from the outside (e.g. an HTML fragment request).
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates unique, timestamp-derived placeholder ids.
#[derive(Debug, Default)]
pub struct PendingIdGenerator {
    last_millis: i64,
    collisions: u32,
}

impl PendingIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an id from the current wall clock.
    pub fn next_id(&mut self) -> PendingId {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    /// Generate an id for the given timestamp.
    ///
    /// Timestamps never move backwards: a clock that steps back reuses the
    /// last timestamp with a fresh suffix.
    pub fn next_at(&mut self, millis: i64) -> PendingId {
        if millis > self.last_millis {
            self.last_millis = millis;
            self.collisions = 0;
            PendingId(format!("typing-{millis}"))
        } else {
            self.collisions += 1;
            PendingId(format!("typing-{}-{}", self.last_millis, self.collisions))
        }
    }
}

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    You,
    Bot,
}

impl Author {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::You => "You",
            Self::Bot => "Bot",
        }
    }

    fn class(self) -> &'static str {
        match self {
            Self::You => "message user",
            Self::Bot => "message bot",
        }
    }
}

/// Body of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    /// Plain text. Always escaped on output.
    Text(String),
    /// Markup produced by an [`InlineRenderer`](super::InlineRenderer).
    Markup(String),
    /// Animated typing indicator.
    Typing,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: Option<PendingId>,
    author: Author,
    body: EntryBody,
}

impl Entry {
    /// A user-authored entry.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: None,
            author: Author::You,
            body: EntryBody::Text(text.into()),
        }
    }

    /// A bot entry carrying renderer output.
    #[must_use]
    pub fn bot_markup(markup: impl Into<String>) -> Self {
        Self {
            id: None,
            author: Author::Bot,
            body: EntryBody::Markup(markup.into()),
        }
    }

    /// A bot entry carrying plain text.
    #[must_use]
    pub fn bot_text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            author: Author::Bot,
            body: EntryBody::Text(text.into()),
        }
    }

    /// A pending reply placeholder.
    #[must_use]
    pub fn placeholder(id: PendingId) -> Self {
        Self {
            id: Some(id),
            author: Author::Bot,
            body: EntryBody::Typing,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&PendingId> {
        self.id.as_ref()
    }

    #[must_use]
    pub fn author(&self) -> Author {
        self.author
    }

    #[must_use]
    pub fn body(&self) -> &EntryBody {
        &self.body
    }

    /// Whether this entry is the placeholder for `id`.
    #[must_use]
    pub fn is_placeholder_for(&self, id: &PendingId) -> bool {
        matches!(self.body, EntryBody::Typing) && self.id.as_ref() == Some(id)
    }

    /// Render the entry as an HTML element.
    #[must_use]
    pub fn to_html(&self) -> String {
        match (&self.body, &self.id) {
            (EntryBody::Typing, Some(id)) => render_placeholder(id, &[]),
            (EntryBody::Typing, None) => render_typing_indicator(""),
            (EntryBody::Text(text), _) => format!(
                r#"<div class="{}"><strong>{}:</strong> {}</div>"#,
                self.author.class(),
                self.author.label(),
                escape_html(text)
            ),
            (EntryBody::Markup(markup), _) => format!(
                r#"<div class="{}"><strong>{}:</strong> {markup}</div>"#,
                self.author.class(),
                self.author.label(),
            ),
        }
    }

    /// Render the entry as a terminal line.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        match &self.body {
            EntryBody::Typing => format!("\x1b[2m{}: …\x1b[22m", self.author.label()),
            EntryBody::Text(text) => {
                format!("{}: {}", self.author.label(), strip_control(text))
            }
            EntryBody::Markup(markup) => format!("{}: {markup}", self.author.label()),
        }
    }
}

/// Render the typing placeholder for `id` with extra attributes.
///
/// Attribute values are escaped; names are emitted as given.
#[must_use]
pub fn render_placeholder(id: &PendingId, attrs: &[(&str, &str)]) -> String {
    let mut extra = format!(r#" id="{}""#, escape_html(id.as_str()));
    for (name, value) in attrs {
        extra.push_str(&format!(r#" {name}="{}""#, escape_html(value)));
    }
    render_typing_indicator(&extra)
}

fn render_typing_indicator(attrs: &str) -> String {
    format!(
        r#"<div{attrs} class="typing-indicator"><strong>Bot</strong> <span class="typing-dots"><span class="dot"></span><span class="dot"></span><span class="dot"></span></span></div>"#
    )
}

/// Escape text for inclusion in HTML bodies and attribute values.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Drop terminal control characters, keeping newlines and tabs.
#[must_use]
pub fn strip_control(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// The transcript container the widget mutates.
///
/// Append-only except that a placeholder may be replaced in place.
pub trait TranscriptSurface {
    /// Append an entry at the bottom.
    fn append(&mut self, entry: Entry);

    /// Replace the placeholder for `id` with `entry`.
    ///
    /// Returns `false` (and changes nothing) when no such placeholder exists.
    fn replace(&mut self, id: &PendingId, entry: Entry) -> bool;

    /// Scroll the container to its bottom.
    fn scroll_to_bottom(&mut self);
}

/// In-memory transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    at_bottom: bool,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            at_bottom: true,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the view has been scrolled to the bottom since the last append.
    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    /// Whether a placeholder with `id` is still shown.
    #[must_use]
    pub fn contains_placeholder(&self, id: &PendingId) -> bool {
        self.entries.iter().any(|e| e.is_placeholder_for(id))
    }

    /// Render the whole container.
    #[must_use]
    pub fn to_html(&self) -> String {
        let body: String = self.entries.iter().map(Entry::to_html).collect();
        format!(r#"<div id="{TRANSCRIPT_ID}">{body}</div>"#)
    }
}

impl TranscriptSurface for Transcript {
    fn append(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.at_bottom = false;
    }

    fn replace(&mut self, id: &PendingId, entry: Entry) -> bool {
        match self.entries.iter_mut().find(|e| e.is_placeholder_for(id)) {
            Some(slot) => {
                *slot = entry;
                self.at_bottom = false;
                true
            }
            None => false,
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.at_bottom = true;
    }
}
