//! Chat widget controller.
//!
//! The controller mediates between input events and the Reply Service while
//! keeping the transcript consistent. It performs no I/O itself: a
//! submission returns a [`ReplyTask`] that the host executes (see
//! [`runtime::WidgetRuntime`]), and the outcome is fed back through
//! [`ChatWidget::resolve`].
//!
//! # Request lifecycle
//!
//! `Idle → Pending (placeholder shown) → Resolved | Failed`
//!
//! Every submission gets its own placeholder id. Placeholders resolve
//! independently, so bot entries appear in completion order while user
//! entries appear in submission order.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::widget::{ChatWidget, HtmlInlineRenderer, ReplyPayload, Transcript};
//!
//! let mut widget = ChatWidget::new(Transcript::new(), HtmlInlineRenderer);
//! let task = widget.submit("Hello").unwrap();
//! assert_eq!(widget.transcript().len(), 2);
//!
//! widget.resolve(&task.id, Ok(ReplyPayload { reply: "**Hi there**".into() }));
//! assert!(widget.transcript().to_html().contains("<strong>Hi there</strong>"));
//! ```

pub mod events;
pub mod render;
pub mod reply;
pub mod runtime;
pub mod transcript;

use std::collections::HashMap;

pub use events::{EventOutcome, Key, WidgetEvent};
pub use render::{AnsiInlineRenderer, HtmlInlineRenderer, InlineRenderer};
pub use reply::{HttpReplyClient, ReplyError, ReplyPayload, ReplyRequest, ReplyService};
pub use runtime::{WidgetHandle, WidgetRuntime};
pub use transcript::{
    Author, Entry, EntryBody, PendingId, PendingIdGenerator, Transcript, TranscriptSurface,
};

use tracing::{debug, warn};

/// Text shown when a reply could not be obtained.
pub const FAILURE_TEXT: &str = "Couldn't connect to server.";

/// A Reply Service call to issue on behalf of a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTask {
    /// Placeholder awaiting this reply.
    pub id: PendingId,
    /// Trimmed outbound message.
    pub message: String,
}

/// State of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Resolved,
    Failed,
}

/// The chat widget controller.
///
/// Owns the input field value and the transcript surface.
#[derive(Debug)]
pub struct ChatWidget<S, R> {
    input: String,
    transcript: S,
    renderer: R,
    ids: PendingIdGenerator,
    requests: HashMap<PendingId, RequestState>,
}

impl<S, R> ChatWidget<S, R>
where
    S: TranscriptSurface,
    R: InlineRenderer,
{
    #[must_use]
    pub fn new(transcript: S, renderer: R) -> Self {
        Self {
            input: String::new(),
            transcript,
            renderer,
            ids: PendingIdGenerator::new(),
            requests: HashMap::new(),
        }
    }

    /// Current value of the input field.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn transcript(&self) -> &S {
        &self.transcript
    }

    /// Give up the controller and keep the transcript.
    #[must_use]
    pub fn into_transcript(self) -> S {
        self.transcript
    }

    /// State of the request behind `id`, if it was issued by this widget.
    #[must_use]
    pub fn request_state(&self, id: &PendingId) -> Option<RequestState> {
        self.requests.get(id).copied()
    }

    /// Number of requests still awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.requests
            .values()
            .filter(|s| **s == RequestState::Pending)
            .count()
    }

    /// Handle an event from the input field or the send button.
    pub fn handle(&mut self, event: WidgetEvent) -> EventOutcome {
        if event.is_submit_trigger() {
            let raw = self.input.clone();
            return EventOutcome::Submitted(self.submit(&raw));
        }

        match event {
            WidgetEvent::Text(text) => self.input.push_str(&text),
            // Shift+Enter falls through to the field: a line break.
            WidgetEvent::KeyDown {
                key: Key::Enter, ..
            } => self.input.push('\n'),
            WidgetEvent::KeyDown { .. } | WidgetEvent::Click => {}
        }
        EventOutcome::Default
    }

    /// Submit the raw field value.
    ///
    /// Returns `None` without touching anything when the trimmed value is
    /// empty. Otherwise appends the user entry and a placeholder, clears the
    /// field, and returns the call to issue.
    pub fn submit(&mut self, raw: &str) -> Option<ReplyTask> {
        let message = raw.trim();
        if message.is_empty() {
            return None;
        }
        let message = message.to_string();

        self.transcript.append(Entry::user(message.clone()));
        self.input.clear();
        self.transcript.scroll_to_bottom();

        let id = self.ids.next_id();
        self.transcript.append(Entry::placeholder(id.clone()));
        self.transcript.scroll_to_bottom();

        self.requests.insert(id.clone(), RequestState::Pending);
        debug!(id = %id, chars = message.len(), "Reply requested");

        Some(ReplyTask { id, message })
    }

    /// Apply the outcome of the call behind `id`.
    ///
    /// Returns whether the placeholder was replaced.
    pub fn resolve(&mut self, id: &PendingId, outcome: Result<ReplyPayload, ReplyError>) -> bool {
        match outcome {
            Ok(payload) => self.on_reply_success(id, &payload),
            Err(error) => self.on_reply_failure(id, &error),
        }
    }

    /// Replace the placeholder with the rendered reply.
    ///
    /// A no-op when the placeholder is gone.
    pub fn on_reply_success(&mut self, id: &PendingId, payload: &ReplyPayload) -> bool {
        let entry = Entry::bot_markup(self.renderer.render(&payload.reply));
        self.finish(id, entry, RequestState::Resolved)
    }

    /// Replace the placeholder with the fixed failure text.
    ///
    /// A no-op when the placeholder is gone.
    pub fn on_reply_failure(&mut self, id: &PendingId, error: &ReplyError) -> bool {
        warn!(
            name: "widget.reply.failed",
            id = %id,
            error = %error,
            "Reply service unreachable"
        );
        self.finish(id, Entry::bot_text(FAILURE_TEXT), RequestState::Failed)
    }

    fn finish(&mut self, id: &PendingId, entry: Entry, state: RequestState) -> bool {
        let replaced = self.transcript.replace(id, entry);
        if replaced {
            self.requests.insert(id.clone(), state);
        } else {
            debug!(id = %id, "Placeholder already resolved");
        }
        self.transcript.scroll_to_bottom();
        replaced
    }
}
