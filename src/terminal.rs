//! Terminal front end for the chat widget.
//!
//! Each stdin line is typed into the input field and followed by Enter.
//! A line ending in `\` is followed by Shift+Enter instead, continuing the
//! message on the next line. End of input closes the widget once pending
//! replies have landed.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use url::Url;

use crate::widget::{
    AnsiInlineRenderer, ChatWidget, Entry, HttpReplyClient, PendingId, Transcript,
    TranscriptSurface, WidgetEvent, WidgetRuntime,
};

/// Transcript that echoes every change to a terminal.
///
/// Terminals cannot rewrite earlier lines once later output has scrolled
/// past, so a replaced placeholder is printed as a new line.
#[derive(Debug)]
pub struct TerminalSurface<W> {
    transcript: Transcript,
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            transcript: Transcript::new(),
            out,
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, entry: &Entry) {
        if let Err(e) = writeln!(self.out, "{}", entry.to_terminal()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write> TranscriptSurface for TerminalSurface<W> {
    fn append(&mut self, entry: Entry) {
        self.print(&entry);
        self.transcript.append(entry);
    }

    fn replace(&mut self, id: &PendingId, entry: Entry) -> bool {
        if !self.transcript.contains_placeholder(id) {
            return false;
        }
        self.print(&entry);
        self.transcript.replace(id, entry)
    }

    fn scroll_to_bottom(&mut self) {
        self.transcript.scroll_to_bottom();
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "Failed to flush terminal");
        }
    }
}

/// Events produced by one line of terminal input.
#[must_use]
pub fn line_events(line: &str) -> Vec<WidgetEvent> {
    let (text, key) = match line.strip_suffix('\\') {
        Some(text) => (text, WidgetEvent::shift_enter()),
        None => (line, WidgetEvent::enter()),
    };

    let mut events = Vec::with_capacity(2);
    if !text.is_empty() {
        events.push(WidgetEvent::Text(text.to_string()));
    }
    events.push(key);
    events
}

/// Chat with the reply service at `endpoint` until stdin closes.
pub async fn run(endpoint: Url) -> anyhow::Result<()> {
    info!(endpoint = %endpoint, "Starting terminal chat");

    let client = Arc::new(HttpReplyClient::new(endpoint)?);
    let widget = ChatWidget::new(TerminalSurface::new(std::io::stdout()), AnsiInlineRenderer);
    let handle = WidgetRuntime::attach(widget, client);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    'input: while let Some(line) = lines.next_line().await? {
        for event in line_events(&line) {
            if !handle.dispatch(event) {
                break 'input;
            }
        }
    }

    let widget = handle.close().await?;
    info!(
        entries = widget.transcript().transcript().len(),
        "Terminal chat closed"
    );
    Ok(())
}
