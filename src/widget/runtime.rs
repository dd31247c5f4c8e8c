//! Drives a [`ChatWidget`] on tokio.
//!
//! One loop task owns the widget and applies events and reply completions
//! one at a time. Each Reply Service call runs in its own task, tracked by
//! placeholder id, so it can be aborted on teardown.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    ChatWidget, InlineRenderer, PendingId, ReplyError, ReplyPayload, ReplyService, ReplyTask,
    TranscriptSurface, WidgetEvent,
};

/// Attaches widgets to a runtime loop.
#[derive(Debug)]
pub struct WidgetRuntime;

/// Listener registration returned by [`WidgetRuntime::attach`].
#[derive(Debug)]
pub struct WidgetHandle<S, R> {
    events: mpsc::UnboundedSender<WidgetEvent>,
    shutdown: CancellationToken,
    task: JoinHandle<ChatWidget<S, R>>,
}

struct Completion {
    id: PendingId,
    outcome: Result<ReplyPayload, ReplyError>,
}

impl WidgetRuntime {
    /// Start listening for events on behalf of `widget`.
    ///
    /// Must be called within a tokio runtime.
    pub fn attach<S, R, Svc>(widget: ChatWidget<S, R>, service: Arc<Svc>) -> WidgetHandle<S, R>
    where
        S: TranscriptSurface + Send + 'static,
        R: InlineRenderer + 'static,
        Svc: ReplyService + ?Sized + 'static,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_loop(widget, service, events_rx, shutdown.clone()));

        info!(name: "widget.attached", "Widget listeners attached");

        WidgetHandle {
            events: events_tx,
            shutdown,
            task,
        }
    }
}

impl<S, R> WidgetHandle<S, R> {
    /// Deliver an event. Returns `false` once the widget has been torn down.
    pub fn dispatch(&self, event: WidgetEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Stop listening and wait for in-flight replies to land.
    pub async fn close(self) -> Result<ChatWidget<S, R>, JoinError> {
        drop(self.events);
        self.task.await
    }

    /// Stop listening and abort in-flight requests.
    ///
    /// Their placeholders stay in the transcript.
    pub async fn detach(self) -> Result<ChatWidget<S, R>, JoinError> {
        self.shutdown.cancel();
        drop(self.events);
        self.task.await
    }
}

async fn run_loop<S, R, Svc>(
    mut widget: ChatWidget<S, R>,
    service: Arc<Svc>,
    mut events: mpsc::UnboundedReceiver<WidgetEvent>,
    shutdown: CancellationToken,
) -> ChatWidget<S, R>
where
    S: TranscriptSurface + Send + 'static,
    R: InlineRenderer + 'static,
    Svc: ReplyService + ?Sized + 'static,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut in_flight: HashMap<PendingId, JoinHandle<()>> = HashMap::new();
    let mut listening = true;

    loop {
        if !listening && in_flight.is_empty() {
            break;
        }

        tokio::select! {
            biased;

            () = shutdown.cancelled() => break,

            Some(done) = done_rx.recv() => {
                in_flight.remove(&done.id);
                widget.resolve(&done.id, done.outcome);
            }

            event = events.recv(), if listening => match event {
                Some(event) => {
                    if let Some(task) = widget.handle(event).into_task() {
                        let id = task.id.clone();
                        let handle = spawn_request(task, Arc::clone(&service), done_tx.clone());
                        in_flight.insert(id, handle);
                    }
                }
                None => listening = false,
            },
        }
    }

    for (id, handle) in in_flight.drain() {
        debug!(id = %id, "Aborting in-flight reply");
        handle.abort();
    }

    info!(name: "widget.detached", "Widget listeners detached");
    widget
}

fn spawn_request<Svc>(
    task: ReplyTask,
    service: Arc<Svc>,
    done: mpsc::UnboundedSender<Completion>,
) -> JoinHandle<()>
where
    Svc: ReplyService + ?Sized + 'static,
{
    tokio::spawn(async move {
        // A panicking service still has to resolve its placeholder.
        let outcome = AssertUnwindSafe(service.send(&task.message))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                warn!(id = %task.id, "Reply Service call panicked");
                Err(ReplyError::Panicked)
            });
        // The loop may already be gone after a detach.
        let _ = done.send(Completion {
            id: task.id,
            outcome,
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Entry, FAILURE_TEXT, HtmlInlineRenderer, RequestState, Transcript};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Echoes messages back, optionally after a per-message delay.
    #[derive(Debug, Default)]
    struct EchoService {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReplyService for EchoService {
        async fn send(&self, message: &str) -> Result<ReplyPayload, ReplyError> {
            self.calls.lock().unwrap().push(message.to_string());
            if let Some(ms) = message.strip_prefix("slow ") {
                tokio::time::sleep(Duration::from_millis(ms.parse().unwrap())).await;
            }
            Ok(ReplyPayload {
                reply: format!("**{message}**"),
            })
        }
    }

    #[derive(Debug)]
    struct FailingService;

    #[async_trait]
    impl ReplyService for FailingService {
        async fn send(&self, _message: &str) -> Result<ReplyPayload, ReplyError> {
            Err(ReplyError::Status(502))
        }
    }

    #[derive(Debug)]
    struct HangingService;

    #[async_trait]
    impl ReplyService for HangingService {
        async fn send(&self, _message: &str) -> Result<ReplyPayload, ReplyError> {
            std::future::pending().await
        }
    }

    fn widget() -> ChatWidget<Transcript, HtmlInlineRenderer> {
        ChatWidget::new(Transcript::new(), HtmlInlineRenderer)
    }

    #[tokio::test]
    async fn test_reply_replaces_placeholder() {
        let service = Arc::new(EchoService::default());
        let handle = WidgetRuntime::attach(widget(), Arc::clone(&service));

        handle.dispatch(WidgetEvent::Text("Hello".into()));
        handle.dispatch(WidgetEvent::enter());

        let widget = handle.close().await.unwrap();
        let entries = widget.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], Entry::user("Hello"));
        assert_eq!(entries[1], Entry::bot_markup("<strong>Hello</strong>"));
        assert_eq!(*service.calls.lock().unwrap(), vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_submission_issues_no_request() {
        let service = Arc::new(EchoService::default());
        let handle = WidgetRuntime::attach(widget(), Arc::clone(&service));

        handle.dispatch(WidgetEvent::Text("   ".into()));
        handle.dispatch(WidgetEvent::Click);

        let widget = handle.close().await.unwrap();
        assert!(widget.transcript().is_empty());
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[derive(Debug)]
    struct PanickingService;

    #[async_trait]
    impl ReplyService for PanickingService {
        async fn send(&self, _message: &str) -> Result<ReplyPayload, ReplyError> {
            panic!("service bug")
        }
    }

    #[tokio::test]
    async fn test_panicking_service_still_resolves() {
        let handle = WidgetRuntime::attach(widget(), Arc::new(PanickingService));

        handle.dispatch(WidgetEvent::Text("boom".into()));
        handle.dispatch(WidgetEvent::enter());

        let widget = handle.close().await.unwrap();
        assert_eq!(widget.transcript().entries()[1], Entry::bot_text(FAILURE_TEXT));
        assert_eq!(widget.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_replaces_placeholder() {
        let handle = WidgetRuntime::attach(widget(), Arc::new(FailingService));

        handle.dispatch(WidgetEvent::Text("test".into()));
        handle.dispatch(WidgetEvent::Click);

        let widget = handle.close().await.unwrap();
        assert_eq!(widget.transcript().entries()[1], Entry::bot_text(FAILURE_TEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replies_resolve_in_completion_order() {
        let service = Arc::new(EchoService::default());
        let handle = WidgetRuntime::attach(widget(), Arc::clone(&service));

        handle.dispatch(WidgetEvent::Text("slow 50".into()));
        handle.dispatch(WidgetEvent::enter());
        handle.dispatch(WidgetEvent::Text("slow 10".into()));
        handle.dispatch(WidgetEvent::enter());

        let widget = handle.close().await.unwrap();
        let entries = widget.transcript().entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], Entry::user("slow 50"));
        assert_eq!(entries[1], Entry::bot_markup("<strong>slow 50</strong>"));
        assert_eq!(entries[2], Entry::user("slow 10"));
        assert_eq!(entries[3], Entry::bot_markup("<strong>slow 10</strong>"));
        assert_eq!(widget.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_detach_leaves_unresolved_placeholder() {
        let handle = WidgetRuntime::attach(widget(), Arc::new(HangingService));

        handle.dispatch(WidgetEvent::Text("anyone there?".into()));
        handle.dispatch(WidgetEvent::enter());
        tokio::time::sleep(Duration::from_millis(20)).await;

        let widget = handle.detach().await.unwrap();
        let entries = widget.transcript().entries();
        assert_eq!(entries.len(), 2);
        let id = entries[1].id().cloned().unwrap();
        assert!(widget.transcript().contains_placeholder(&id));
        assert_eq!(widget.request_state(&id), Some(RequestState::Pending));
    }
}
