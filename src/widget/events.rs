//! Input events delivered to the widget.

/// An event from one of the widget's DOM handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Text typed into the input field.
    Text(String),
    /// A key pressed while the input field has focus.
    KeyDown { key: Key, shift: bool },
    /// Pointer activation of the send button.
    Click,
}

impl WidgetEvent {
    /// Enter without modifiers.
    #[must_use]
    pub fn enter() -> Self {
        Self::KeyDown {
            key: Key::Enter,
            shift: false,
        }
    }

    /// Shift+Enter.
    #[must_use]
    pub fn shift_enter() -> Self {
        Self::KeyDown {
            key: Key::Enter,
            shift: true,
        }
    }

    /// Whether this event triggers a submission.
    #[must_use]
    pub fn is_submit_trigger(&self) -> bool {
        matches!(
            self,
            Self::Click
                | Self::KeyDown {
                    key: Key::Enter,
                    shift: false
                }
        )
    }
}

/// Keys the widget distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other(String),
}

/// What happened to an event.
#[derive(Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not intercepted; the field's default behaviour applied.
    Default,
    /// Intercepted as a submission. Carries the request to issue, if any.
    Submitted(Option<super::ReplyTask>),
}

impl EventOutcome {
    /// Take the request to issue, if this event produced one.
    #[must_use]
    pub fn into_task(self) -> Option<super::ReplyTask> {
        match self {
            Self::Submitted(task) => task,
            Self::Default => None,
        }
    }
}
