//! HTML served to browsers.
//!
//! The page exposes the widget's DOM surface (`user-input`, `send-button`,
//! `chat-box`) and uses HTMX to append server-rendered transcript entries.

pub mod page;
