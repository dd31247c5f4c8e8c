//! Session and conversation history management.
//!
//! In-memory storage for the reply service's per-visitor conversations.
//! Sessions are identified by UUID and keep a bounded message history.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::session::SessionStore;
//!
//! let store = SessionStore::new(10);
//! let session = store.create();
//! session.add_user_message("Hello!");
//!
//! assert_eq!(session.messages().len(), 1);
//! ```

mod thread;

pub use thread::{Session, SessionStore};
