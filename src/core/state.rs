//! # Application State
//!
//! Core business state for Parley. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── registry: ConversationRegistry      // conversations + active pointer
//! ├── backend: Arc<dyn ResponseBackend>   // reply producer (simulated)
//! ├── identity: Arc<dyn IdentityProvider> // sign-in (simulated)
//! ├── transcriber: Arc<dyn Transcriber>   // speech-to-text (simulated)
//! ├── session: Option<Session>            // signed-in identity
//! ├── status_message: String              // status bar text
//! ├── pending_replies: Vec<i64>           // conversation ids awaiting a reply
//! └── auth_pending: bool                  // sign-in round trip in flight
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::sync::Arc;

use crate::backend::{IdentityProvider, ResponseBackend, Session, Transcriber};
use crate::core::conversation::ConversationRegistry;

pub struct App {
    pub registry: ConversationRegistry,
    pub backend: Arc<dyn ResponseBackend>,
    pub identity: Arc<dyn IdentityProvider>,
    pub transcriber: Arc<dyn Transcriber>,
    pub session: Option<Session>,
    pub status_message: String,
    /// Conversation ids with a reply requested but not yet delivered, one
    /// entry per in-flight request. Replies are independent: each lands on
    /// the conversation id captured at request time, so the UI can show a
    /// typing indicator only where a reply is actually due.
    pub pending_replies: Vec<i64>,
    pub auth_pending: bool,
}

impl App {
    pub fn new(
        backend: Arc<dyn ResponseBackend>,
        identity: Arc<dyn IdentityProvider>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            registry: ConversationRegistry::new(),
            backend,
            identity,
            transcriber,
            session: None,
            status_message: String::from("Welcome to Parley!"),
            pending_replies: Vec::new(),
            auth_pending: false,
        }
    }

    /// True while any background round trip is in flight.
    pub fn is_busy(&self) -> bool {
        !self.pending_replies.is_empty() || self.auth_pending
    }

    /// True if a reply is still due in this specific conversation.
    pub fn has_pending_reply(&self, conversation_id: i64) -> bool {
        self.pending_replies.contains(&conversation_id)
    }
}
