//! # Conversations
//!
//! A conversation is a titled, timestamped container for an ordered,
//! append-only sequence of messages. The [`ConversationRegistry`] owns the
//! full set of conversations plus the active-id pointer, and is the only
//! place either is mutated.
//!
//! Registry invariants:
//! - exactly one conversation is active at any time;
//! - the registry is never empty (deleting the last conversation is
//!   rejected).

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::message::{Message, MessageKind, next_id};

pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum number of characters of the first user message kept as the title.
const TITLE_LIMIT: usize = 50;

/// Derive a conversation title from its first user message.
///
/// The "..." suffix is unconditional — even "Hello" becomes "Hello..." —
/// matching the UI this mirrors. Truncation counts chars, not bytes, so
/// multi-byte input never splits a code point.
fn derive_title(content: &str) -> String {
    let head: String = content.chars().take(TITLE_LIMIT).collect();
    format!("{head}...")
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new() -> Self {
        Conversation {
            id: next_id(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a user message. If this is the conversation's first message,
    /// the title is derived from its content.
    pub fn push_user_message(
        &mut self,
        content: String,
        kind: MessageKind,
        file: Option<String>,
    ) -> &Message {
        if self.messages.is_empty() {
            self.title = derive_title(&content);
        }
        self.messages.push(Message::user(content, kind, file));
        self.messages.last().expect("just pushed")
    }

    /// Appends an assistant reply.
    pub fn push_assistant_message(&mut self, content: String) -> &Message {
        self.messages.push(Message::assistant(content));
        self.messages.last().expect("just pushed")
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered set of conversations plus the active-id pointer.
#[derive(Debug, Clone)]
pub struct ConversationRegistry {
    conversations: Vec<Conversation>,
    active_id: i64,
}

impl ConversationRegistry {
    /// Starts with a single default conversation, which is active.
    pub fn new() -> Self {
        let conversation = Conversation::new();
        let active_id = conversation.id;
        ConversationRegistry {
            conversations: vec![conversation],
            active_id,
        }
    }

    /// Front-inserts a new empty conversation, makes it active, returns its id.
    pub fn create(&mut self) -> i64 {
        let conversation = Conversation::new();
        let id = conversation.id;
        self.conversations.insert(0, conversation);
        self.active_id = id;
        id
    }

    /// Sets the active conversation. Silent no-op if `id` is not present —
    /// the UI should never offer an invalid id.
    pub fn select(&mut self, id: i64) {
        if self.conversations.iter().any(|c| c.id == id) {
            self.active_id = id;
        } else {
            debug!("select: unknown conversation id {id}, ignoring");
        }
    }

    /// Mutable access to a conversation by id; None if absent. This is the
    /// merge seam for message appends and title updates.
    pub fn get_mut(&mut self, id: i64) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub fn get(&self, id: i64) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Removes the conversation with `id`. Returns false without touching
    /// any state when this is the only conversation (the registry must
    /// always contain at least one) or when the id is unknown.
    ///
    /// When the deleted conversation was active, the new active id is
    /// recomputed strictly from the post-deletion list: first remaining
    /// conversation in list order.
    pub fn delete(&mut self, id: i64) -> bool {
        if self.conversations.len() == 1 {
            debug!("delete: refusing to remove the last conversation");
            return false;
        }
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            debug!("delete: unknown conversation id {id}, ignoring");
            return false;
        }
        if self.active_id == id {
            self.active_id = self.conversations[0].id;
        }
        true
    }

    /// The active conversation, falling back to the first conversation if
    /// the active id is somehow stale. Never panics: the registry is never
    /// empty.
    pub fn active(&self) -> &Conversation {
        self.conversations
            .iter()
            .find(|c| c.id == self.active_id)
            .unwrap_or(&self.conversations[0])
    }

    /// Mutable counterpart of [`active`](Self::active), with the same
    /// stale-id fallback.
    pub fn active_mut(&mut self) -> &mut Conversation {
        let id = self.active().id;
        self.get_mut(id).expect("active id resolves to a conversation")
    }

    pub fn active_id(&self) -> i64 {
        self.active().id
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Discards everything and returns to a single default conversation
    /// (the logout path).
    pub fn reset(&mut self) {
        let conversation = Conversation::new();
        self.active_id = conversation.id;
        self.conversations = vec![conversation];
    }
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
