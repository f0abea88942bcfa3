//! # Messages
//!
//! One unit of dialogue: who sent it, what kind of content it carries,
//! and when it was appended. Messages are immutable once pushed onto a
//! conversation — there is no edit or delete of individual messages.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// Content kind of a message. Image messages carry their file in
/// [`Message::file`]; the `content` field is then a caption.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MessageKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "voice")]
    Voice,
    #[serde(rename = "image")]
    Image,
}

impl MessageKind {
    /// Returns a short display tag, or None for plain text.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            MessageKind::Text => None,
            MessageKind::Voice => Some("voice"),
            MessageKind::Image => Some("image"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: i64,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// File reference; present only for image messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Builds a user message with a fresh id and timestamp.
    pub fn user(content: String, kind: MessageKind, file: Option<String>) -> Self {
        Message {
            id: next_id(),
            content,
            kind,
            file,
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    /// Builds an assistant message. Replies are always plain text.
    pub fn assistant(content: String) -> Self {
        Message {
            id: next_id(),
            content,
            kind: MessageKind::Text,
            file: None,
            sender: Sender::Assistant,
            timestamp: Utc::now(),
        }
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Allocates a time-based id that is strictly monotonic within the process.
///
/// Ids track the wall clock in milliseconds but never repeat or go
/// backwards, so two messages appended in the same millisecond still get
/// distinct, ordered ids.
pub fn next_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let prev = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(last.max(now - 1) + 1)
        })
        .expect("closure always returns Some");
    prev.max(now - 1) + 1
}
