//! # Actions
//!
//! Everything that can happen in Parley becomes an `Action`.
//! User presses Enter? That's `Action::SendMessage(outbound)`.
//! A simulated reply lands? That's `Action::ReplyArrived { .. }`.
//!
//! The `update()` function takes the current state and an action, applies
//! the mutation, and returns an `Effect` telling the adapter which
//! background task (if any) to spawn. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! This makes everything testable: feed actions, assert on state and
//! effects, no terminal or timers required.

use log::{debug, warn};

use crate::backend::{AuthRequest, Session};
use crate::core::draft::Outbound;
use crate::core::message::MessageKind;
use crate::core::state::App;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NewConversation,
    SelectConversation(i64),
    DeleteConversation(i64),
    /// A normalized submission from input capture (text or image).
    SendMessage(Outbound),
    /// Transcription of a finished recording; becomes a voice submission in
    /// the conversation that was active when recording stopped.
    TranscriptReady {
        conversation_id: i64,
        transcript: String,
    },
    TranscriptFailed(String),
    /// A reply resolved for the conversation captured at request time.
    ReplyArrived { conversation_id: i64, content: String },
    ReplyFailed { conversation_id: i64, error: String },
    SubmitLogin(AuthRequest),
    LoginCompleted(Session),
    LoginFailed(String),
    Logout,
    MicrophoneDenied(String),
    Quit,
}

/// What the adapter must do after an `update()` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Spawn a reply request targeting `conversation_id`.
    SpawnReply {
        conversation_id: i64,
        content: String,
        kind: MessageKind,
    },
    /// Spawn an authentication round trip.
    SpawnLogin(AuthRequest),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::NewConversation => {
            let id = app.registry.create();
            debug!("created conversation {id}");
            Effect::None
        }
        Action::SelectConversation(id) => {
            app.registry.select(id);
            Effect::None
        }
        Action::DeleteConversation(id) => {
            // Rejection (last conversation or unknown id) is silent policy,
            // not an error.
            app.registry.delete(id);
            Effect::None
        }
        Action::SendMessage(outbound) => {
            let conversation_id = app.registry.active_id();
            send_to(app, conversation_id, outbound)
        }
        Action::TranscriptReady {
            conversation_id,
            transcript,
        } => send_to(app, conversation_id, Outbound::voice(transcript)),
        Action::TranscriptFailed(error) => {
            warn!("transcription failed: {error}");
            app.status_message = format!("Transcription failed: {error}");
            Effect::None
        }
        Action::ReplyArrived {
            conversation_id,
            content,
        } => {
            clear_pending(app, conversation_id);
            // Deliver to the captured conversation id, never the active
            // one. A reply to a since-deleted conversation is a no-op.
            match app.registry.get_mut(conversation_id) {
                Some(conversation) => {
                    conversation.push_assistant_message(content);
                }
                None => {
                    debug!("dropping reply for deleted conversation {conversation_id}");
                }
            }
            Effect::None
        }
        Action::ReplyFailed {
            conversation_id,
            error,
        } => {
            clear_pending(app, conversation_id);
            warn!("reply failed for conversation {conversation_id}: {error}");
            app.status_message = format!("Assistant error: {error}");
            Effect::None
        }
        Action::SubmitLogin(request) => {
            app.auth_pending = true;
            Effect::SpawnLogin(request)
        }
        Action::LoginCompleted(session) => {
            app.auth_pending = false;
            app.status_message = format!("Signed in as {}", session.email);
            app.session = Some(session);
            Effect::None
        }
        Action::LoginFailed(error) => {
            app.auth_pending = false;
            app.status_message = format!("Sign-in failed: {error}");
            Effect::None
        }
        Action::Logout => {
            app.session = None;
            app.registry.reset();
            app.status_message = String::from("Signed out");
            Effect::None
        }
        Action::MicrophoneDenied(error) => {
            warn!("microphone denied: {error}");
            app.status_message = format!("Could not access microphone: {error}");
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

/// Appends the user message to the target conversation and requests a
/// reply for it. The conversation id is captured before any delay, so
/// neither the message nor its reply can leak into another conversation if
/// the user switches mid-flight. A submission for a since-deleted
/// conversation (a transcript can outlive its conversation) is dropped.
fn send_to(app: &mut App, conversation_id: i64, outbound: Outbound) -> Effect {
    let Some(conversation) = app.registry.get_mut(conversation_id) else {
        debug!("dropping submission for deleted conversation {conversation_id}");
        return Effect::None;
    };
    conversation.push_user_message(
        outbound.content.clone(),
        outbound.kind,
        outbound.file,
    );
    app.pending_replies.push(conversation_id);
    Effect::SpawnReply {
        conversation_id,
        content: outbound.content,
        kind: outbound.kind,
    }
}

/// Drops one pending-reply marker for a resolved round trip.
fn clear_pending(app: &mut App, conversation_id: i64) {
    if let Some(pos) = app
        .pending_replies
        .iter()
        .position(|&id| id == conversation_id)
    {
        app.pending_replies.remove(pos);
    }
}
