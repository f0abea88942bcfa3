//! End-to-end flows through the core reducer and the simulated backends,
//! driven exactly the way the TUI event loop drives them: update() produces
//! an Effect, the test plays the backend round trip, and the resulting
//! Action is fed back into update().
//!
//! All tests run on a paused tokio clock, so the simulated 1000ms latencies
//! resolve instantly without losing their ordering semantics.

use std::sync::Arc;
use std::time::Duration;

use parley::backend::{
    AudioCapture, CannedResponder, CannedTranscriber, IdentityProvider, LocalIdentity,
    ReplyRequest, ResponseBackend, SimulatedMicrophone,
};
use parley::backend::{AuthMode, AuthRequest, Transcriber};
use parley::core::action::{Action, Effect, update};
use parley::core::draft::{Draft, Outbound};
use parley::core::message::{MessageKind, Sender};
use parley::core::state::App;

const DELAY: Duration = Duration::from_millis(1000);

// ============================================================================
// Helper Functions
// ============================================================================

/// App wired to seeded simulated backends with the production 1000ms delays.
fn sim_app(seed: u64) -> App {
    App::new(
        Arc::new(CannedResponder::seeded(DELAY, seed)),
        Arc::new(LocalIdentity::new(DELAY)),
        Arc::new(CannedTranscriber::default()),
    )
}

fn text_outbound(content: &str) -> Outbound {
    Outbound {
        content: content.to_string(),
        kind: MessageKind::Text,
        file: None,
    }
}

/// Plays the backend round trip an `Effect::SpawnReply` asks for and feeds
/// the result back into the reducer, like the event loop does.
async fn resolve_reply(app: &mut App, effect: Effect) {
    let Effect::SpawnReply {
        conversation_id,
        content,
        kind,
    } = effect
    else {
        panic!("expected SpawnReply, got {effect:?}");
    };
    let backend = app.backend.clone();
    let action = match backend
        .respond(ReplyRequest {
            content: &content,
            kind,
            conversation_id,
        })
        .await
    {
        Ok(reply) => Action::ReplyArrived {
            conversation_id,
            content: reply,
        },
        Err(e) => Action::ReplyFailed {
            conversation_id,
            error: e.to_string(),
        },
    };
    update(app, action);
}

// ============================================================================
// Text exchange
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_hello_exchange() {
    let mut app = sim_app(0);

    let effect = update(&mut app, Action::SendMessage(text_outbound("Hello")));

    // User message lands immediately, before any delay
    {
        let conversation = app.registry.active();
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].sender, Sender::User);
        assert_eq!(conversation.messages[0].content, "Hello");
        assert_eq!(conversation.title, "Hello...");
        assert!(app.is_busy());
    }

    resolve_reply(&mut app, effect).await;

    let conversation = app.registry.active();
    assert_eq!(conversation.messages.len(), 2);
    assert_eq!(conversation.messages[1].sender, Sender::Assistant);
    assert_eq!(conversation.messages[1].kind, MessageKind::Text);
    assert!(
        CannedResponder::reply_options(MessageKind::Text)
            .contains(&conversation.messages[1].content.as_str())
    );
    assert!(!app.is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_reply_lands_in_original_conversation_after_switch() {
    let mut app = sim_app(0);

    let effect = update(&mut app, Action::SendMessage(text_outbound("first")));
    let first_id = app.registry.active_id();

    // Switch away while the reply is in flight
    update(&mut app, Action::NewConversation);
    let second_id = app.registry.active_id();
    assert_ne!(first_id, second_id);

    resolve_reply(&mut app, effect).await;

    assert_eq!(app.registry.get(first_id).unwrap().messages.len(), 2);
    assert!(app.registry.get(second_id).unwrap().messages.is_empty());
    // The active conversation did not change underneath the user
    assert_eq!(app.registry.active_id(), second_id);
}

#[tokio::test(start_paused = true)]
async fn test_reply_to_deleted_conversation_is_dropped() {
    let mut app = sim_app(0);

    let effect = update(&mut app, Action::SendMessage(text_outbound("doomed")));
    let doomed_id = app.registry.active_id();

    update(&mut app, Action::NewConversation);
    update(&mut app, Action::DeleteConversation(doomed_id));
    assert!(app.registry.get(doomed_id).is_none());

    resolve_reply(&mut app, effect).await;

    // Dropped silently: no conversation gained a message
    for conversation in app.registry.conversations() {
        assert!(conversation.messages.is_empty());
    }
    assert!(!app.is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_seeded_replies_are_reproducible() {
    let mut first = sim_app(42);
    let mut second = sim_app(42);

    for app in [&mut first, &mut second] {
        let effect = update(app, Action::SendMessage(text_outbound("hi")));
        resolve_reply(app, effect).await;
    }

    assert_eq!(
        first.registry.active().messages[1].content,
        second.registry.active().messages[1].content
    );
}

// ============================================================================
// Titles
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_title_truncates_long_first_message_by_chars() {
    let mut app = sim_app(0);
    let long = "x".repeat(80);
    update(&mut app, Action::SendMessage(text_outbound(&long)));

    let title = &app.registry.active().title;
    assert_eq!(title.chars().count(), 53); // 50 chars + "..."
    assert!(title.ends_with("..."));

    // Multi-byte content truncates by characters, not bytes
    let mut app = sim_app(0);
    let long = "é".repeat(80);
    update(&mut app, Action::SendMessage(text_outbound(&long)));
    let title = &app.registry.active().title;
    assert_eq!(title.chars().count(), 53);
}

#[tokio::test(start_paused = true)]
async fn test_title_set_only_by_first_message() {
    let mut app = sim_app(0);
    let effect = update(&mut app, Action::SendMessage(text_outbound("first words")));
    resolve_reply(&mut app, effect).await;
    update(&mut app, Action::SendMessage(text_outbound("second words")));

    assert_eq!(app.registry.active().title, "first words...");
}

// ============================================================================
// Registry management
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_delete_active_reselects_from_remaining() {
    let mut app = sim_app(0);
    let original = app.registry.active_id();
    update(&mut app, Action::NewConversation);
    update(&mut app, Action::NewConversation);
    let newest = app.registry.active_id();

    update(&mut app, Action::DeleteConversation(newest));

    assert_eq!(app.registry.len(), 2);
    // The new active is the first remaining conversation, never the dead id
    let active = app.registry.active_id();
    assert_ne!(active, newest);
    assert!(app.registry.get(active).is_some());
    assert!(app.registry.get(original).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_last_conversation_cannot_be_deleted() {
    let mut app = sim_app(0);
    let only = app.registry.active_id();
    update(&mut app, Action::DeleteConversation(only));
    assert_eq!(app.registry.len(), 1);
    assert_eq!(app.registry.active_id(), only);
}

// ============================================================================
// Image submission
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_image_attachment_flow() {
    let mut draft = Draft::new();
    draft.attach_image("holiday.png").unwrap();
    let outbound = draft.take_submission().expect("attachment should submit");
    assert_eq!(outbound.kind, MessageKind::Image);
    assert_eq!(outbound.content, "Image uploaded");

    let mut app = sim_app(0);
    let effect = update(&mut app, Action::SendMessage(outbound));
    {
        let message = &app.registry.active().messages[0];
        assert_eq!(message.kind, MessageKind::Image);
        assert_eq!(message.file.as_deref(), Some("holiday.png"));
    }

    resolve_reply(&mut app, effect).await;
    let reply = &app.registry.active().messages[1];
    assert!(
        CannedResponder::reply_options(MessageKind::Image).contains(&reply.content.as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn test_image_caption_overrides_default() {
    let mut draft = Draft::new();
    draft.text = "look at this".to_string();
    draft.attach_image("cat.jpg").unwrap();
    let outbound = draft.take_submission().unwrap();
    assert_eq!(outbound.kind, MessageKind::Image);
    assert_eq!(outbound.content, "look at this");
}

// ============================================================================
// Voice capture
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_voice_recording_flow() {
    let mut microphone = SimulatedMicrophone::new();
    microphone.start().expect("simulated device always opens");
    let audio = microphone.stop().expect("stop yields captured bytes");
    assert!(!audio.is_empty());

    let mut app = sim_app(0);
    let transcript = app
        .transcriber
        .clone()
        .transcribe(&audio)
        .await
        .expect("simulated transcription never fails");
    assert_eq!(transcript, "This is a simulated voice message transcription.");

    let active_id = app.registry.active_id();
    let effect = update(
        &mut app,
        Action::TranscriptReady {
            conversation_id: active_id,
            transcript: transcript.clone(),
        },
    );
    {
        let message = &app.registry.active().messages[0];
        assert_eq!(message.kind, MessageKind::Voice);
        assert_eq!(message.content, transcript);
    }

    resolve_reply(&mut app, effect).await;
    let reply = &app.registry.active().messages[1];
    assert!(
        CannedResponder::reply_options(MessageKind::Voice).contains(&reply.content.as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn test_transcript_lands_where_recording_stopped() {
    let mut app = sim_app(0);
    // The event loop captures the active id when the recording stops,
    // before the transcription round trip begins
    let recorded_in = app.registry.active_id();
    update(&mut app, Action::NewConversation);
    let switched_to = app.registry.active_id();

    let transcript = app.transcriber.clone().transcribe(&[]).await.unwrap();
    let effect = update(
        &mut app,
        Action::TranscriptReady {
            conversation_id: recorded_in,
            transcript,
        },
    );

    let original = app.registry.get(recorded_in).unwrap();
    assert_eq!(original.messages.len(), 1);
    assert_eq!(original.messages[0].kind, MessageKind::Voice);
    assert!(app.registry.get(switched_to).unwrap().messages.is_empty());

    // The follow-up reply targets the same conversation
    resolve_reply(&mut app, effect).await;
    assert_eq!(app.registry.get(recorded_in).unwrap().messages.len(), 2);
    assert!(app.registry.get(switched_to).unwrap().messages.is_empty());
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_sign_in_accepts_any_credentials() {
    let mut app = sim_app(0);
    let request = AuthRequest {
        mode: AuthMode::SignIn,
        name: None,
        email: "ada@example.com".to_string(),
        password: "whatever".to_string(),
    };

    let effect = update(&mut app, Action::SubmitLogin(request.clone()));
    assert_eq!(effect, Effect::SpawnLogin(request.clone()));
    assert!(app.is_busy());

    let session = app.identity.clone().authenticate(request).await.unwrap();
    update(&mut app, Action::LoginCompleted(session));

    let session = app.session.as_ref().expect("session established");
    assert_eq!(session.email, "ada@example.com");
    assert_eq!(session.name, "User"); // sign-in has no name field
    assert!(!app.is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_sign_up_uses_provided_name() {
    let mut app = sim_app(0);
    let request = AuthRequest {
        mode: AuthMode::SignUp,
        name: Some("Ada".to_string()),
        email: "ada@example.com".to_string(),
        password: "pw".to_string(),
    };
    update(&mut app, Action::SubmitLogin(request.clone()));
    let session = app.identity.clone().authenticate(request).await.unwrap();
    update(&mut app, Action::LoginCompleted(session));

    assert_eq!(app.session.as_ref().unwrap().name, "Ada");
}

#[tokio::test(start_paused = true)]
async fn test_logout_clears_session_and_conversations() {
    let mut app = sim_app(0);
    let effect = update(&mut app, Action::SendMessage(text_outbound("Hello")));
    resolve_reply(&mut app, effect).await;
    update(&mut app, Action::NewConversation);

    let request = AuthRequest {
        mode: AuthMode::SignIn,
        name: None,
        email: "a@b.c".to_string(),
        password: "pw".to_string(),
    };
    update(&mut app, Action::SubmitLogin(request.clone()));
    let session = app.identity.clone().authenticate(request).await.unwrap();
    update(&mut app, Action::LoginCompleted(session));

    update(&mut app, Action::Logout);
    assert!(app.session.is_none());
    assert_eq!(app.registry.len(), 1);
    assert!(app.registry.active().messages.is_empty());
    assert_eq!(app.registry.active().title, "New Chat");
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_replies_resolve_out_of_order() {
    let mut app = sim_app(0);

    let first_effect = update(&mut app, Action::SendMessage(text_outbound("one")));
    let first_id = app.registry.active_id();
    update(&mut app, Action::NewConversation);
    let second_effect = update(&mut app, Action::SendMessage(text_outbound("two")));
    let second_id = app.registry.active_id();
    assert_eq!(app.pending_replies, vec![first_id, second_id]);
    // Each conversation is waiting on exactly its own reply
    assert!(app.has_pending_reply(first_id));
    assert!(app.has_pending_reply(second_id));

    // Resolve in reverse order of submission
    resolve_reply(&mut app, second_effect).await;
    assert_eq!(app.pending_replies, vec![first_id]);
    assert!(!app.has_pending_reply(second_id));
    resolve_reply(&mut app, first_effect).await;

    assert_eq!(app.registry.get(first_id).unwrap().messages.len(), 2);
    assert_eq!(app.registry.get(second_id).unwrap().messages.len(), 2);
    assert!(app.pending_replies.is_empty());
}
