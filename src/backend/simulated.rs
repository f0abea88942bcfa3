//! # Simulated Backends
//!
//! Local stand-ins behind the seams in the parent module: canned assistant
//! replies picked uniformly at random after a fixed delay, a transcriber
//! that returns one fixed sentence, an identity provider that accepts any
//! credentials, and a microphone that records silence.
//!
//! The responder's RNG is seedable so reply selection is deterministic in
//! tests.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tokio::time::sleep;

use super::{
    AudioCapture, AuthRequest, BackendError, IdentityProvider, ReplyRequest, ResponseBackend,
    Session, Transcriber,
};
use crate::core::message::MessageKind;

/// Latency stand-in for the reply and auth round trips.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Transcript returned for every recording.
pub const DEFAULT_TRANSCRIPT: &str = "This is a simulated voice message transcription.";

const TEXT_REPLIES: &[&str] = &[
    "I understand your question. Let me help you with that.",
    "That's an interesting point. Here's what I think...",
    "Thanks for sharing that. I can provide some insights on this topic.",
    "Great question! Let me break this down for you.",
];

const VOICE_REPLIES: &[&str] = &[
    "I heard your voice message. Here's my response to what you said.",
    "Thanks for the voice input. Let me address your question.",
];

const IMAGE_REPLIES: &[&str] = &[
    "I can see the image you've shared. Let me analyze what I observe.",
    "Thanks for sharing this image. Here's what I can tell you about it.",
];

/// Picks a canned reply for the message kind after a fixed delay.
pub struct CannedResponder {
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl CannedResponder {
    pub fn new(delay: Duration) -> Self {
        CannedResponder {
            delay,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic reply selection for tests and reproducible runs.
    pub fn seeded(delay: Duration, seed: u64) -> Self {
        CannedResponder {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The reply table for a message kind. Kinds without a table of their
    /// own would fall back to the text table; with the current closed enum
    /// every kind has one.
    pub fn reply_options(kind: MessageKind) -> &'static [&'static str] {
        match kind {
            MessageKind::Text => TEXT_REPLIES,
            MessageKind::Voice => VOICE_REPLIES,
            MessageKind::Image => IMAGE_REPLIES,
        }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl ResponseBackend for CannedResponder {
    fn name(&self) -> &str {
        "canned"
    }

    async fn respond(&self, request: ReplyRequest<'_>) -> Result<String, BackendError> {
        sleep(self.delay).await;
        let options = Self::reply_options(request.kind);
        let index = self.rng.lock().await.random_range(0..options.len());
        debug!(
            "canned reply {}/{} for conversation {}",
            index + 1,
            options.len(),
            request.conversation_id
        );
        Ok(options[index].to_string())
    }
}

/// Returns one fixed sentence for any audio.
pub struct CannedTranscriber {
    transcript: String,
}

impl CannedTranscriber {
    pub fn new(transcript: String) -> Self {
        CannedTranscriber { transcript }
    }
}

impl Default for CannedTranscriber {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIPT.to_string())
    }
}

#[async_trait]
impl Transcriber for CannedTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, BackendError> {
        Ok(self.transcript.clone())
    }
}

/// Accepts any email/password after a fixed delay. Sign-in mode has no
/// name field; the session name then defaults to "User".
pub struct LocalIdentity {
    delay: Duration,
}

impl LocalIdentity {
    pub fn new(delay: Duration) -> Self {
        LocalIdentity { delay }
    }
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn authenticate(&self, request: AuthRequest) -> Result<Session, BackendError> {
        sleep(self.delay).await;
        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "User".to_string());
        Ok(Session {
            name,
            email: request.email,
        })
    }
}

/// Minimal RIFF/WAVE header: the simulated microphone "records" an empty
/// 16-bit mono 16 kHz clip.
const EMPTY_WAV: &[u8] = &[
    0x52, 0x49, 0x46, 0x46, 0x24, 0x00, 0x00, 0x00, // "RIFF", chunk size 36
    0x57, 0x41, 0x56, 0x45, 0x66, 0x6d, 0x74, 0x20, // "WAVE", "fmt "
    0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, // PCM, mono
    0x80, 0x3e, 0x00, 0x00, 0x00, 0x7d, 0x00, 0x00, // 16000 Hz
    0x02, 0x00, 0x10, 0x00, 0x64, 0x61, 0x74, 0x61, // block align, "data"
    0x00, 0x00, 0x00, 0x00, // zero samples
];

/// Always-available capture device producing an empty WAV clip.
#[derive(Default)]
pub struct SimulatedMicrophone {
    capturing: bool,
}

impl SimulatedMicrophone {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioCapture for SimulatedMicrophone {
    fn start(&mut self) -> Result<(), BackendError> {
        self.capturing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<Vec<u8>, BackendError> {
        if !self.capturing {
            return Err(BackendError::Unavailable("capture not started".to_string()));
        }
        self.capturing = false;
        Ok(EMPTY_WAV.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AuthMode;

    fn request(kind: MessageKind) -> ReplyRequest<'static> {
        ReplyRequest {
            content: "hello",
            kind,
            conversation_id: 1,
        }
    }

    #[tokio::test]
    async fn test_seeded_responder_is_deterministic() {
        let a = CannedResponder::seeded(Duration::ZERO, 7);
        let b = CannedResponder::seeded(Duration::ZERO, 7);
        for _ in 0..10 {
            let ra = a.respond(request(MessageKind::Text)).await.unwrap();
            let rb = b.respond(request(MessageKind::Text)).await.unwrap();
            assert_eq!(ra, rb);
        }
    }

    #[tokio::test]
    async fn test_reply_comes_from_kind_table() {
        let responder = CannedResponder::seeded(Duration::ZERO, 0);
        for kind in [MessageKind::Text, MessageKind::Voice, MessageKind::Image] {
            let reply = responder.respond(request(kind)).await.unwrap();
            assert!(
                CannedResponder::reply_options(kind).contains(&reply.as_str()),
                "reply {reply:?} not in {kind:?} table"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_respond_waits_for_the_configured_delay() {
        let responder =
            std::sync::Arc::new(CannedResponder::seeded(Duration::from_millis(1000), 0));
        let task = tokio::spawn({
            let responder = responder.clone();
            async move {
                responder
                    .respond(ReplyRequest {
                        content: "hello",
                        kind: MessageKind::Text,
                        conversation_id: 1,
                    })
                    .await
            }
        });

        // Before the delay elapses the task must still be pending
        tokio::time::advance(Duration::from_millis(999)).await;
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        tokio::time::advance(Duration::from_millis(1)).await;
        let reply = task.await.unwrap().unwrap();
        assert!(TEXT_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn test_transcriber_returns_fixed_literal() {
        let transcriber = CannedTranscriber::default();
        let text = transcriber.transcribe(&[]).await.unwrap();
        assert_eq!(text, DEFAULT_TRANSCRIPT);
    }

    #[tokio::test]
    async fn test_local_identity_accepts_any_credentials() {
        let identity = LocalIdentity::new(Duration::ZERO);
        let session = identity
            .authenticate(AuthRequest {
                mode: AuthMode::SignUp,
                name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.name, "Ada");
        assert_eq!(session.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_local_identity_defaults_name_on_sign_in() {
        let identity = LocalIdentity::new(Duration::ZERO);
        let session = identity
            .authenticate(AuthRequest {
                mode: AuthMode::SignIn,
                name: None,
                email: "ada@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.name, "User");
    }

    #[test]
    fn test_microphone_round_trip() {
        let mut mic = SimulatedMicrophone::new();
        mic.start().unwrap();
        let audio = mic.stop().unwrap();
        assert!(audio.starts_with(b"RIFF"));
    }

    #[test]
    fn test_microphone_stop_without_start_fails() {
        let mut mic = SimulatedMicrophone::new();
        assert!(mic.stop().is_err());
    }
}
