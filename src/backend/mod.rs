//! # Backend Seams
//!
//! Every asynchronous collaborator sits behind a trait here, so the
//! simulated implementations in [`simulated`] can later be swapped for a
//! real language-model call, a real speech-to-text service, a real
//! identity provider, and a real capture device without touching the core.
//!
//! The one rule all implementations must honor: a reply is delivered to
//! the conversation id captured at request time, never to "whatever is
//! active when the reply lands".

pub mod simulated;

pub use simulated::{CannedResponder, CannedTranscriber, LocalIdentity, SimulatedMicrophone};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::message::MessageKind;

/// Errors a backend can surface. The simulated backends never fail on the
/// reply path, but real integrations need the variants.
#[derive(Debug)]
pub enum BackendError {
    /// A device or service refused access (e.g. microphone permission).
    Denied(String),
    /// The backend could not complete the request.
    Unavailable(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Denied(msg) => write!(f, "access denied: {msg}"),
            BackendError::Unavailable(msg) => write!(f, "backend unavailable: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Everything a backend needs to produce a reply. `conversation_id` is the
/// delivery target captured when the user message was appended.
pub struct ReplyRequest<'a> {
    pub content: &'a str,
    pub kind: MessageKind,
    pub conversation_id: i64,
}

/// Produces assistant replies. The real-backend replacement point.
#[async_trait]
pub trait ResponseBackend: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Produces the reply text for a user message. Resolution may take
    /// arbitrarily long; the caller stays responsive while awaiting.
    async fn respond(&self, request: ReplyRequest<'_>) -> Result<String, BackendError>;
}

/// Turns recorded audio into text. The speech-to-text replacement point.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, BackendError>;
}

/// Which form the sign-in overlay is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggle(self) -> AuthMode {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    /// Header text for the overlay.
    pub fn header(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Welcome back",
            AuthMode::SignUp => "Create account",
        }
    }

    /// Label for the submit affordance.
    pub fn label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Sign Up",
        }
    }
}

/// Credentials handed to the identity provider. The name field is only
/// collected in sign-up mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub mode: AuthMode,
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// An established session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub email: String,
}

/// Authenticates credentials into a [`Session`]. The identity-provider
/// replacement point; must support both [`AuthMode`]s.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, request: AuthRequest) -> Result<Session, BackendError>;
}

/// Microphone access. Synchronous because capture start/stop is a device
/// toggle; the slow part (transcription) is async behind [`Transcriber`].
pub trait AudioCapture: Send {
    /// Opens the device and starts capturing. Failure here must surface to
    /// the user as a visible, non-fatal error.
    fn start(&mut self) -> Result<(), BackendError>;

    /// Stops capturing and returns the recorded bytes.
    fn stop(&mut self) -> Result<Vec<u8>, BackendError>;
}
