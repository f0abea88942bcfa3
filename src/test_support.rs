//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{
    AudioCapture, BackendError, CannedResponder, CannedTranscriber, LocalIdentity,
};
use crate::core::state::App;

/// Creates a test App wired to zero-delay, seeded simulated backends.
pub fn test_app() -> App {
    App::new(
        Arc::new(CannedResponder::seeded(Duration::ZERO, 0)),
        Arc::new(LocalIdentity::new(Duration::ZERO)),
        Arc::new(CannedTranscriber::default()),
    )
}

/// A capture device whose `start` always fails, for permission-denied paths.
pub struct DeniedMicrophone;

impl AudioCapture for DeniedMicrophone {
    fn start(&mut self) -> Result<(), BackendError> {
        Err(BackendError::Denied("microphone permission".to_string()))
    }

    fn stop(&mut self) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::Denied("microphone permission".to_string()))
    }
}
