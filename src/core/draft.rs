//! # Input Capture
//!
//! The draft collects one of {typed text, attached image, recorded audio}
//! and normalizes it into an [`Outbound`] message. Three rules:
//!
//! - text is trimmed; empty text with no attachment means no submission;
//! - at most one attachment, and only files whose extension maps to an
//!   image/* MIME kind; the preview probed at attach time is released when
//!   the attachment is sent or removed;
//! - recording is a two-state session, `Idle → Recording → Idle`, toggled
//!   by explicit user action.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::core::message::MessageKind;

/// Caption used when an image is sent without any typed text.
pub const DEFAULT_IMAGE_CAPTION: &str = "Image uploaded";

/// Extensions accepted as image/* attachments.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, PartialEq, Eq)]
pub enum DraftError {
    /// The selected file does not look like an image.
    NotAnImage(String),
    /// `start_recording` while already recording.
    AlreadyRecording,
    /// `stop_recording` while idle.
    NotRecording,
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::NotAnImage(path) => write!(f, "not an image file: {path}"),
            DraftError::AlreadyRecording => write!(f, "already recording"),
            DraftError::NotRecording => write!(f, "not recording"),
        }
    }
}

impl std::error::Error for DraftError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

/// A pending image attachment. `size_bytes` is the preview probed at attach
/// time (the native analog of a revocable object URL); dropping the
/// attachment releases it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub path: String,
    pub size_bytes: Option<u64>,
}

/// A normalized, ready-to-send message produced by the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub content: String,
    pub kind: MessageKind,
    pub file: Option<String>,
}

impl Outbound {
    /// Wraps a transcription result as a voice submission.
    pub fn voice(transcript: String) -> Self {
        Outbound {
            content: transcript,
            kind: MessageKind::Voice,
            file: None,
        }
    }
}

/// The in-progress submission: text buffer, optional attachment, recording
/// session state.
#[derive(Debug, Default)]
pub struct Draft {
    pub text: String,
    attachment: Option<ImageAttachment>,
    recording: RecordingState,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an image file, replacing any previous attachment. Rejects
    /// files whose extension is not an image kind.
    pub fn attach_image(&mut self, path: &str) -> Result<(), DraftError> {
        if !is_image_path(path) {
            return Err(DraftError::NotAnImage(path.to_string()));
        }
        let size_bytes = fs::metadata(path).ok().map(|m| m.len());
        self.attachment = Some(ImageAttachment {
            path: path.to_string(),
            size_bytes,
        });
        Ok(())
    }

    /// Removes the attachment, releasing its preview.
    pub fn remove_attachment(&mut self) {
        self.attachment = None;
    }

    pub fn attachment(&self) -> Option<&ImageAttachment> {
        self.attachment.as_ref()
    }

    pub fn recording(&self) -> RecordingState {
        self.recording
    }

    pub fn start_recording(&mut self) -> Result<(), DraftError> {
        match self.recording {
            RecordingState::Recording => Err(DraftError::AlreadyRecording),
            RecordingState::Idle => {
                self.recording = RecordingState::Recording;
                Ok(())
            }
        }
    }

    pub fn stop_recording(&mut self) -> Result<(), DraftError> {
        match self.recording {
            RecordingState::Idle => Err(DraftError::NotRecording),
            RecordingState::Recording => {
                self.recording = RecordingState::Idle;
                Ok(())
            }
        }
    }

    /// Aborts a recording session without producing a submission (used when
    /// the capture device fails).
    pub fn abort_recording(&mut self) {
        self.recording = RecordingState::Idle;
    }

    /// Consumes the draft into an [`Outbound`] message, or None when there
    /// is nothing to send. An attachment wins over plain text: the text
    /// becomes the caption, defaulting to [`DEFAULT_IMAGE_CAPTION`].
    pub fn take_submission(&mut self) -> Option<Outbound> {
        let text = self.text.trim().to_string();
        if text.is_empty() && self.attachment.is_none() {
            return None;
        }
        self.text.clear();
        // The attachment's preview is released here: the Outbound keeps
        // only the file reference.
        if let Some(attachment) = self.attachment.take() {
            let content = if text.is_empty() {
                DEFAULT_IMAGE_CAPTION.to_string()
            } else {
                text
            };
            return Some(Outbound {
                content,
                kind: MessageKind::Image,
                file: Some(attachment.path),
            });
        }
        Some(Outbound {
            content: text,
            kind: MessageKind::Text,
            file: None,
        })
    }
}

fn is_image_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}
