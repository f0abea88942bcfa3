//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm. The
//! intention is that a different adapter (web, native) could replace it
//! without touching core.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Busy** (reply or sign-in in flight): draws every ~80ms so the typing
//!   indicator animates.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous
//! redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::backend::{
    AudioCapture, CannedResponder, CannedTranscriber, IdentityProvider, LocalIdentity,
    ReplyRequest, ResponseBackend, SimulatedMicrophone, Transcriber,
};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::draft::RecordingState;
use crate::core::message::MessageKind;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    AuthEvent, AuthModalState, InputBox, InputEvent, MessageListState, SidebarEvent, SidebarState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBox,
    // Overlays (None = hidden); sidebar takes priority over auth for input
    pub sidebar: Option<SidebarState>,
    pub auth_modal: Option<AuthModalState>,
    /// Capture device driven by the Ctrl+R toggle.
    microphone: SimulatedMicrophone,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            sidebar: None,
            auth_modal: None,
            microphone: SimulatedMicrophone::new(),
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Enable Kitty keyboard protocol unconditionally (allows Shift+Enter
        // detection). Detection via supports_keyboard_enhancement() fails in
        // WSL, but the protocol is harmlessly ignored by terminals that
        // don't support it.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!(
            "Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Build the simulated backends from a resolved config.
fn build_backends(
    config: &ResolvedConfig,
) -> (
    Arc<dyn ResponseBackend>,
    Arc<dyn IdentityProvider>,
    Arc<dyn Transcriber>,
) {
    let reply_delay = std::time::Duration::from_millis(config.reply_delay_ms);
    let responder: Arc<dyn ResponseBackend> = match config.seed {
        Some(seed) => Arc::new(CannedResponder::seeded(reply_delay, seed)),
        None => Arc::new(CannedResponder::new(reply_delay)),
    };
    let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentity::new(
        std::time::Duration::from_millis(config.auth_delay_ms),
    ));
    let transcriber: Arc<dyn Transcriber> =
        Arc::new(CannedTranscriber::new(config.transcript.clone()));
    (responder, identity, transcriber)
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let (responder, identity, transcriber) = build_backends(&config);
    let mut app = App::new(responder, identity, transcriber);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Animation timer
    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = app.is_busy();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            let spinner_frame = (elapsed * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when busy (~12fps), long when idle
        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            // Resize just needs a redraw (already flagged above)
            if matches!(event, TuiEvent::Resize) {
                continue;
            }

            // ForceQuit (Ctrl+C) always quits regardless of focus
            if matches!(event, TuiEvent::ForceQuit) {
                if update(&mut app, Action::Quit) == Effect::Quit {
                    should_quit = true;
                }
                continue;
            }

            // Ctrl+O opens the conversation sidebar
            if matches!(event, TuiEvent::OpenSidebar) {
                tui.sidebar = Some(SidebarState::new(&app.registry));
                continue;
            }

            // When the sidebar is open, route all events to it
            if let Some(ref mut sidebar) = tui.sidebar {
                if let Some(sidebar_event) = sidebar.handle_event(&event) {
                    match sidebar_event {
                        SidebarEvent::Select(id) => {
                            update(&mut app, Action::SelectConversation(id));
                            tui.message_list.reset();
                            tui.sidebar = None;
                        }
                        SidebarEvent::CreateNew => {
                            update(&mut app, Action::NewConversation);
                            tui.message_list.reset();
                            tui.sidebar = None;
                        }
                        SidebarEvent::Delete(id) => {
                            let was_active = app.registry.active_id() == id;
                            update(&mut app, Action::DeleteConversation(id));
                            if was_active {
                                tui.message_list.reset();
                            }
                            sidebar.refresh(&app.registry);
                        }
                        SidebarEvent::Dismiss => {
                            tui.sidebar = None;
                        }
                    }
                }
                continue;
            }

            // Ctrl+L: sign out when signed in, otherwise open the auth form
            if matches!(event, TuiEvent::ToggleAuth) {
                if app.session.is_some() {
                    update(&mut app, Action::Logout);
                    tui.message_list.reset();
                } else if tui.auth_modal.is_none() {
                    tui.auth_modal = Some(AuthModalState::new());
                } else {
                    tui.auth_modal = None;
                }
                continue;
            }

            // When the auth form is open, route all events to it
            if let Some(ref mut modal) = tui.auth_modal {
                if let Some(auth_event) = modal.handle_event(&event) {
                    match auth_event {
                        AuthEvent::Submit(request) => {
                            let effect = update(&mut app, Action::SubmitLogin(request));
                            dispatch_effect(effect, &app, &tx, &mut should_quit);
                        }
                        AuthEvent::Dismiss => {
                            tui.auth_modal = None;
                        }
                    }
                }
                continue;
            }

            // Ctrl+N starts a fresh conversation
            if matches!(event, TuiEvent::NewConversation) {
                update(&mut app, Action::NewConversation);
                tui.message_list.reset();
                continue;
            }

            // Ctrl+R toggles the recording state machine
            if matches!(event, TuiEvent::ToggleRecording) {
                toggle_recording(&mut app, &mut tui, &tx);
                continue;
            }

            // Scroll events always go to the message list
            if matches!(
                event,
                TuiEvent::ScrollUp
                    | TuiEvent::ScrollDown
                    | TuiEvent::ScrollPageUp
                    | TuiEvent::ScrollPageDown
            ) {
                tui.message_list.handle_event(&event);
                continue;
            }

            // Everything else belongs to the input box
            if let Some(input_event) = tui.input_box.handle_event(&event) {
                match input_event {
                    InputEvent::Submit(outbound) => {
                        let effect = update(&mut app, Action::SendMessage(outbound));
                        dispatch_effect(effect, &app, &tx, &mut should_quit);
                    }
                    InputEvent::Notice(message) => {
                        app.status_message = message;
                    }
                    InputEvent::ContentChanged => {}
                }
            }
        }

        if should_quit {
            break;
        }

        // Handle actions from background tasks (replies, logins, transcripts)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);

            // Auth results also drive the overlay
            match &action {
                Action::LoginCompleted(_) => {
                    tui.auth_modal = None;
                }
                Action::LoginFailed(error) => {
                    if let Some(modal) = &mut tui.auth_modal {
                        modal.pending = false;
                        modal.error = Some(error.clone());
                    }
                }
                _ => {}
            }

            let effect = update(&mut app, action);
            dispatch_effect(effect, &app, &tx, &mut should_quit);
        }

        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Spawn whatever background work an `update()` call asked for.
fn dispatch_effect(effect: Effect, app: &App, tx: &mpsc::Sender<Action>, should_quit: &mut bool) {
    match effect {
        Effect::SpawnReply {
            conversation_id,
            content,
            kind,
        } => {
            spawn_reply(app.backend.clone(), conversation_id, content, kind, tx.clone());
        }
        Effect::SpawnLogin(request) => {
            spawn_login(app.identity.clone(), request, tx.clone());
        }
        Effect::Quit => *should_quit = true,
        Effect::None => {}
    }
}

/// Drive the recording state machine for Ctrl+R. A failed device start
/// surfaces as a status message, never a crash.
fn toggle_recording(app: &mut App, tui: &mut TuiState, tx: &mpsc::Sender<Action>) {
    match tui.input_box.draft.recording() {
        RecordingState::Idle => match tui.microphone.start() {
            Ok(()) => {
                // Draft transition cannot fail from Idle
                let _ = tui.input_box.draft.start_recording();
                app.status_message = String::from("Recording... Ctrl+R to stop");
            }
            Err(e) => {
                update(app, Action::MicrophoneDenied(e.to_string()));
            }
        },
        RecordingState::Recording => {
            let _ = tui.input_box.draft.stop_recording();
            match tui.microphone.stop() {
                Ok(audio) => {
                    // Capture the conversation id now, so the transcript
                    // still lands here if the user switches away before it
                    // resolves.
                    let conversation_id = app.registry.active_id();
                    app.status_message = String::from("Transcribing...");
                    spawn_transcription(app.transcriber.clone(), conversation_id, audio, tx.clone());
                }
                Err(e) => {
                    update(app, Action::MicrophoneDenied(e.to_string()));
                }
            }
        }
    }
}

fn spawn_reply(
    backend: Arc<dyn ResponseBackend>,
    conversation_id: i64,
    content: String,
    kind: MessageKind,
    tx: mpsc::Sender<Action>,
) {
    info!(
        "Spawning {} reply for conversation {conversation_id}",
        kind.tag().unwrap_or("text")
    );
    tokio::spawn(async move {
        let request = ReplyRequest {
            content: &content,
            kind,
            conversation_id,
        };
        let action = match backend.respond(request).await {
            Ok(reply) => Action::ReplyArrived {
                conversation_id,
                content: reply,
            },
            Err(e) => Action::ReplyFailed {
                conversation_id,
                error: e.to_string(),
            },
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver reply for conversation {conversation_id}: receiver dropped");
        }
    });
}

fn spawn_login(
    identity: Arc<dyn IdentityProvider>,
    request: crate::backend::AuthRequest,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning {} request", request.mode.label());
    tokio::spawn(async move {
        let action = match identity.authenticate(request).await {
            Ok(session) => Action::LoginCompleted(session),
            Err(e) => Action::LoginFailed(e.to_string()),
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver login result: receiver dropped");
        }
    });
}

fn spawn_transcription(
    transcriber: Arc<dyn Transcriber>,
    conversation_id: i64,
    audio: Vec<u8>,
    tx: mpsc::Sender<Action>,
) {
    info!(
        "Spawning transcription for conversation {conversation_id} ({} bytes)",
        audio.len()
    );
    tokio::spawn(async move {
        let action = match transcriber.transcribe(&audio).await {
            Ok(transcript) => Action::TranscriptReady {
                conversation_id,
                transcript,
            },
            Err(e) => Action::TranscriptFailed(e.to_string()),
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver transcript: receiver dropped");
        }
    });
}
