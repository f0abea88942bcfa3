//! # InputBox Component
//!
//! Captures one submission at a time: typed text, an attached image, or a
//! finished recording (the recording toggle itself is a global shortcut
//! handled by the event loop; this component renders the indicator).
//!
//! ## Commands
//!
//! Two buffer-level commands stand in for the file picker:
//!
//! - `/attach <path>` — attach one image file (extension-checked)
//! - `/detach` — remove the pending attachment
//!
//! ## Keys
//!
//! Enter submits; Shift+Enter (or Ctrl+J) inserts a newline instead.
//! Empty submissions with no attachment are rejected silently, matching
//! the disabled-send-button affordance this mirrors.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::core::draft::{Draft, Outbound, RecordingState};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Borders top + bottom.
const VERTICAL_OVERHEAD: u16 = 2;
/// Content lines shown before the box stops growing.
const MAX_VISIBLE_LINES: u16 = 6;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A normalized submission ready for the reducer.
    Submit(Outbound),
    /// Feedback to surface in the status bar (attach/detach results).
    Notice(String),
    /// Text content changed.
    ContentChanged,
}

/// Text input component owning the in-progress [`Draft`].
pub struct InputBox {
    pub draft: Draft,
    /// Byte offset of the cursor within `draft.text`.
    cursor: usize,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            draft: Draft::new(),
            cursor: 0,
        }
    }

    /// Required height for the current buffer, clamped to the viewport
    /// limit. Used by the parent layout before rendering.
    pub fn calculate_height(&self, content_width: u16) -> u16 {
        let width = content_width.saturating_sub(2) as usize;
        let lines = wrap_lines(&self.draft.text, width).len().max(1) as u16;
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Handles `/attach` and `/detach`; returns None when the buffer is a
    /// regular message.
    fn try_command(&mut self) -> Option<InputEvent> {
        let trimmed = self.draft.text.trim();
        if let Some(rest) = trimmed.strip_prefix("/attach") {
            // Only the command itself, not e.g. "/attachments"
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let path = rest.trim().to_string();
                let event = if path.is_empty() {
                    // Bare "/attach" is a malformed command, not message text
                    InputEvent::Notice("Usage: /attach <path>".to_string())
                } else {
                    match self.draft.attach_image(&path) {
                        Ok(()) => InputEvent::Notice(format!("Attached {path}")),
                        Err(e) => InputEvent::Notice(e.to_string()),
                    }
                };
                self.clear_buffer();
                return Some(event);
            }
        }
        if trimmed == "/detach" {
            self.draft.remove_attachment();
            self.clear_buffer();
            return Some(InputEvent::Notice("Attachment removed".to_string()));
        }
        None
    }

    fn clear_buffer(&mut self) {
        self.draft.text.clear();
        self.cursor = 0;
    }

    fn bottom_line(&self) -> Line<'static> {
        if let Some(attachment) = self.draft.attachment() {
            let size = match attachment.size_bytes {
                Some(bytes) => format!(" ({} KB)", bytes.div_ceil(1024)),
                None => String::new(),
            };
            return Line::from(format!(
                " {}{size} — /detach to remove ",
                attachment.path
            ))
            .style(Style::default().fg(Color::Yellow));
        }
        Line::from(" Enter send · Shift+Enter newline · /attach <path> ")
            .style(Style::default().fg(Color::DarkGray))
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (title, title_style) = match self.draft.recording() {
            RecordingState::Recording => (
                "Input — recording... Ctrl+R to stop",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            RecordingState::Idle => ("Input", Style::default()),
        };

        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .title(title)
            .title_style(title_style)
            .title_bottom(self.bottom_line().centered());

        let input = Paragraph::new(self.draft.text.as_str())
            .block(block)
            .style(Style::default().fg(Color::Green));

        frame.render_widget(input, area);

        let (cursor_x, cursor_y) = self.cursor_screen_pos(area);
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

impl InputBox {
    /// Screen position of the cursor: wrap the prefix before the cursor
    /// with the same options as the rendered paragraph.
    fn cursor_screen_pos(&self, area: Rect) -> (u16, u16) {
        let width = area.width.saturating_sub(2) as usize;
        if width == 0 {
            return (area.x + 1, area.y + 1);
        }
        let prefix = &self.draft.text[..self.cursor];
        let lines = wrap_lines(prefix, width);
        let (row, col) = match lines.last() {
            Some(last) if !prefix.is_empty() => {
                // A trailing newline starts a fresh visual line
                if prefix.ends_with('\n') {
                    (lines.len(), 0)
                } else {
                    (lines.len() - 1, last.chars().count())
                }
            }
            _ => (0, 0),
        };
        let row = (row as u16).min(MAX_VISIBLE_LINES.saturating_sub(1));
        (area.x + 1 + col as u16, area.y + 1 + row)
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.draft.text.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.draft.text.insert_str(self.cursor, text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = prev_char_boundary(&self.draft.text, self.cursor);
                    self.draft.text.drain(prev..self.cursor);
                    self.cursor = prev;
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor = prev_char_boundary(&self.draft.text, self.cursor);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorRight => {
                if self.cursor < self.draft.text.len() {
                    self.cursor = next_char_boundary(&self.draft.text, self.cursor);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Submit => {
                if let Some(command_event) = self.try_command() {
                    return Some(command_event);
                }
                let submission = self.draft.take_submission();
                self.cursor = 0;
                submission.map(InputEvent::Submit)
            }
            _ => None,
        }
    }
}

/// Wrap text for display, preserving explicit newlines. `textwrap::wrap`
/// treats the input as one paragraph, so wrap each line separately.
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let options = textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    text.split('\n')
        .flat_map(|line| {
            let wrapped = textwrap::wrap(line, &options);
            if wrapped.is_empty() {
                vec![String::new()]
            } else {
                wrapped.into_iter().map(|l| l.into_owned()).collect()
            }
        })
        .collect()
}

fn prev_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index - 1;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn next_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::MessageKind;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_input_box_new() {
        let input = InputBox::new();
        assert!(input.draft.text.is_empty());
        assert!(input.draft.attachment().is_none());
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();

        let res = input.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.draft.text, "a");

        let res = input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.draft.text, "ab");

        let res = input.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.draft.text, "a");
    }

    #[test]
    fn test_submit_text() {
        let mut input = InputBox::new();
        input.draft.text = "hello".to_string();
        input.cursor = 5;

        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Submit(out)) => {
                assert_eq!(out.content, "hello");
                assert_eq!(out.kind, MessageKind::Text);
            }
            other => panic!("Expected Submit event, got {other:?}"),
        }
        assert!(input.draft.text.is_empty(), "buffer cleared after submit");
    }

    #[test]
    fn test_submit_empty_is_rejected() {
        let mut input = InputBox::new();
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        input.draft.text = "   ".to_string();
        input.cursor = 3;
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_attach_command() {
        let mut input = InputBox::new();
        input.draft.text = "/attach photo.png".to_string();
        input.cursor = input.draft.text.len();

        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Notice(msg)) => assert!(msg.contains("photo.png")),
            other => panic!("Expected Notice, got {other:?}"),
        }
        assert_eq!(input.draft.attachment().unwrap().path, "photo.png");
        assert!(input.draft.text.is_empty());
    }

    #[test]
    fn test_attach_without_path_shows_usage() {
        let mut input = InputBox::new();
        input.draft.text = "/attach".to_string();
        input.cursor = input.draft.text.len();

        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Notice(msg)) => assert!(msg.contains("Usage")),
            other => panic!("Expected Notice, got {other:?}"),
        }
        assert!(input.draft.attachment().is_none());
        assert!(input.draft.text.is_empty(), "buffer cleared, nothing sent");
    }

    #[test]
    fn test_attach_prefix_word_is_plain_text() {
        let mut input = InputBox::new();
        input.draft.text = "/attachments are nice".to_string();
        input.cursor = input.draft.text.len();

        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Submit(out)) => {
                assert_eq!(out.content, "/attachments are nice");
            }
            other => panic!("Expected Submit, got {other:?}"),
        }
    }

    #[test]
    fn test_attach_command_rejects_non_image() {
        let mut input = InputBox::new();
        input.draft.text = "/attach notes.txt".to_string();
        input.cursor = input.draft.text.len();

        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Notice(msg)) => assert!(msg.contains("not an image")),
            other => panic!("Expected Notice, got {other:?}"),
        }
        assert!(input.draft.attachment().is_none());
    }

    #[test]
    fn test_detach_command() {
        let mut input = InputBox::new();
        input.draft.attach_image("photo.png").unwrap();
        input.draft.text = "/detach".to_string();
        input.cursor = input.draft.text.len();

        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Notice(msg)) => assert!(msg.contains("removed")),
            other => panic!("Expected Notice, got {other:?}"),
        }
        assert!(input.draft.attachment().is_none());
    }

    #[test]
    fn test_submit_with_attachment_produces_image_message() {
        let mut input = InputBox::new();
        input.draft.attach_image("photo.png").unwrap();

        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Submit(out)) => {
                assert_eq!(out.kind, MessageKind::Image);
                assert_eq!(out.content, "Image uploaded");
                assert_eq!(out.file.as_deref(), Some("photo.png"));
            }
            other => panic!("Expected Submit, got {other:?}"),
        }
    }

    #[test]
    fn test_newline_char_grows_height() {
        let mut input = InputBox::new();
        assert_eq!(input.calculate_height(40), 3);
        input.handle_event(&TuiEvent::InputChar('a'));
        input.handle_event(&TuiEvent::InputChar('\n'));
        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.calculate_height(40), 4);
    }

    #[test]
    fn test_render_shows_recording_indicator() {
        let backend = TestBackend::new(60, 4);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut input = InputBox::new();
        input.draft.start_recording().unwrap();

        terminal
            .draw(|f| {
                input.render(f, f.area());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text = buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.contains("recording"));
    }
}
