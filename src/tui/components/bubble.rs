use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Padding, Paragraph, Widget};

use crate::core::message::{Message, Sender};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A stateless component that renders a single chat message.
///
/// `MessageBubble` is a **transient component**: created fresh each frame with
/// a reference to the message it renders. Sender determines the styling:
///
/// - **User** (green): messages typed, spoken, or attached by the human
/// - **Assistant** (blue): simulated replies
///
/// Voice and image messages carry a tag next to the role so the origin of the
/// content stays visible after submission.
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) predicts rendered height by
/// running the same `textwrap` pass render uses, so the parent list can lay
/// out its scroll canvas without rendering first.
#[derive(Clone, Copy)]
pub struct MessageBubble<'a> {
    pub message: &'a Message,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self { message }
    }

    /// Calculate the height required for this message at the given width.
    ///
    /// Uses the same per-source-line wrapping as `render`, so calculated and
    /// actual height stay 1:1. An attached file adds one extra line below
    /// the content.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Terminal too narrow for borders + padding. Return 1 row so the
            // message still occupies space in the layout.
            return 1;
        }

        let file_lines: u16 = if message.file.is_some() { 1 } else { 0 };

        let content = message.content.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD + file_lines;
        }

        // wrap() yields one empty row for a blank source line, so every
        // source line contributes at least one row.
        let lines: usize = wrap_content(content, content_width as usize)
            .map(|wrapped| wrapped.len())
            .sum();
        (lines as u16).max(1) + file_lines + VERTICAL_OVERHEAD
    }

    fn role(&self) -> String {
        let name = match self.message.sender {
            Sender::User => "you",
            Sender::Assistant => "assistant",
        };
        match self.message.kind.tag() {
            None => format!(" {name} "),
            Some(tag) => format!(" {name} [{tag}] "),
        }
    }
}

impl<'a> Widget for MessageBubble<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = match self.message.sender {
            Sender::User => Style::default().fg(Color::Green),
            Sender::Assistant => Style::default().fg(Color::Blue),
        };

        let border_style = style.add_modifier(Modifier::DIM);
        let timestamp = self
            .message
            .timestamp
            .with_timezone(&Local)
            .format(" %H:%M ")
            .to_string();

        let block = Block::bordered()
            .title(self.role())
            .title_bottom(Line::from(timestamp).right_aligned())
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        // Wrap here rather than via Paragraph's Wrap so embedded newlines
        // survive and the row count matches calculate_height exactly.
        let mut text: Vec<Line> =
            wrap_content(self.message.content.trim(), inner_area.width as usize)
                .flatten()
                .map(|row| Line::from(row.into_owned()))
                .collect();
        if let Some(file) = &self.message.file {
            text.push(Line::styled(
                format!("📎 {file}"),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let paragraph = Paragraph::new(text).style(style);
        paragraph.render(inner_area, buf);
    }
}

/// Wraps each source line of `content` independently, preserving embedded
/// newlines as hard breaks. Yields one `Vec` of wrapped rows per source line
/// (empty for a blank source line).
fn wrap_content(
    content: &str,
    width: usize,
) -> impl Iterator<Item = Vec<std::borrow::Cow<'_, str>>> {
    content.split('\n').map(move |line| {
        let options = textwrap::Options::new(width)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);
        textwrap::wrap(line, options)
    })
}

impl<'a> Component for MessageBubble<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
