//! # TitleBar Component
//!
//! Top status bar: conversation title, signed-in identity, and the current
//! status message. Purely presentational; all fields are props from the
//! parent and nothing is cached between frames.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    /// Title of the active conversation.
    pub conversation_title: String,
    /// Email of the signed-in user, or None when browsing as a guest.
    pub identity: Option<String>,
    /// Transient status (e.g. "Welcome to Parley!", errors, notices).
    pub status_message: String,
}

impl TitleBar {
    pub fn new(
        conversation_title: String,
        identity: Option<String>,
        status_message: String,
    ) -> Self {
        Self {
            conversation_title,
            identity,
            status_message,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let who = self.identity.as_deref().unwrap_or("guest");

        let mut spans = vec![
            Span::styled(
                " Parley ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("| "),
            Span::raw(self.conversation_title.clone()),
            Span::styled(format!(" | {who}"), Style::default().fg(Color::DarkGray)),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::styled(
                format!(" | {}", self.status_message),
                Style::default().fg(Color::DarkGray),
            ));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
