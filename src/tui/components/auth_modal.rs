//! # Auth Modal Component
//!
//! Centered sign-in / sign-up form, opened with Ctrl+L. Purely cosmetic
//! credential capture: validation only checks that required fields are
//! non-empty before handing an `AuthRequest` to the identity provider.
//!
//! Tab cycles fields (name is only reachable in sign-up mode), Ctrl+T
//! toggles between sign-in and sign-up, Enter submits, Esc dismisses.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::backend::{AuthMode, AuthRequest};
use crate::tui::event::TuiEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Field {
    Name,
    Email,
    Password,
}

/// Persistent state for the auth overlay.
pub struct AuthModalState {
    pub mode: AuthMode,
    focus: Field,
    name: String,
    email: String,
    password: String,
    /// True while a login request is in flight; input is ignored except Esc.
    pub pending: bool,
    /// Validation or provider error shown under the form.
    pub error: Option<String>,
}

/// Events emitted by the auth modal.
pub enum AuthEvent {
    Submit(AuthRequest),
    Dismiss,
}

impl AuthModalState {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::SignIn,
            focus: Field::Email,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            pending: false,
            error: None,
        }
    }

    /// Flip between sign-in and sign-up. The name field only exists in
    /// sign-up, so focus falls back to email when it disappears.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        if self.mode == AuthMode::SignIn && self.focus == Field::Name {
            self.focus = Field::Email;
        }
        self.error = None;
    }

    fn focused_buffer(&mut self) -> &mut String {
        match self.focus {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn next_field(&mut self) {
        self.focus = match (self.mode, self.focus) {
            (AuthMode::SignUp, Field::Name) => Field::Email,
            (_, Field::Email) => Field::Password,
            (AuthMode::SignUp, Field::Password) => Field::Name,
            (AuthMode::SignIn, Field::Password) => Field::Email,
            (AuthMode::SignIn, Field::Name) => Field::Email,
        };
    }

    fn validate(&self) -> Result<AuthRequest, String> {
        if self.email.trim().is_empty() {
            return Err("Email is required".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        if self.mode == AuthMode::SignUp && self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        let name = match self.mode {
            AuthMode::SignUp => Some(self.name.trim().to_string()),
            AuthMode::SignIn => None,
        };
        Ok(AuthRequest {
            mode: self.mode,
            name,
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<AuthEvent> {
        if self.pending {
            // Only allow bailing out while the provider is working
            return matches!(event, TuiEvent::Escape).then_some(AuthEvent::Dismiss);
        }

        match event {
            TuiEvent::Escape => Some(AuthEvent::Dismiss),
            TuiEvent::ToggleAuthMode => {
                self.toggle_mode();
                None
            }
            TuiEvent::Tab | TuiEvent::CursorDown => {
                self.next_field();
                None
            }
            TuiEvent::CursorUp => {
                // Cycling a 2-3 element ring backwards == forwards twice
                self.next_field();
                if self.mode == AuthMode::SignUp {
                    self.next_field();
                }
                None
            }
            TuiEvent::InputChar(c) if *c != '\n' => {
                self.focused_buffer().push(*c);
                self.error = None;
                None
            }
            TuiEvent::Paste(data) => {
                let flat = data.replace(['\n', '\r'], "");
                self.focused_buffer().push_str(&flat);
                None
            }
            TuiEvent::Backspace => {
                self.focused_buffer().pop();
                None
            }
            TuiEvent::Submit => match self.validate() {
                Ok(request) => {
                    self.pending = true;
                    self.error = None;
                    Some(AuthEvent::Submit(request))
                }
                Err(message) => {
                    self.error = Some(message);
                    None
                }
            },
            _ => None,
        }
    }
}

impl Default for AuthModalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient render wrapper for the auth overlay.
pub struct AuthModal<'a> {
    state: &'a AuthModalState,
}

impl<'a> AuthModal<'a> {
    pub fn new(state: &'a AuthModalState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = 46.min(area.width.saturating_sub(4));
        let height = if self.state.mode == AuthMode::SignUp {
            13
        } else {
            11
        };
        let overlay = centered_fixed(width, height, area);

        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.state.mode.header()))
            .title_bottom(Line::from(" Tab Next · Ctrl+T Switch · Esc Close ").centered())
            .padding(Padding::uniform(1));

        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let mut constraints = vec![];
        if self.state.mode == AuthMode::SignUp {
            constraints.push(Constraint::Length(2)); // name
        }
        constraints.push(Constraint::Length(2)); // email
        constraints.push(Constraint::Length(2)); // password
        constraints.push(Constraint::Length(1)); // status line
        let rows = Layout::vertical(constraints).split(inner);

        let mut row = 0;
        if self.state.mode == AuthMode::SignUp {
            render_field(
                frame,
                rows[row],
                "Name",
                &self.state.name,
                self.state.focus == Field::Name,
                false,
            );
            row += 1;
        }
        render_field(
            frame,
            rows[row],
            "Email",
            &self.state.email,
            self.state.focus == Field::Email,
            false,
        );
        render_field(
            frame,
            rows[row + 1],
            "Password",
            &self.state.password,
            self.state.focus == Field::Password,
            true,
        );

        let status = if self.state.pending {
            Paragraph::new("Please wait...")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
        } else if let Some(error) = &self.state.error {
            Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
        } else {
            Paragraph::new(format!("Enter to {}", self.state.mode.label()))
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
        };
        frame.render_widget(status, rows[row + 2]);
    }
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    masked: bool,
) {
    let display = if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "▏" } else { "" };
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let [label_area, value_area] =
        Layout::horizontal([Constraint::Length(10), Constraint::Min(0)]).areas(area);
    frame.render_widget(Paragraph::new(format!("{label}:")).style(label_style), label_area);
    frame.render_widget(Paragraph::new(format!("{display}{cursor}")), value_area);
}

fn centered_fixed(width: u16, height: u16, outer: Rect) -> Rect {
    let x = outer.x + outer.width.saturating_sub(width) / 2;
    let y = outer.y + outer.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(outer.width), height.min(outer.height))
}
