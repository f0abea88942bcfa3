//! # Sidebar Component
//!
//! Full-screen overlay for browsing, selecting, creating, and deleting
//! conversations. Opened with Ctrl+O, dismissed with Esc.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::conversation::ConversationRegistry;
use crate::tui::event::TuiEvent;

/// One row of the conversation list, snapshotted from the registry.
#[derive(Clone, Debug)]
pub struct ConversationRow {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
    pub active: bool,
}

/// Persistent state for the sidebar overlay.
pub struct SidebarState {
    pub rows: Vec<ConversationRow>,
    pub selected: usize,
    pub confirm_delete: bool,
    pub list_state: ListState,
}

impl SidebarState {
    /// Snapshot the registry; the active conversation starts selected.
    pub fn new(registry: &ConversationRegistry) -> Self {
        let rows = snapshot(registry);
        let selected = rows.iter().position(|r| r.active).unwrap_or(0);
        let mut list_state = ListState::default();
        list_state.select(Some(selected));
        Self {
            rows,
            selected,
            confirm_delete: false,
            list_state,
        }
    }

    /// Re-snapshot after the registry changed (create/delete/select). The
    /// selection is clamped, so a rejected delete leaves the view intact.
    pub fn refresh(&mut self, registry: &ConversationRegistry) {
        self.rows = snapshot(registry);
        self.selected = self.selected.min(self.rows.len() - 1);
        self.list_state.select(Some(self.selected));
    }

    /// Handle a key event, returning a SidebarEvent if the overlay should act.
    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<SidebarEvent> {
        // Reset delete confirmation on any non-delete key
        let is_delete_key = matches!(event, TuiEvent::InputChar('d'));
        if !is_delete_key {
            self.confirm_delete = false;
        }

        match event {
            TuiEvent::Escape => Some(SidebarEvent::Dismiss),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(self.rows.len() - 1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::Submit => self
                .rows
                .get(self.selected)
                .map(|row| SidebarEvent::Select(row.id)),
            TuiEvent::InputChar('n') => Some(SidebarEvent::CreateNew),
            TuiEvent::InputChar('d') => {
                if self.confirm_delete {
                    let id = self.rows[self.selected].id;
                    self.confirm_delete = false;
                    Some(SidebarEvent::Delete(id))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }
}

/// Events emitted by the sidebar.
pub enum SidebarEvent {
    Select(i64),
    CreateNew,
    Delete(i64),
    Dismiss,
}

fn snapshot(registry: &ConversationRegistry) -> Vec<ConversationRow> {
    let active_id = registry.active_id();
    registry
        .conversations()
        .iter()
        .map(|c| ConversationRow {
            id: c.id,
            title: c.title.clone(),
            created_at: c.created_at,
            message_count: c.messages.len(),
            active: c.id == active_id,
        })
        .collect()
}

/// Transient render wrapper for the sidebar overlay.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a mut SidebarState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(80, 70, area);

        // Clear underlying content
        frame.render_widget(Clear, overlay);

        let help_text = if self.state.confirm_delete {
            " Press d again to confirm delete | Esc Cancel "
        } else {
            " n New  d Delete  Enter Open  Esc Back "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Conversations ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(help_text).centered())
            .padding(Padding::horizontal(1));

        if self.state.rows.is_empty() {
            // Unreachable given the registry invariant, but render sanely.
            let empty = Paragraph::new("No conversations.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let date = format_timestamp(row.created_at);
                let count = format!("{} msgs", row.message_count);
                let marker = if row.active { "● " } else { "  " };

                // Layout: "● Jan 15  <title>   12 msgs  "
                let inner_width = overlay.width.saturating_sub(4) as usize; // borders + padding
                let fixed_width = marker.width() + date.width() + 2 + count.width() + 2;
                let title_width = inner_width.saturating_sub(fixed_width);
                let title = truncate_str(&row.title, title_width);
                let padded_title =
                    format!("{title}{}", " ".repeat(title_width.saturating_sub(title.width())));

                let style = if i == self.state.selected {
                    if self.state.confirm_delete {
                        Style::default()
                            .fg(Color::Red)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    }
                } else if row.active {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Gray)
                };

                let line = Line::from(vec![
                    Span::styled(marker.to_string(), style),
                    Span::styled(date, style),
                    Span::styled("  ", style),
                    Span::styled(padded_title, style),
                    Span::styled("  ", style),
                    Span::styled(count, style),
                ]);

                ListItem::new(line)
            })
            .collect();

        let list = List::new(items).block(block);

        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}

/// Format a timestamp as "Jan 15" style date.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    use chrono::Local;
    ts.with_timezone(&Local).format("%b %d").to_string()
}

/// Truncate a string to fit within `max_width` columns, adding "..." if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    for c in s.chars() {
        if out.width() + 3 >= max_width {
            break;
        }
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
