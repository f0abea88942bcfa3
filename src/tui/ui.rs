use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{AuthModal, MessageList, Sidebar, TitleBar};

/// Top-level frame layout: one-line title bar, the conversation, then the
/// input box sized to its buffer. Overlays (sidebar, auth) render last so
/// they sit above everything else.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let layout = Layout::vertical([Length(1), Min(0), Length(input_height)]);
    let [title_area, main_area, input_area] = layout.areas(frame.area());

    let conversation = app.registry.active();

    let mut title_bar = TitleBar::new(
        conversation.title.clone(),
        app.session.as_ref().map(|s| s.email.clone()),
        app.status_message.clone(),
    );
    title_bar.render(frame, title_area);

    let mut message_list = MessageList::new(
        &mut tui.message_list,
        &conversation.messages,
        app.has_pending_reply(conversation.id),
        spinner_frame,
    );
    message_list.render(frame, main_area);

    tui.input_box.render(frame, input_area);

    if let Some(sidebar_state) = &mut tui.sidebar {
        Sidebar::new(sidebar_state).render(frame, frame.area());
    }
    if let Some(auth_state) = &tui.auth_modal {
        AuthModal::new(auth_state).render(frame, frame.area());
    }
}
