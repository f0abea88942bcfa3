use ratatui::Frame;
use ratatui::layout::Rect;

/// Something that can paint itself into a region of the frame.
///
/// Parley splits its widgets in two: persistent `*State` structs that live in
/// `TuiState` across frames, and cheap per-frame wrappers that borrow that
/// state plus whatever app data they display. Both implement this trait.
///
/// `render` takes `&mut self` because drawing is where presentation state
/// gets maintained: the message list refreshes its height cache here, the
/// sidebar syncs its list selection, and so on.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Translates raw terminal events into a component's own event vocabulary.
///
/// The event loop gives the focused component every `TuiEvent`; the component
/// either absorbs it (cursor movement, typing) or surfaces a domain-level
/// `Event` (a submission, a selection) for the loop to act on. `None` means
/// the event needed nothing from the caller.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
