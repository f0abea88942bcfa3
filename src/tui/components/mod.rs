pub mod auth_modal;
pub mod bubble;
pub mod input_box;
pub mod message_list;
pub mod sidebar;
pub mod title_bar;

pub use auth_modal::{AuthEvent, AuthModal, AuthModalState};
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use title_bar::TitleBar;
