pub mod content;
pub mod dialogs;
pub mod keybindings;
pub mod terminal_guard;
pub mod view;

pub use dialogs::{AlertDialog, HelpDialog};
pub use view::TuiView;
