pub mod handlers;
pub mod types;

pub use handlers::{handle_event, handle_tui_msg};
pub use types::{App, TuiMsg};
