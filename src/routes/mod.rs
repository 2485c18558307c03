pub mod health;
pub mod notes;
pub mod users;
pub mod validation;

pub use health::{health_check, welcome};
pub use notes::{create_note, get_note, list_notes, update_note};
pub use users::{current_user, login, logout, register_user};
