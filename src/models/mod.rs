pub mod note;
pub mod session;
pub mod user;

pub use note::{Note, NoteSummary, NoteUpdate, Scalar};
pub use session::SessionRecord;
pub use user::{PublicUser, User};
