pub mod game;
pub mod summary;
pub mod teams;

pub use game::normalize_event;
pub use teams::TeamDirectory;
