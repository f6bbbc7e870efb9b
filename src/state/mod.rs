pub mod board_store;
pub mod session;

pub use board_store::BoardStore;
pub use session::{AlertDeduplicator, SessionState};
