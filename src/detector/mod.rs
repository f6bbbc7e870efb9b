pub mod comeback;
pub mod mispricing;
pub mod sniper;

pub use comeback::ComebackTracker;
