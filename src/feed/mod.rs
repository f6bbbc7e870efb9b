pub mod fetcher;
pub mod messages;

pub use fetcher::FeedClient;
