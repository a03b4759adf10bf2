use arpvakt_core::events::FeedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Change notification failed: {0}")]
    Feed(#[from] FeedError),
}
