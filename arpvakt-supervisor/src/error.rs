use arpvakt_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Settings read failed: {0}")]
    Store(#[from] StoreError),

    #[error("Detector spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
}
