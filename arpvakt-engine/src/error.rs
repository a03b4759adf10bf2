use thiserror::Error;
use tokio::task::JoinError;

use arpvakt_notify::NotifyError;
use arpvakt_supervisor::SupervisorError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
}
