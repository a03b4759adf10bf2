//! Collaborator interfaces over the persisted collections.

use async_trait::async_trait;

use arpvakt_core::types::{DetectorSetting, SecurityReport, UserAccount};

use crate::error::StoreError;

/// Access to the single persisted settings record.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current setting. If the record does not exist it is created with
    /// `enabled = false` and that default is returned.
    async fn load_or_create(&self) -> Result<DetectorSetting, StoreError>;

    /// Overwrite the detector toggle, publishing a change notification.
    async fn set_enabled(&self, enabled: bool) -> Result<(), StoreError>;
}

/// Write access to the report collection.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a new report, publishing an insert notification.
    async fn insert(&self, report: SecurityReport) -> Result<(), StoreError>;
}

/// Read access to account records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All accounts with notifications enabled.
    async fn notified_users(&self) -> Result<Vec<UserAccount>, StoreError>;
}
