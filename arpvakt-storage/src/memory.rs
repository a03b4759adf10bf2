//! In-memory store backend.
//!
//! Backs the simulate mode and the test suite with the same publish
//! semantics a database change stream provides: every settings write and
//! report insert lands on the corresponding change feed in commit order.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use arpvakt_core::events::{ChangeFeed, ReportInserted, SettingChange};
use arpvakt_core::types::{DetectorSetting, SecurityReport, UserAccount, FIELD_ENABLED};

use crate::error::StoreError;
use crate::stores::{ReportStore, SettingsStore, UserStore};

pub struct MemoryStore {
    // None until the record is lazily created on first read or write.
    setting: Mutex<Option<DetectorSetting>>,
    users: Mutex<Vec<UserAccount>>,
    reports: Mutex<Vec<SecurityReport>>,
    setting_feed: Arc<ChangeFeed<SettingChange>>,
    report_feed: Arc<ChangeFeed<ReportInserted>>,
}

impl MemoryStore {
    pub fn new(feed_capacity: usize) -> Self {
        Self {
            setting: Mutex::new(None),
            users: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
            setting_feed: Arc::new(ChangeFeed::with_capacity(feed_capacity)),
            report_feed: Arc::new(ChangeFeed::with_capacity(feed_capacity)),
        }
    }

    /// Subscription for settings-record updates.
    pub fn setting_feed(&self) -> Arc<ChangeFeed<SettingChange>> {
        Arc::clone(&self.setting_feed)
    }

    /// Subscription for report insertions.
    pub fn report_feed(&self) -> Arc<ChangeFeed<ReportInserted>> {
        Arc::clone(&self.report_feed)
    }

    pub fn add_user(&self, username: &str, notifications_enabled: bool) {
        self.users.lock().push(UserAccount {
            username: username.into(),
            notifications_enabled,
        });
    }

    /// Number of persisted reports, for scenario bookkeeping.
    pub fn report_count(&self) -> usize {
        self.reports.lock().len()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_or_create(&self) -> Result<DetectorSetting, StoreError> {
        let mut setting = self.setting.lock();
        Ok(*setting.get_or_insert_with(DetectorSetting::default))
    }

    async fn set_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        {
            let mut setting = self.setting.lock();
            setting.get_or_insert_with(DetectorSetting::default).enabled = enabled;
        }
        self.setting_feed
            .publish(SettingChange::new(vec![FIELD_ENABLED.into()]))?;
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert(&self, report: SecurityReport) -> Result<(), StoreError> {
        self.reports.lock().push(report.clone());
        self.report_feed.publish(ReportInserted { report })?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn notified_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        Ok(self
            .users
            .lock()
            .iter()
            .filter(|u| u.notifications_enabled)
            .cloned()
            .collect())
    }
}
