//! Engine runtime - coordinates the supervisor and notifier against the
//! change feeds.
//!
//! Each feed gets a dedicated drain task in a poll-and-sleep loop; the
//! handlers run to completion per event, so events within a feed are
//! handled in commit order. Mail fan-out batches are spawned off the
//! report drain so a slow batch never stalls subsequent reports; the
//! drain waits for outstanding batches before exiting.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use arpvakt_config::ArpvaktConfig;
use arpvakt_core::events::{ChangeFeed, ReportInserted, SettingChange};
use arpvakt_notify::{LogMailer, Mailer, Notifier, SmtpMailer};
use arpvakt_storage::{MemoryStore, SettingsStore, UserStore};
use arpvakt_supervisor::{DetectorSupervisor, SupervisorError};
use arpvakt_telemetry::MetricsRecorder;

use crate::error::EngineError;

const DRAIN_IDLE: Duration = Duration::from_millis(10);

/// Coordinates the supervisor and notification pipeline.
pub struct EngineRuntime {
    supervisor: Arc<DetectorSupervisor>,
    notifier: Arc<Notifier>,
    setting_feed: Arc<ChangeFeed<SettingChange>>,
    report_feed: Arc<ChangeFeed<ReportInserted>>,
}

/// Assemble a runtime over the given store, picking the SMTP or log-only
/// mailer from configuration.
pub fn build_runtime(
    config: &ArpvaktConfig,
    store: Arc<MemoryStore>,
    metrics: Arc<MetricsRecorder>,
) -> Result<Arc<EngineRuntime>, EngineError> {
    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(SmtpMailer::from_config(&config.mail)?)
    } else {
        info!("Mail transport disabled; alerts will be logged only");
        Arc::new(LogMailer)
    };

    let supervisor = Arc::new(DetectorSupervisor::new(
        config.detector.clone(),
        store.clone() as Arc<dyn SettingsStore>,
        metrics.clone(),
    ));
    let notifier = Arc::new(Notifier::new(
        store.clone() as Arc<dyn UserStore>,
        mailer,
        supervisor.clone(),
        metrics,
    ));

    Ok(Arc::new(EngineRuntime {
        supervisor,
        notifier,
        setting_feed: store.setting_feed(),
        report_feed: store.report_feed(),
    }))
}

impl EngineRuntime {
    /// Perform the startup reconcile and drain both feeds until they are
    /// closed and empty.
    pub async fn run(self: Arc<Self>) -> Result<(), EngineError> {
        info!("Starting engine runtime");

        // Startup read: creates the settings record disabled when absent
        // and matches process state to whatever is already persisted. A
        // spawn failure leaves the handle unset and the next setting
        // change retries, so the pipeline keeps draining; only a broken
        // settings store is fatal.
        if let Err(e) = self.supervisor.reconcile().await {
            match e {
                SupervisorError::Spawn(_) => warn!("Startup reconcile failed: {e}"),
                other => return Err(other.into()),
            }
        }

        let settings_task = tokio::spawn(drain_setting_feed(
            self.setting_feed.clone(),
            self.notifier.clone(),
        ));
        let reports_task = tokio::spawn(drain_report_feed(
            self.report_feed.clone(),
            self.notifier.clone(),
        ));

        let (settings_result, reports_result) = tokio::join!(settings_task, reports_task);
        settings_result?;
        reports_result?;

        info!("Engine runtime drained");
        Ok(())
    }

    /// Stop accepting new change events; `run` returns once the queued
    /// backlog is handled.
    pub fn close(&self) {
        self.setting_feed.close();
        self.report_feed.close();
    }

    pub fn supervisor(&self) -> Arc<DetectorSupervisor> {
        self.supervisor.clone()
    }
}

async fn drain_setting_feed(feed: Arc<ChangeFeed<SettingChange>>, notifier: Arc<Notifier>) {
    debug!("Settings feed drain started");
    loop {
        match feed.poll() {
            Some(change) => notifier.on_setting_changed(&change).await,
            None if feed.is_drained() => break,
            None => sleep(DRAIN_IDLE).await,
        }
    }
    debug!("Settings feed drain finished");
}

async fn drain_report_feed(feed: Arc<ChangeFeed<ReportInserted>>, notifier: Arc<Notifier>) {
    debug!("Report feed drain started");
    let mut batches = JoinSet::new();
    loop {
        while batches.try_join_next().is_some() {}
        match feed.poll() {
            Some(inserted) => {
                let notifier = notifier.clone();
                batches.spawn(async move { notifier.on_report_inserted(&inserted).await });
            }
            None if feed.is_drained() => break,
            None => sleep(DRAIN_IDLE).await,
        }
    }
    while let Some(result) = batches.join_next().await {
        if let Err(e) = result {
            warn!("Notification batch panicked: {e}");
        }
    }
    debug!("Report feed drain finished");
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    use arpvakt_core::types::{SecurityReport, ARP_SPOOFING};
    use arpvakt_storage::ReportStore;

    fn test_config() -> ArpvaktConfig {
        let mut config = ArpvaktConfig::default();
        config.detector.command = "sleep".into();
        config.detector.args = vec!["5".into()];
        config
    }

    fn arp_report() -> SecurityReport {
        SecurityReport {
            kind: ARP_SPOOFING.into(),
            source_ip: "192.168.1.80".into(),
            mac_address: "aa:bb:cc:dd:ee:01".into(),
            description: "[Expected MAC] aa:bb:cc:dd:ee:01  |  [Spoofed MAC] aa:bb:cc:dd:ee:02"
                .into(),
            detected_by: "ARP Spoof Detector".into(),
            recommendation: "Verify the gateway MAC".into(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn startup_reconcile_creates_disabled_record() {
        let store = Arc::new(MemoryStore::new(64));
        let metrics = Arc::new(MetricsRecorder::new());
        let runtime = build_runtime(&test_config(), store.clone(), metrics.clone()).unwrap();

        runtime.close();
        runtime.run().await.unwrap();

        assert!(!store.load_or_create().await.unwrap().enabled);
        assert_eq!(metrics.detector_spawns.get() as u64, 0);
    }

    #[tokio::test]
    async fn toggles_and_reports_flow_end_to_end() {
        let store = Arc::new(MemoryStore::new(64));
        store.add_user("a@example.com", true);
        store.add_user("b@example.com", true);
        store.add_user("mute@example.com", false);
        store.add_user("c@example.com", true);

        let metrics = Arc::new(MetricsRecorder::new());
        let runtime = build_runtime(&test_config(), store.clone(), metrics.clone()).unwrap();
        let run = tokio::spawn(runtime.clone().run());

        store.set_enabled(true).await.unwrap();
        store.insert(arp_report()).await.unwrap();
        sleep(Duration::from_millis(400)).await;

        assert!(runtime.supervisor().is_running());
        assert_eq!(metrics.detector_spawns.get() as u64, 1);
        assert_eq!(metrics.notifications_sent.get() as u64, 3);

        store.set_enabled(false).await.unwrap();
        sleep(Duration::from_millis(200)).await;
        assert!(!runtime.supervisor().is_running());
        assert_eq!(metrics.detector_terminations.get() as u64, 1);

        runtime.close();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn startup_spawn_failure_keeps_pipeline_alive() {
        let store = Arc::new(MemoryStore::new(64));
        store.add_user("a@example.com", true);
        store.set_enabled(true).await.unwrap();

        let mut config = test_config();
        config.detector.command = "/nonexistent/arpvakt-detector".into();
        let metrics = Arc::new(MetricsRecorder::new());
        let runtime = build_runtime(&config, store.clone(), metrics.clone()).unwrap();
        let run = tokio::spawn(runtime.clone().run());

        // Both the startup reconcile and the queued toggle event hit the
        // spawn failure; the report feed must still be served.
        store.insert(arp_report()).await.unwrap();
        sleep(Duration::from_millis(400)).await;
        assert_eq!(metrics.notifications_sent.get() as u64, 1);

        runtime.close();
        run.await.unwrap().unwrap();
        assert!(!runtime.supervisor().is_running());
        assert_eq!(metrics.detector_spawns.get() as u64, 0);
    }

    #[tokio::test]
    async fn rapid_double_toggle_settles_without_duplicates() {
        let store = Arc::new(MemoryStore::new(64));
        let metrics = Arc::new(MetricsRecorder::new());
        let runtime = build_runtime(&test_config(), store.clone(), metrics.clone()).unwrap();
        let run = tokio::spawn(runtime.clone().run());

        // Two writes of the same value land as two feed events; the
        // second reconcile must be a no-op.
        store.set_enabled(true).await.unwrap();
        store.set_enabled(true).await.unwrap();
        sleep(Duration::from_millis(400)).await;

        assert!(runtime.supervisor().is_running());
        assert_eq!(metrics.detector_spawns.get() as u64, 1);

        store.set_enabled(false).await.unwrap();
        runtime.close();
        run.await.unwrap().unwrap();
        assert!(!runtime.supervisor().is_running());
        assert_eq!(metrics.detector_terminations.get() as u64, 1);
    }
}
