//! Change-event handlers and the alert mail fan-out.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tracing::{debug, error, info, warn};

use arpvakt_core::events::{ReportInserted, SettingChange};
use arpvakt_core::types::{SecurityReport, ARP_SPOOFING, FIELD_ENABLED};
use arpvakt_storage::UserStore;
use arpvakt_supervisor::DetectorSupervisor;
use arpvakt_telemetry::{EventLogger, MetricsRecorder};

use crate::extract::spoofed_mac;
use crate::mailer::Mailer;

pub const ALERT_SUBJECT: &str = "Security Alert: ARP Spoofing Detected";

/// Reacts to the two change feeds: settings updates re-reconcile the
/// supervisor, report insertions of the distinguished category fan out
/// alert mail to every opted-in account.
pub struct Notifier {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    supervisor: Arc<DetectorSupervisor>,
    metrics: Arc<MetricsRecorder>,
}

impl Notifier {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        supervisor: Arc<DetectorSupervisor>,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            users,
            mailer,
            supervisor,
            metrics,
        }
    }

    /// Settings-feed handler. Only the detector toggle matters; writes
    /// touching other fields are ignored so future settings don't churn
    /// the process.
    pub async fn on_setting_changed(&self, change: &SettingChange) {
        if !change.touches(FIELD_ENABLED) {
            debug!(?change, "Setting change without detector toggle; ignored");
            return;
        }
        if let Err(e) = self.supervisor.reconcile().await {
            warn!("Reconcile after setting change failed: {e}");
        }
    }

    /// Report-feed handler. Other report categories are surfaced by the
    /// dashboard's own polling, not this pathway.
    pub async fn on_report_inserted(&self, inserted: &ReportInserted) {
        if inserted.report.kind != ARP_SPOOFING {
            debug!(kind = %inserted.report.kind, "Report category not mailed");
            return;
        }
        self.notify_users(&inserted.report).await;
    }

    /// Mail every opted-in account. Each recipient is independent: a
    /// failed send is logged and counted, and the batch continues.
    pub async fn notify_users(&self, report: &SecurityReport) {
        let users = match self.users.notified_users().await {
            Ok(users) => users,
            Err(e) => {
                error!("Failed to load notification recipients: {e}");
                return;
            }
        };
        if users.is_empty() {
            info!("No notification recipients opted in");
            return;
        }

        let body = alert_body(report);
        for user in &users {
            let timer = self.metrics.mail_send_latency.start_timer();
            match self.mailer.send(&user.username, ALERT_SUBJECT, &body).await {
                Ok(()) => {
                    self.metrics.notifications_sent.inc();
                    info!(to = %user.username, "Alert mail sent");
                }
                Err(e) => {
                    self.metrics.notification_failures.inc();
                    error!(to = %user.username, "Alert mail failed: {e}");
                }
            }
            timer.observe_duration();
        }

        EventLogger::log_event(
            "arp_spoof_alert",
            vec![
                KeyValue::new("source_ip", report.source_ip.clone()),
                KeyValue::new("recipients", users.len().to_string()),
            ],
        )
        .await;
    }
}

/// Fixed plain-text alert template.
fn alert_body(report: &SecurityReport) -> String {
    let spoofed = spoofed_mac(&report.description).unwrap_or("unknown");
    format!(
        "ARP spoofing activity was detected on your network.\n\n\
         Source IP: {}\n\
         Expected MAC: {}\n\
         Spoofed MAC: {}\n\
         Detected At: {}\n\n\
         Recommendation: {}\n",
        report.source_ip,
        report.mac_address,
        spoofed,
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        report.recommendation
    )
}
