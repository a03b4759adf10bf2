//! Persisted records shared across the supervisor and notifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report category routed through the mail fan-out path.
pub const ARP_SPOOFING: &str = "ARP Spoofing";

/// Field name published when the detector toggle changes.
pub const FIELD_ENABLED: &str = "enabled";

/// Single persisted settings record controlling the detector process.
///
/// Created lazily with `enabled = false` on first read; mutated by any
/// external writer (e.g. an admin toggling the dashboard control).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorSetting {
    pub enabled: bool,
}

/// Persisted security event produced by the detection components.
///
/// Read-only from the notifier's perspective; it only observes insertions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecurityReport {
    /// Report category, e.g. "ARP Spoofing".
    #[serde(rename = "type")]
    pub kind: String,
    /// Source address of the offending host.
    pub source_ip: String,
    /// Expected MAC address of the reported host.
    pub mac_address: String,
    /// Free-text details from the detector; the spoofed MAC is embedded
    /// behind a fixed label inside this string.
    pub description: String,
    /// Component that raised the report.
    pub detected_by: String,
    /// Operator-facing remediation text.
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

/// Account record; `username` doubles as the mail address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub notifications_enabled: bool,
}

/// Observed lifecycle of the external detector process.
///
/// `Running` is entered optimistically on spawn; the detector emits no
/// ready signal. Leaving `Running` happens via an explicit stop or an
/// unsolicited exit notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    Stopped,
    Starting,
    Running,
    Crashed,
}
