//! ## arpvakt-telemetry::metrics
//! **Prometheus counters for the supervisor and mail fan-out**

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    /// Detector child processes spawned.
    pub detector_spawns: Counter,
    /// Termination signals delivered to the detector.
    pub detector_terminations: Counter,
    /// Alert mails handed to the transport.
    pub notifications_sent: Counter,
    /// Alert mails the transport rejected.
    pub notification_failures: Counter,
    /// Wall time spent in a single mail send.
    pub mail_send_latency: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let detector_spawns = Counter::new(
            "arpvakt_detector_spawns_total",
            "Detector child processes spawned",
        )
        .unwrap();
        let detector_terminations = Counter::new(
            "arpvakt_detector_terminations_total",
            "Termination signals delivered to the detector",
        )
        .unwrap();
        let notifications_sent = Counter::new(
            "arpvakt_notifications_sent_total",
            "Alert mails handed to the transport",
        )
        .unwrap();
        let notification_failures = Counter::new(
            "arpvakt_notification_failures_total",
            "Alert mails the transport rejected",
        )
        .unwrap();
        let mail_send_latency = Histogram::with_opts(
            HistogramOpts::new(
                "arpvakt_mail_send_latency_seconds",
                "Wall time spent in a single mail send",
            )
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 30.0]),
        )
        .unwrap();

        registry.register(Box::new(detector_spawns.clone())).unwrap();
        registry
            .register(Box::new(detector_terminations.clone()))
            .unwrap();
        registry
            .register(Box::new(notifications_sent.clone()))
            .unwrap();
        registry
            .register(Box::new(notification_failures.clone()))
            .unwrap();
        registry
            .register(Box::new(mail_send_latency.clone()))
            .unwrap();

        Self {
            registry,
            detector_spawns,
            detector_terminations,
            notifications_sent,
            notification_failures,
            mail_send_latency,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}
