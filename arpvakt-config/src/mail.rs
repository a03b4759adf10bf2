//! Outbound mail transport configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// SMTP transport parameters for alert notifications.
///
/// With `enabled = false` the engine substitutes a log-only mailer, so a
/// development deployment never needs real credentials.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct MailConfig {
    /// Send real mail. Off by default; alerts are logged instead.
    #[serde(default)]
    pub enabled: bool,

    /// SMTP relay host.
    #[validate(custom(function = validation::validate_host))]
    #[serde(default = "default_host")]
    pub host: String,

    /// SMTP submission port.
    #[validate(range(min = 1, max = 65535))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Relay account username.
    #[serde(default)]
    pub username: String,

    /// Relay account password.
    #[serde(default)]
    pub password: String,

    /// Sender address on outgoing alerts; falls back to `username`.
    #[serde(default)]
    pub from: String,
}

fn default_host() -> String {
    "smtp.gmail.com".into()
}

fn default_port() -> u16 {
    587
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
        }
    }
}

impl MailConfig {
    /// Sender address for outgoing mail.
    pub fn sender(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_default_mail_config() {
        MailConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn sender_falls_back_to_username() {
        let mut config = MailConfig::default();
        config.username = "alerts@example.com".into();
        assert_eq!(config.sender(), "alerts@example.com");
        config.from = "noreply@example.com".into();
        assert_eq!(config.sender(), "noreply@example.com");
    }
}
