//! # arpvakt-notify
//!
//! Change-driven notification pipeline: bridges settings updates to the
//! supervisor and fans out alert mail to opted-in users when an ARP
//! spoofing report is inserted. Per-recipient failures are isolated; one
//! bad mailbox never aborts the rest of a batch.

mod error;
pub mod extract;
mod mailer;
mod notifier;

pub use error::NotifyError;
pub use mailer::{LogMailer, Mailer, SmtpMailer};
pub use notifier::{Notifier, ALERT_SUBJECT};
