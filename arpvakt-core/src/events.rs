//! ## arpvakt-core::events
//! **Change feeds bridging store mutations to the engine's drain tasks**
//!
//! Each persisted collection with a subscription gets its own feed:
//! multiple writers publish, a single engine task drains. Events within a
//! feed keep commit order; nothing is guaranteed across feeds. Feeds are
//! capacity-checked and closeable so shutdown can drain-then-exit.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::queue::SegQueue;
use thiserror::Error;

use crate::types::SecurityReport;

#[derive(Clone, Debug, Error)]
pub enum FeedError {
    #[error("Change feed capacity exceeded")]
    QueueFull,
    #[error("Change feed closed")]
    Closed,
}

/// Update notification for the settings record.
#[derive(Clone, Debug)]
pub struct SettingChange {
    /// Names of the fields touched by the write.
    pub changed_fields: Vec<String>,
}

impl SettingChange {
    pub fn new(changed_fields: Vec<String>) -> Self {
        Self { changed_fields }
    }

    /// Whether the write touched the given field.
    pub fn touches(&self, field: &str) -> bool {
        self.changed_fields.iter().any(|f| f == field)
    }
}

/// Insert notification carrying the newly persisted report.
#[derive(Clone, Debug)]
pub struct ReportInserted {
    pub report: SecurityReport,
}

/// Bounded multi-producer change feed.
pub struct ChangeFeed<T> {
    queue: SegQueue<T>,
    capacity: usize,
    closed: AtomicBool,
}

impl<T> ChangeFeed<T> {
    /// Create a new feed with fixed capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: SegQueue::new(),
            capacity,
            closed: AtomicBool::new(false),
        }
    }

    /// Publish an event onto the feed.
    pub fn publish(&self, event: T) -> Result<(), FeedError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FeedError::Closed);
        }
        if self.queue.len() >= self.capacity {
            return Err(FeedError::QueueFull);
        }
        self.queue.push(event);
        Ok(())
    }

    /// Take the next event, if any.
    pub fn poll(&self) -> Option<T> {
        self.queue.pop()
    }

    /// Stop accepting new events. Already-queued events stay pollable.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closed and fully consumed; drain loops exit on this.
    pub fn is_drained(&self) -> bool {
        self.is_closed() && self.queue.is_empty()
    }
}
