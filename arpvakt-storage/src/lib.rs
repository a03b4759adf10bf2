//! # arpvakt-storage
//!
//! Persistence seams for the supervisor and notifier: the settings record,
//! the report collection, and the user accounts, each behind an async
//! trait so database backends stay swappable. Ships the deterministic
//! in-memory backend used by the simulate mode and the test suite.

mod error;
mod memory;
mod stores;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use stores::{ReportStore, SettingsStore, UserStore};
