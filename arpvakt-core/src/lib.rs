//! # arpvakt-core
//!
//! Foundation layer for the arpvakt monitoring service: the persisted
//! records the supervisor and notifier read, the change events the stores
//! publish, and the bounded feed queue the engine drains.
//!
//! ### Key Submodules:
//! - `types`: settings, report, and account records shared across crates
//! - `events`: multi-producer change feeds backed by crossbeam's segmented queue

pub mod events;
pub mod types;

pub mod prelude {
    pub use crate::events::*;
    pub use crate::types::*;
}
