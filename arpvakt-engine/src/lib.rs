//! # arpvakt-engine
//!
//! Wires the change feeds to their handlers: settings updates drive the
//! detector supervisor, report insertions drive the mail fan-out. One
//! drain task per feed preserves commit order within a feed; nothing is
//! ordered across feeds.

mod error;
mod runtime;

pub use error::EngineError;
pub use runtime::{build_runtime, EngineRuntime};
