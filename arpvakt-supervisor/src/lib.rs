//! # arpvakt-supervisor
//!
//! Lifecycle supervision for the external detector process. Exactly one
//! child process may be alive at a time; `reconcile` keeps its
//! running/stopped state synchronized with the persisted settings toggle.
//!
//! ### Key Submodules:
//! - `supervisor`: the guarded handle and the reconcile/start/stop operations
//! - `noise`: fixed ignore-list for the detector runtime's stderr noise

mod error;
pub mod noise;
mod supervisor;

pub use error::SupervisorError;
pub use supervisor::DetectorSupervisor;
