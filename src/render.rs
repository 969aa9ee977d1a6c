//! Render lifecycle: turning description changes into mount point updates.
//!
//! # Sub-modules
//!
//! - [`attempt`]: attempt identifiers, outcomes and commit status
//! - [`controller`]: `RenderController`, the staleness-gated committer

pub mod attempt;
pub mod controller;

pub use attempt::{AttemptId, CommitStatus, RenderOutcome};
pub use controller::{RenderController, RenderTask};
