//! RunSweep - automatic cancellation of superseded CI runs.
//!
//! This library backs the `runsweep-web` binary, a thin webhook receiver
//! for GitHub Actions `workflow_run` events.
//!
//! ## Architecture
//!
//! ```text
//! Webhook → Signature check → List workflow runs → Cancellation sweep
//! ```
//!
//! Only the most recently created active run per branch survives a sweep;
//! every older active run on the same branch is cancelled. Completed runs
//! are left alone.

pub mod config;
pub mod github;
pub mod sweep;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use github::{GithubClient, RegistryError, RunRegistry, WorkflowRun};
pub use sweep::{cancel_superseded, SweepStats};
pub use web::AppState;
