//! GitHub Actions run registry.
//!
//! This module defines the [`RunRegistry`] capability the sweep depends on
//! and the HTTP-backed [`GithubClient`] that satisfies it in production.
//! Tests substitute their own implementations.

pub mod client;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

pub use client::GithubClient;

/// One workflow run as reported by the GitHub Actions API.
///
/// Immutable once listed; the sweep only reads these fields to decide
/// which runs to cancel.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub head_branch: String,
    pub status: String,
    pub cancel_url: String,
}

impl WorkflowRun {
    /// A completed run is terminal: never cancelled, and it does not
    /// shadow younger runs on its branch.
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// Envelope of the list-runs endpoint response.
#[derive(Debug, Deserialize)]
pub struct WorkflowRunPage {
    pub total_count: i64,
    pub workflow_runs: Vec<WorkflowRun>,
}

/// Errors from the run registry collaborator.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}: {body}")]
    BadStatus {
        status: u16,
        url: String,
        body: String,
    },
}

/// Capability to list and cancel workflow runs for one repository.
///
/// The sweep depends only on this trait; the concrete HTTP client lives
/// behind it.
#[async_trait]
pub trait RunRegistry: Send + Sync {
    /// Current snapshot of workflow runs, active and recently completed.
    /// No ordering is guaranteed.
    async fn list_runs(&self) -> Result<Vec<WorkflowRun>, RegistryError>;

    /// Ask the upstream to cancel the given run via its `cancel_url`.
    /// Success means the request was accepted, not that the run already
    /// stopped.
    async fn cancel_run(&self, run: &WorkflowRun) -> Result<(), RegistryError>;
}
