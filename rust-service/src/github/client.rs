//! HTTP client for the GitHub Actions REST API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header;
use tracing::info;

use crate::config::Config;

use super::{RegistryError, RunRegistry, WorkflowRun, WorkflowRunPage};

const USER_AGENT: &str = concat!("runsweep/", env!("CARGO_PKG_VERSION"));

/// Real [`RunRegistry`] backed by the GitHub REST API.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    organization: String,
    repository: String,
    token: String,
}

impl GithubClient {
    /// Build a client for the repository named in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
            organization: config.github_org.clone(),
            repository: config.github_repo.clone(),
            token: config.github_token.clone(),
        })
    }

    fn list_runs_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/actions/runs",
            self.api_base, self.organization, self.repository
        )
    }

    fn auth_value(&self) -> String {
        format!("token {}", self.token)
    }
}

#[async_trait]
impl RunRegistry for GithubClient {
    async fn list_runs(&self) -> Result<Vec<WorkflowRun>, RegistryError> {
        let url = self.list_runs_url();

        let response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, self.auth_value())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::BadStatus {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let page: WorkflowRunPage = response.json().await?;

        info!(
            total_count = page.total_count,
            returned = page.workflow_runs.len(),
            "workflow_runs_listed"
        );

        Ok(page.workflow_runs)
    }

    async fn cancel_run(&self, run: &WorkflowRun) -> Result<(), RegistryError> {
        let response = self
            .http
            .post(&run.cancel_url)
            .header(header::AUTHORIZATION, self.auth_value())
            .send()
            .await?;

        // GitHub answers 202 Accepted; any 2xx counts as accepted.
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::BadStatus {
                status: status.as_u16(),
                url: run.cancel_url.clone(),
                body,
            });
        }

        info!(run_id = run.id, "cancel_request_accepted");

        Ok(())
    }
}
