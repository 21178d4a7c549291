//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup and passed into the handlers
//! by value; nothing in the core logic touches the environment.

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret used to verify the `X-Hub-Signature` header
    pub webhook_secret: String,

    /// Owner (user or organization) of the target repository
    pub github_org: String,

    /// Name of the target repository
    pub github_repo: String,

    /// Token sent as `Authorization: token <...>` to the GitHub API
    pub github_token: String,

    /// Base URL of the GitHub REST API
    pub github_api_base: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// HTTP request timeout in milliseconds for outbound API calls
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails when a required variable is missing; the service is useless
    /// without a webhook secret or API credentials, so there are no
    /// permissive defaults for them.
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            webhook_secret: require("WEBHOOK_SECRET")?,

            github_org: require("GITHUB_ORG")?,

            github_repo: require("GITHUB_REPO")?,

            github_token: require("GITHUB_TOKEN")?,

            github_api_base: env::var("GITHUB_API_BASE")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        })
    }
}

/// Read a mandatory environment variable.
fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}
