//! Web server module for handling inbound webhooks.
//!
//! One endpoint does the whole job:
//! - Receives the GitHub webhook
//! - Verifies the `X-Hub-Signature` HMAC
//! - Lists workflow runs and cancels superseded ones
//! - Reports the outcome as a status code

pub mod handlers;
pub mod signature;

pub use handlers::{github_webhook, health, AppState, HealthResponse, WebhookResponse};
pub use signature::{verify_signature, SignatureError, SIGNATURE_HEADER};
