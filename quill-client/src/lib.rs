//! Quill HTTP Client
//!
//! A type-safe HTTP client for the Quill orchestrator API, shared by the CLI
//! and any scheduler that drives batches.
//!
//! # Example
//!
//! ```no_run
//! use quill_client::OrchestratorClient;
//! use quill_core::dto::batch::CreateBatch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OrchestratorClient::new("http://localhost:8080");
//!
//!     let batch = client.create_batch(CreateBatch {
//!         keywords: vec!["20代 貯金".to_string()],
//!         seo_enabled: true,
//!     }).await?;
//!
//!     let step = client.advance_step(batch.id, None).await?;
//!     println!("{}", step.message);
//!     Ok(())
//! }
//! ```

mod batches;
pub mod error;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use quill_core::dto::step::{StepResult, StepStatus};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Quill orchestrator API
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    client: Client,
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// Use this to configure timeouts. A step can run for minutes while an
    /// article is written, so keep request timeouts above the writing timeout.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the orchestrator is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(ClientError::api_error(status.as_u16(), error_message(body)))
    }
}

/// Pull the message out of an `{"error": "..."}` body, falling back to the raw text
fn error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body)
}
