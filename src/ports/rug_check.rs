//! Rug Check Port
//!
//! Safety-assessment collaborator. The gate treats any error from this
//! port as a rejection (fail-closed), so implementations should surface
//! timeouts and malformed responses as errors rather than guessing.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RugCheckError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Response parse error: {0}")]
    ParseError(String),
    #[error("Request timed out")]
    Timeout,
}

/// Pass/fail verdict with the risk names that drove it.
#[derive(Debug, Clone)]
pub struct RugVerdict {
    pub passed: bool,
    pub risks: Vec<String>,
}

impl RugVerdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            risks: Vec::new(),
        }
    }

    pub fn fail(risks: Vec<String>) -> Self {
        Self {
            passed: false,
            risks,
        }
    }
}

#[async_trait]
pub trait RugCheckPort: Send + Sync {
    async fn assess(&self, token_mint: &str) -> Result<RugVerdict, RugCheckError>;
}
