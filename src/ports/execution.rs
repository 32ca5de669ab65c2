//! Execution Port
//!
//! Trait abstraction over the external quote/swap execution service. The
//! core never builds or signs transactions itself; it hands the service a
//! mint pair and an amount and gets back an opaque execution id.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("Swap execution failed: {0}")]
    SwapFailed(String),
    #[error("No execution id returned")]
    NoExecutionId,
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

#[async_trait]
pub trait ExecutionPort: Send + Sync {
    /// Buy `amount_lamports` worth of `token_mint`, paying with `base_mint`.
    /// Returns the transaction signature of the submitted swap.
    async fn buy(
        &self,
        base_mint: &str,
        token_mint: &str,
        amount_lamports: u64,
    ) -> Result<String, ExecutionError>;

    /// Sell `amount` of `token_mint` (raw token units, decimal point
    /// stripped) back into `base_mint`. Returns the transaction signature.
    async fn sell(
        &self,
        base_mint: &str,
        token_mint: &str,
        amount: &str,
    ) -> Result<String, ExecutionError>;
}
