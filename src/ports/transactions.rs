//! Transaction Detail Port
//!
//! Signature-keyed lookups against the transaction-detail collaborator:
//! the mint pair behind a pool-creation transaction, and the fill amounts
//! of an executed swap.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TxDetailError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Response parse error: {0}")]
    ParseError(String),
    #[error("Request timed out")]
    Timeout,
}

/// The two sides of a newly created pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintPair {
    pub base_mint: String,
    pub token_mint: String,
}

/// Native-unit amounts of an executed buy, used to build the holding
/// record. USDC conversion happens in the pipeline via the price client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapFill {
    pub token_mint: String,
    /// Token amount received (UI units)
    pub token_amount: f64,
    /// SOL spent
    pub sol_paid: f64,
    /// SOL paid in fees
    pub sol_fee_paid: f64,
}

#[async_trait]
pub trait TxDetailPort: Send + Sync {
    /// Resolve the mint pair of a pool-creation transaction.
    /// `Ok(None)` means the collaborator had no data for this signature.
    async fn fetch_mints(&self, signature: &str) -> Result<Option<MintPair>, TxDetailError>;

    /// Resolve the fill amounts of an executed swap for bookkeeping.
    async fn fetch_swap_fill(&self, signature: &str) -> Result<Option<SwapFill>, TxDetailError>;
}
