//! Market Data Port
//!
//! Batch price lookup and read-only buy quotes. Prices are last-traded
//! USDC prices per mint; a mint missing from the response map means the
//! price is unknown, never zero.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Response parse error: {0}")]
    ParseError(String),
    #[error("Request timed out")]
    Timeout,
}

/// Read-only quote for a prospective buy: how many raw token units the
/// configured amount would purchase right now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyQuote {
    pub token_mint: String,
    pub in_amount_lamports: u64,
    pub out_amount: u64,
}

#[async_trait]
pub trait PricePort: Send + Sync {
    /// Fetch current prices for the given mints in one request.
    /// The returned map may be missing entries for mints with no price.
    async fn get_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, PriceError>;

    /// Fetch a read-only buy quote. Never submits an order.
    async fn get_buy_quote(
        &self,
        token_mint: &str,
        amount_lamports: u64,
    ) -> Result<BuyQuote, PriceError>;
}
