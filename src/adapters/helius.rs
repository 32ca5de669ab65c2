//! Helius Enhanced Transaction Client
//!
//! Implements the transaction-detail port against the enhanced
//! transactions API. Mint pairs and swap fills are both read off the
//! token transfer list of a parsed transaction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::transactions::{MintPair, SwapFill, TxDetailError, TxDetailPort};

const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[derive(Debug, Clone)]
pub struct HeliusTxClient {
    http: Client,
    api_url: String,
}

impl HeliusTxClient {
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, TxDetailError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TxDetailError::HttpError(e.to_string()))?;
        Ok(Self { http, api_url })
    }

    async fn fetch_parsed(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, TxDetailError> {
        let request = ParseRequest {
            transactions: vec![signature.to_string()],
        };
        let response = self
            .http
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TxDetailError::Timeout
                } else {
                    TxDetailError::HttpError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(TxDetailError::HttpError(format!(
                "transaction API returned {}",
                response.status()
            )));
        }

        let mut parsed: Vec<ParsedTransaction> = response
            .json()
            .await
            .map_err(|e| TxDetailError::ParseError(e.to_string()))?;
        Ok(if parsed.is_empty() {
            None
        } else {
            Some(parsed.remove(0))
        })
    }
}

#[async_trait]
impl TxDetailPort for HeliusTxClient {
    async fn fetch_mints(&self, signature: &str) -> Result<Option<MintPair>, TxDetailError> {
        let Some(tx) = self.fetch_parsed(signature).await? else {
            return Ok(None);
        };
        let pair = tx.mint_pair();
        if pair.is_none() {
            debug!(signature, "No WSOL/token transfer pair in transaction");
        }
        Ok(pair)
    }

    async fn fetch_swap_fill(&self, signature: &str) -> Result<Option<SwapFill>, TxDetailError> {
        let Some(tx) = self.fetch_parsed(signature).await? else {
            return Ok(None);
        };
        Ok(tx.swap_fill())
    }
}

#[derive(Debug, Serialize)]
struct ParseRequest {
    transactions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTransaction {
    #[serde(default)]
    token_transfers: Vec<TokenTransfer>,
    #[serde(default)]
    fee: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenTransfer {
    mint: String,
    #[serde(default)]
    token_amount: f64,
}

impl ParsedTransaction {
    /// WSOL leg plus the first non-WSOL leg of the transfer list.
    fn mint_pair(&self) -> Option<MintPair> {
        let base = self.token_transfers.iter().find(|t| t.mint == WSOL_MINT)?;
        let token = self.token_transfers.iter().find(|t| t.mint != WSOL_MINT)?;
        Some(MintPair {
            base_mint: base.mint.clone(),
            token_mint: token.mint.clone(),
        })
    }

    /// Fill amounts of an executed buy: SOL out, token in, network fee.
    fn swap_fill(&self) -> Option<SwapFill> {
        let sol_leg = self.token_transfers.iter().find(|t| t.mint == WSOL_MINT)?;
        let token_leg = self.token_transfers.iter().find(|t| t.mint != WSOL_MINT)?;
        Some(SwapFill {
            token_mint: token_leg.mint.clone(),
            token_amount: token_leg.token_amount,
            sol_paid: sol_leg.token_amount,
            sol_fee_paid: self.fee as f64 / LAMPORTS_PER_SOL,
        })
    }
}
