//! Jupiter Swap Execution Client
//!
//! Implements the execution port against a hosted swap service that quotes,
//! signs and submits in one call, returning the transaction signature.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ports::execution::{ExecutionError, ExecutionPort};

#[derive(Debug, Clone)]
pub struct JupiterSwapClient {
    http: Client,
    swap_api_url: String,
}

impl JupiterSwapClient {
    pub fn new(swap_api_url: String, timeout: Duration) -> Result<Self, ExecutionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExecutionError::ApiError(e.to_string()))?;
        Ok(Self { http, swap_api_url })
    }

    async fn submit_swap(&self, request: &SwapRequest<'_>) -> Result<String, ExecutionError> {
        let response = self
            .http
            .post(&self.swap_api_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ExecutionError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExecutionError::SwapFailed(format!(
                "swap service returned {}",
                response.status()
            )));
        }

        let body: SwapResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::ApiError(e.to_string()))?;
        match body.signature {
            Some(signature) if !signature.is_empty() => Ok(signature),
            _ => Err(ExecutionError::NoExecutionId),
        }
    }
}

#[async_trait]
impl ExecutionPort for JupiterSwapClient {
    async fn buy(
        &self,
        base_mint: &str,
        token_mint: &str,
        amount_lamports: u64,
    ) -> Result<String, ExecutionError> {
        if amount_lamports == 0 {
            return Err(ExecutionError::InvalidParameters(
                "buy amount must be > 0".to_string(),
            ));
        }
        let amount = amount_lamports.to_string();
        let request = SwapRequest {
            input_mint: base_mint,
            output_mint: token_mint,
            amount: &amount,
            slippage_bps: 50,
        };
        let signature = self.submit_swap(&request).await?;
        info!("Buy submitted: {}", signature);
        Ok(signature)
    }

    async fn sell(
        &self,
        base_mint: &str,
        token_mint: &str,
        amount: &str,
    ) -> Result<String, ExecutionError> {
        if amount.is_empty() || amount == "0" {
            return Err(ExecutionError::InvalidParameters(
                "sell amount must be > 0".to_string(),
            ));
        }
        let request = SwapRequest {
            input_mint: token_mint,
            output_mint: base_mint,
            amount,
            slippage_bps: 50,
        };
        let signature = self.submit_swap(&request).await?;
        info!("Sell submitted: {}", signature);
        Ok(signature)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapRequest<'a> {
    input_mint: &'a str,
    output_mint: &'a str,
    amount: &'a str,
    slippage_bps: u16,
}

#[derive(Debug, Deserialize)]
struct SwapResponse {
    #[serde(default)]
    signature: Option<String>,
}
