//! Jupiter Market Data Client
//!
//! Implements the price port against the Jupiter price and quote APIs.
//! Prices come from one batch request per call; each entry prefers the
//! last observed Jupiter sell price and falls back to the aggregate
//! price field when swap history is missing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::ports::market_data::{BuyQuote, PriceError, PricePort};

/// Buy quotes are always SOL-in, token-out.
const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

#[derive(Debug, Clone)]
pub struct JupiterPriceClient {
    http: Client,
    price_api_url: String,
    quote_api_url: String,
}

impl JupiterPriceClient {
    pub fn new(
        price_api_url: String,
        quote_api_url: String,
        timeout: Duration,
    ) -> Result<Self, PriceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::HttpError(e.to_string()))?;
        Ok(Self {
            http,
            price_api_url,
            quote_api_url,
        })
    }
}

#[async_trait]
impl PricePort for JupiterPriceClient {
    async fn get_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, PriceError> {
        let ids = mints.join(",");
        let response = self
            .http
            .get(&self.price_api_url)
            .query(&[("ids", ids.as_str()), ("showExtraInfo", "true")])
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| PriceError::ParseError(e.to_string()))?;

        let mut prices = HashMap::new();
        for (mint, entry) in body.data {
            let Some(entry) = entry else { continue };
            if let Some(price) = entry.usable_price() {
                prices.insert(mint, price);
            }
        }
        debug!("Fetched {} of {} requested prices", prices.len(), mints.len());
        Ok(prices)
    }

    async fn get_buy_quote(
        &self,
        token_mint: &str,
        amount_lamports: u64,
    ) -> Result<BuyQuote, PriceError> {
        let amount = amount_lamports.to_string();
        let response = self
            .http
            .get(&self.quote_api_url)
            .query(&[
                ("inputMint", WSOL_MINT),
                ("outputMint", token_mint),
                ("amount", amount.as_str()),
                ("slippageBps", "50"),
            ])
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let body: QuoteResponse = response
            .json()
            .await
            .map_err(|e| PriceError::ParseError(e.to_string()))?;
        let out_amount = body
            .out_amount
            .parse::<u64>()
            .map_err(|e| PriceError::ParseError(e.to_string()))?;

        Ok(BuyQuote {
            token_mint: token_mint.to_string(),
            in_amount_lamports: amount_lamports,
            out_amount,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> PriceError {
    if e.is_timeout() {
        PriceError::Timeout
    } else {
        PriceError::HttpError(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    /// Mints with no price data come back as explicit nulls
    data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceEntry {
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    extra_info: Option<ExtraInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtraInfo {
    #[serde(default)]
    last_swapped_price: Option<LastSwappedPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastSwappedPrice {
    #[serde(default)]
    last_jupiter_sell_price: Option<String>,
}

impl PriceEntry {
    /// Last Jupiter sell price when available, aggregate price otherwise.
    fn usable_price(&self) -> Option<f64> {
        let sell_price = self
            .extra_info
            .as_ref()
            .and_then(|e| e.last_swapped_price.as_ref())
            .and_then(|p| p.last_jupiter_sell_price.as_ref());
        sell_price
            .or(self.price.as_ref())
            .and_then(|p| p.parse::<f64>().ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    out_amount: String,
}
