//! RugCheck Report Client
//!
//! Implements the rug-check port against the public token report API.
//! A token passes only when its report carries zero named risks; any
//! transport or parse problem surfaces as an error so the gate can fail
//! closed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::ports::rug_check::{RugCheckError, RugCheckPort, RugVerdict};

#[derive(Debug, Clone)]
pub struct RugCheckClient {
    http: Client,
    api_url: String,
}

impl RugCheckClient {
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, RugCheckError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RugCheckError::HttpError(e.to_string()))?;
        Ok(Self { http, api_url })
    }
}

#[async_trait]
impl RugCheckPort for RugCheckClient {
    async fn assess(&self, token_mint: &str) -> Result<RugVerdict, RugCheckError> {
        let url = format!("{}/tokens/{}/report/summary", self.api_url, token_mint);
        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                RugCheckError::Timeout
            } else {
                RugCheckError::HttpError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(RugCheckError::HttpError(format!(
                "report API returned {}",
                response.status()
            )));
        }

        let report: ReportSummary = response
            .json()
            .await
            .map_err(|e| RugCheckError::ParseError(e.to_string()))?;

        let risks: Vec<String> = report.risks.into_iter().map(|r| r.name).collect();
        debug!(token = token_mint, risk_count = risks.len(), "Rug check report");
        if risks.is_empty() {
            Ok(RugVerdict::pass())
        } else {
            Ok(RugVerdict::fail(risks))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReportSummary {
    #[serde(default)]
    risks: Vec<ReportRisk>,
}

#[derive(Debug, Deserialize)]
struct ReportRisk {
    name: String,
}
