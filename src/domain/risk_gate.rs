//! Risk Gate
//!
//! Wraps the external rug-check collaborator with a fail-closed policy:
//! any error or timeout from the collaborator rejects the token. A static
//! ignore policy additionally rejects mints matching a configured suffix,
//! independent of the verdict.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ports::rug_check::RugCheckPort;

pub struct RiskGate {
    rug_check: Arc<dyn RugCheckPort>,
    /// Lowercase mint suffix to reject unconditionally (e.g. "pump")
    ignore_suffix: Option<String>,
}

impl RiskGate {
    pub fn new(rug_check: Arc<dyn RugCheckPort>, ignore_suffix: Option<String>) -> Self {
        Self {
            rug_check,
            ignore_suffix: ignore_suffix
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Whether the static ignore policy rejects this mint.
    pub fn is_ignored(&self, token_mint: &str) -> bool {
        match &self.ignore_suffix {
            Some(suffix) => token_mint.trim().to_lowercase().ends_with(suffix.as_str()),
            None => false,
        }
    }

    /// Pass/fail decision for a candidate token. Fail-closed: a collaborator
    /// error counts as a rejection.
    pub async fn approve(&self, token_mint: &str) -> bool {
        if self.is_ignored(token_mint) {
            info!("Skipping {}: matches ignore suffix", token_mint);
            return false;
        }

        match self.rug_check.assess(token_mint).await {
            Ok(verdict) => {
                if !verdict.passed {
                    info!(
                        "Rug check rejected {}: {}",
                        token_mint,
                        verdict.risks.join(", ")
                    );
                }
                verdict.passed
            }
            Err(e) => {
                warn!("Rug check failed for {} - rejecting: {}", token_mint, e);
                false
            }
        }
    }
}
