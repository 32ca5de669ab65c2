//! Bounded-Retry Price Client
//!
//! Wraps the raw price port with exponential backoff. An empty or failed
//! batch response is retried with a doubling delay up to a fixed cap;
//! after exhausting all attempts the client returns an empty map sentinel.
//! Callers must treat that sentinel as "price unknown", never as zero.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::ports::market_data::{BuyQuote, PriceError, PricePort};

/// Retries after the initial attempt (6 attempts total).
pub const MAX_PRICE_RETRIES: u32 = 5;

/// Delay before retry number `attempt` (0-based), doubling from the base.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt)
}

#[derive(Clone)]
pub struct RetryingPriceClient {
    inner: Arc<dyn PricePort>,
    base_delay: Duration,
}

impl RetryingPriceClient {
    pub fn new(inner: Arc<dyn PricePort>, base_delay: Duration) -> Self {
        Self { inner, base_delay }
    }

    /// Batch price fetch with bounded retry. Returns an empty map after all
    /// attempts are exhausted; never an error.
    pub async fn get_prices(&self, mints: &[String]) -> HashMap<String, f64> {
        let mut attempt: u32 = 0;
        loop {
            match self.inner.get_prices(mints).await {
                Ok(prices) if !prices.is_empty() => return prices,
                Ok(_) => warn!("Latest prices could not be fetched. Trying again..."),
                Err(e) => warn!("Price request failed: {}. Trying again...", e),
            }

            if attempt >= MAX_PRICE_RETRIES {
                warn!("Latest prices could not be fetched. Giving up.");
                return HashMap::new();
            }

            tokio::time::sleep(backoff_delay(self.base_delay, attempt)).await;
            attempt += 1;
        }
    }

    /// Single-attempt buy quote passthrough.
    pub async fn get_buy_quote(
        &self,
        token_mint: &str,
        amount_lamports: u64,
    ) -> Result<BuyQuote, PriceError> {
        self.inner.get_buy_quote(token_mint, amount_lamports).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::MockPriceSource;

    const BASE: Duration = Duration::from_millis(10);

    #[test]
    fn test_backoff_doubles_from_base() {
        assert_eq!(backoff_delay(BASE, 0), Duration::from_millis(10));
        assert_eq!(backoff_delay(BASE, 1), Duration::from_millis(20));
        assert_eq!(backoff_delay(BASE, 2), Duration::from_millis(40));
        assert_eq!(backoff_delay(BASE, 4), Duration::from_millis(160));
    }

    #[tokio::test]
    async fn test_three_empties_then_valid() {
        let source = Arc::new(
            MockPriceSource::new()
                .then_empty()
                .then_empty()
                .then_empty()
                .then_prices(&[("Mint1", 2.5)]),
        );
        let client = RetryingPriceClient::new(source.clone(), BASE);

        let prices = client.get_prices(&["Mint1".to_string()]).await;

        assert_eq!(prices.get("Mint1"), Some(&2.5));
        // 3 failed attempts + 1 success
        assert_eq!(source.call_count(), 4);

        // Gaps between attempts strictly increase (doubling backoff)
        let instants = source.call_instants();
        let gaps: Vec<Duration> = instants.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(gaps.len(), 3);
        assert!(gaps[1] > gaps[0]);
        assert!(gaps[2] > gaps[1]);
    }

    #[tokio::test]
    async fn test_always_empty_terminates_with_sentinel() {
        let source = Arc::new(MockPriceSource::new().then_empty());
        let client = RetryingPriceClient::new(source.clone(), Duration::from_millis(1));

        let prices = client.get_prices(&["Mint1".to_string()]).await;

        assert!(prices.is_empty());
        // Initial attempt + MAX_PRICE_RETRIES retries
        assert_eq!(source.call_count(), (MAX_PRICE_RETRIES + 1) as usize);
    }

    #[tokio::test]
    async fn test_errors_retried_like_empties() {
        let source = Arc::new(
            MockPriceSource::new()
                .then_error()
                .then_prices(&[("Mint1", 1.0)]),
        );
        let client = RetryingPriceClient::new(source.clone(), Duration::from_millis(1));

        let prices = client.get_prices(&["Mint1".to_string()]).await;

        assert_eq!(prices.get("Mint1"), Some(&1.0));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_first_attempt_success_no_retry() {
        let source = Arc::new(MockPriceSource::new().then_prices(&[("Mint1", 1.0)]));
        let client = RetryingPriceClient::new(source.clone(), BASE);

        let prices = client.get_prices(&["Mint1".to_string()]).await;

        assert_eq!(prices.len(), 1);
        assert_eq!(source.call_count(), 1);
    }
}
