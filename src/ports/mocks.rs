//! Recording mock implementations of every port, used by unit and
//! integration tests. Each mock records its calls and replays scripted
//! responses.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;

use crate::domain::holding::HoldingRecord;
use crate::ports::execution::{ExecutionError, ExecutionPort};
use crate::ports::market_data::{BuyQuote, PriceError, PricePort};
use crate::ports::notifier::NotifierPort;
use crate::ports::rug_check::{RugCheckError, RugCheckPort, RugVerdict};
use crate::ports::store::{HoldingStore, StoreError};
use crate::ports::transactions::{MintPair, SwapFill, TxDetailError, TxDetailPort};

/// Mock transaction-detail port with scripted mint-pair and fill lookups.
#[derive(Default)]
pub struct MockTxDetail {
    mints: Mutex<HashMap<String, MintPair>>,
    fills: Mutex<HashMap<String, SwapFill>>,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl MockTxDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mints(self, signature: &str, pair: MintPair) -> Self {
        self.mints.lock().unwrap().insert(signature.to_string(), pair);
        self
    }

    pub fn with_fill(self, signature: &str, fill: SwapFill) -> Self {
        self.fills.lock().unwrap().insert(signature.to_string(), fill);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TxDetailPort for MockTxDetail {
    async fn fetch_mints(&self, signature: &str) -> Result<Option<MintPair>, TxDetailError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("mints:{}", signature));
        if self.fail {
            return Err(TxDetailError::HttpError("mock failure".to_string()));
        }
        Ok(self.mints.lock().unwrap().get(signature).cloned())
    }

    async fn fetch_swap_fill(&self, signature: &str) -> Result<Option<SwapFill>, TxDetailError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fill:{}", signature));
        if self.fail {
            return Err(TxDetailError::HttpError("mock failure".to_string()));
        }
        Ok(self.fills.lock().unwrap().get(signature).cloned())
    }
}

/// Mock rug-check port returning a fixed verdict or a scripted error.
#[derive(Default)]
pub struct MockRugCheck {
    verdict: Mutex<Option<RugVerdict>>,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl MockRugCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(self, verdict: RugVerdict) -> Self {
        *self.verdict.lock().unwrap() = Some(verdict);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RugCheckPort for MockRugCheck {
    async fn assess(&self, token_mint: &str) -> Result<RugVerdict, RugCheckError> {
        self.calls.lock().unwrap().push(token_mint.to_string());
        if self.fail {
            return Err(RugCheckError::Timeout);
        }
        Ok(self
            .verdict
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(RugVerdict::pass))
    }
}

/// Scripted price source. Each `get_prices` call pops the next scripted
/// response; once the script is exhausted, the last response repeats. Call
/// instants are recorded so tests can assert on backoff spacing.
#[derive(Default)]
pub struct MockPriceSource {
    script: Mutex<VecDeque<Result<HashMap<String, f64>, String>>>,
    last: Mutex<Option<Result<HashMap<String, f64>, String>>>,
    call_instants: Mutex<Vec<Instant>>,
    quote: Mutex<Option<BuyQuote>>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an empty (no prices) response.
    pub fn then_empty(self) -> Self {
        self.script.lock().unwrap().push_back(Ok(HashMap::new()));
        self
    }

    /// Queue an error response.
    pub fn then_error(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err("mock price failure".to_string()));
        self
    }

    /// Queue a response carrying the given prices.
    pub fn then_prices(self, prices: &[(&str, f64)]) -> Self {
        let map = prices
            .iter()
            .map(|(mint, price)| (mint.to_string(), *price))
            .collect();
        self.script.lock().unwrap().push_back(Ok(map));
        self
    }

    pub fn with_buy_quote(self, quote: BuyQuote) -> Self {
        *self.quote.lock().unwrap() = Some(quote);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_instants.lock().unwrap().len()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.call_instants.lock().unwrap().clone()
    }
}

#[async_trait]
impl PricePort for MockPriceSource {
    async fn get_prices(&self, _mints: &[String]) -> Result<HashMap<String, f64>, PriceError> {
        self.call_instants.lock().unwrap().push(Instant::now());

        let next = {
            let mut script = self.script.lock().unwrap();
            match script.pop_front() {
                Some(response) => {
                    *self.last.lock().unwrap() = Some(response.clone());
                    response
                }
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or(Ok(HashMap::new())),
            }
        };

        next.map_err(PriceError::HttpError)
    }

    async fn get_buy_quote(
        &self,
        token_mint: &str,
        amount_lamports: u64,
    ) -> Result<BuyQuote, PriceError> {
        self.quote
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PriceError::ParseError(format!("no quote scripted for {}", token_mint)))
            .map(|mut q| {
                q.in_amount_lamports = amount_lamports;
                q
            })
    }
}

/// Mock execution port recording buy/sell calls with scripted outcomes.
#[derive(Default)]
pub struct MockExecution {
    buy_result: Mutex<Option<Result<String, String>>>,
    sell_result: Mutex<Option<Result<String, String>>>,
    buys: Mutex<Vec<(String, String, u64)>>,
    sells: Mutex<Vec<(String, String, String)>>,
}

impl MockExecution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buy_signature(self, signature: &str) -> Self {
        *self.buy_result.lock().unwrap() = Some(Ok(signature.to_string()));
        self
    }

    pub fn with_buy_failure(self) -> Self {
        *self.buy_result.lock().unwrap() = Some(Err("mock buy failure".to_string()));
        self
    }

    pub fn with_sell_signature(self, signature: &str) -> Self {
        *self.sell_result.lock().unwrap() = Some(Ok(signature.to_string()));
        self
    }

    pub fn with_sell_failure(self) -> Self {
        *self.sell_result.lock().unwrap() = Some(Err("mock sell failure".to_string()));
        self
    }

    pub fn buy_count(&self) -> usize {
        self.buys.lock().unwrap().len()
    }

    pub fn sell_count(&self) -> usize {
        self.sells.lock().unwrap().len()
    }

    pub fn call_count(&self) -> usize {
        self.buy_count() + self.sell_count()
    }

    pub fn sells(&self) -> Vec<(String, String, String)> {
        self.sells.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionPort for MockExecution {
    async fn buy(
        &self,
        base_mint: &str,
        token_mint: &str,
        amount_lamports: u64,
    ) -> Result<String, ExecutionError> {
        self.buys.lock().unwrap().push((
            base_mint.to_string(),
            token_mint.to_string(),
            amount_lamports,
        ));
        match self.buy_result.lock().unwrap().clone() {
            Some(Ok(sig)) => Ok(sig),
            Some(Err(e)) => Err(ExecutionError::SwapFailed(e)),
            None => Err(ExecutionError::NoExecutionId),
        }
    }

    async fn sell(
        &self,
        base_mint: &str,
        token_mint: &str,
        amount: &str,
    ) -> Result<String, ExecutionError> {
        self.sells.lock().unwrap().push((
            base_mint.to_string(),
            token_mint.to_string(),
            amount.to_string(),
        ));
        match self.sell_result.lock().unwrap().clone() {
            Some(Ok(sig)) => Ok(sig),
            Some(Err(e)) => Err(ExecutionError::SwapFailed(e)),
            None => Err(ExecutionError::NoExecutionId),
        }
    }
}

/// In-memory holding store keyed by token mint.
#[derive(Default)]
pub struct InMemoryHoldingStore {
    holdings: Mutex<HashMap<String, HoldingRecord>>,
    fail_inserts: bool,
}

impl InMemoryHoldingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert fail, for persistence-failure tests.
    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    pub fn len(&self) -> usize {
        self.holdings.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, token_mint: &str) -> Option<HoldingRecord> {
        self.holdings.lock().unwrap().get(token_mint).cloned()
    }
}

#[async_trait]
impl HoldingStore for InMemoryHoldingStore {
    async fn insert(&self, holding: HoldingRecord) -> Result<(), StoreError> {
        if self.fail_inserts {
            return Err(StoreError::IoError("mock insert failure".to_string()));
        }
        self.holdings
            .lock()
            .unwrap()
            .insert(holding.token.clone(), holding);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<HoldingRecord>, StoreError> {
        Ok(self.holdings.lock().unwrap().values().cloned().collect())
    }

    async fn remove(&self, token_mint: &str) -> Result<(), StoreError> {
        self.holdings.lock().unwrap().remove(token_mint);
        Ok(())
    }
}

/// Mock notifier collecting delivered messages.
#[derive(Default)]
pub struct MockNotifier {
    messages: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierPort for MockNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_price_source() {
        let source = MockPriceSource::new()
            .then_empty()
            .then_prices(&[("Mint1", 1.5)]);

        let mints = vec!["Mint1".to_string()];
        assert!(source.get_prices(&mints).await.unwrap().is_empty());

        let prices = source.get_prices(&mints).await.unwrap();
        assert_eq!(prices.get("Mint1"), Some(&1.5));

        // Exhausted script repeats the last response
        let prices = source.get_prices(&mints).await.unwrap();
        assert_eq!(prices.get("Mint1"), Some(&1.5));
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_execution_records_calls() {
        let exec = MockExecution::new().with_buy_signature("sig123");

        let sig = exec.buy("Base", "Token", 10_000_000).await.unwrap();
        assert_eq!(sig, "sig123");
        assert_eq!(exec.buy_count(), 1);
        assert_eq!(exec.sell_count(), 0);
    }

    #[tokio::test]
    async fn test_in_memory_store_replaces_on_duplicate_insert() {
        let store = InMemoryHoldingStore::new();
        let mut holding = HoldingRecord {
            token: "Mint1".to_string(),
            time: chrono::Utc::now(),
            balance: 1.0,
            sol_paid: 0.01,
            sol_fee_paid: 0.001,
            sol_paid_usdc: 2.0,
            sol_fee_paid_usdc: 0.2,
            per_token_paid_usdc: 2.0,
            program: "raydium".to_string(),
        };

        store.insert(holding.clone()).await.unwrap();
        holding.balance = 5.0;
        store.insert(holding).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Mint1").unwrap().balance, 5.0);
    }
}
