//! Acquisition Pipeline
//!
//! Turns one qualifying pool-creation event into a risk-checked, executed,
//! persisted holding. The pipeline is a linear state machine:
//!
//! `INIT -> FILTERED -> RISK_CHECKED -> QUOTED -> EXECUTING -> CONFIRMED
//!  -> PERSISTED`, with `ABORTED` reachable from any non-terminal state.
//!
//! Nothing is retried inside one invocation; collaborators that retry
//! (the price client) do so internally. A failed step terminates the
//! pipeline and logs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::domain::holding::HoldingRecord;
use crate::domain::risk_gate::RiskGate;
use crate::domain::PoolCreationEvent;
use crate::ports::execution::ExecutionPort;
use crate::ports::notifier::NotifierPort;
use crate::ports::store::HoldingStore;
use crate::ports::transactions::{MintPair, TxDetailPort};

use super::price_client::RetryingPriceClient;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;
/// Fee assumed for a simulated buy, in SOL.
const SIMULATED_FEE_SOL: f64 = 0.001;

/// Pipeline stages, logged as the state machine advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    Filtered,
    RiskChecked,
    Quoted,
    Executing,
    Confirmed,
    Persisted,
}

/// Why a pipeline invocation aborted before creating a holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Transaction-detail lookup returned nothing usable
    NoTransactionData,
    /// Risk gate rejected the token (fail-closed included)
    RiskRejected,
    /// Live execution returned no usable id
    ExecutionFailed,
    /// Simulation could not price the token or the base currency
    PriceUnavailable,
    /// Simulation could not obtain a buy quote
    QuoteFailed,
}

/// Terminal result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A position was acquired. `persisted == false` means the real holding
    /// exists but the bookkeeping record could not be written.
    Acquired {
        token_mint: String,
        signature: String,
        simulated: bool,
        persisted: bool,
    },
    Aborted(AbortReason),
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base currency mint (WSOL) spent on buys
    pub base_mint: String,
    /// Trade size in lamports
    pub amount_lamports: u64,
    /// Fixed wait before committing capital, letting pool liquidity settle
    pub pre_quote_delay: Duration,
    /// Replace live execution with a synthetic fill
    pub simulation_mode: bool,
    /// Venue tag recorded on holdings
    pub program_tag: String,
}

pub struct AcquisitionPipeline {
    tx_detail: Arc<dyn TxDetailPort>,
    risk_gate: RiskGate,
    prices: RetryingPriceClient,
    execution: Arc<dyn ExecutionPort>,
    store: Arc<dyn HoldingStore>,
    notifier: Arc<dyn NotifierPort>,
    config: PipelineConfig,
}

impl AcquisitionPipeline {
    pub fn new(
        tx_detail: Arc<dyn TxDetailPort>,
        risk_gate: RiskGate,
        prices: RetryingPriceClient,
        execution: Arc<dyn ExecutionPort>,
        store: Arc<dyn HoldingStore>,
        notifier: Arc<dyn NotifierPort>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            tx_detail,
            risk_gate,
            prices,
            execution,
            store,
            notifier,
            config,
        }
    }

    /// Run the full state machine for one candidate event.
    pub async fn process(&self, event: PoolCreationEvent) -> PipelineOutcome {
        info!("New liquidity pool found. Fetching transaction details...");
        debug!(stage = ?PipelineStage::Init, signature = %event.signature);

        let pair = match self.tx_detail.fetch_mints(&event.signature).await {
            Ok(Some(pair)) => pair,
            Ok(None) => {
                info!("Acquisition aborted. No transaction data returned.");
                return PipelineOutcome::Aborted(AbortReason::NoTransactionData);
            }
            Err(e) => {
                info!("Acquisition aborted. Transaction lookup failed: {}", e);
                return PipelineOutcome::Aborted(AbortReason::NoTransactionData);
            }
        };
        debug!(stage = ?PipelineStage::Filtered, token = %pair.token_mint);

        if !self.risk_gate.approve(&pair.token_mint).await {
            info!("Acquisition aborted. Risk check not passed.");
            return PipelineOutcome::Aborted(AbortReason::RiskRejected);
        }
        debug!(stage = ?PipelineStage::RiskChecked, token = %pair.token_mint);

        let (gmgn, bullx) = token_links(&pair.token_mint);
        info!("Token found: {}", gmgn);
        info!("BullX: {}", bullx);
        self.notifier
            .notify(&format!("New token found: {}", gmgn))
            .await;

        // Deliberate wait before committing capital: lets initial pool
        // liquidity settle instead of buying into the very first block.
        tokio::time::sleep(self.config.pre_quote_delay).await;
        debug!(stage = ?PipelineStage::Quoted, token = %pair.token_mint);

        if self.config.simulation_mode {
            self.simulate_acquisition(&pair).await
        } else {
            self.live_acquisition(&pair).await
        }
    }

    async fn live_acquisition(&self, pair: &MintPair) -> PipelineOutcome {
        debug!(stage = ?PipelineStage::Executing, token = %pair.token_mint);
        let signature = match self
            .execution
            .buy(
                &pair.base_mint,
                &pair.token_mint,
                self.config.amount_lamports,
            )
            .await
        {
            Ok(sig) => sig,
            Err(e) => {
                info!("Acquisition aborted. Swap failed: {}", e);
                return PipelineOutcome::Aborted(AbortReason::ExecutionFailed);
            }
        };

        debug!(stage = ?PipelineStage::Confirmed, token = %pair.token_mint);
        info!(
            "Swapped SOL for token. Transaction: https://solscan.io/tx/{}",
            signature
        );

        // Capital is committed past this point: bookkeeping failures warn
        // the operator but never roll back the acquisition.
        let persisted = self.persist_live_fill(pair, &signature).await;
        if persisted {
            debug!(stage = ?PipelineStage::Persisted, token = %pair.token_mint);
        } else {
            warn!("Holding not saved for tracking! Track manually: {}", signature);
        }

        PipelineOutcome::Acquired {
            token_mint: pair.token_mint.clone(),
            signature,
            simulated: false,
            persisted,
        }
    }

    async fn persist_live_fill(&self, pair: &MintPair, signature: &str) -> bool {
        let fill = match self.tx_detail.fetch_swap_fill(signature).await {
            Ok(Some(fill)) => fill,
            Ok(None) => return false,
            Err(e) => {
                warn!("Swap fill lookup failed: {}", e);
                return false;
            }
        };

        let prices = self
            .prices
            .get_prices(std::slice::from_ref(&pair.base_mint))
            .await;
        let Some(&sol_price_usdc) = prices.get(&pair.base_mint) else {
            return false;
        };

        let holding = match HoldingRecord::new(
            pair.token_mint.clone(),
            Utc::now(),
            fill.token_amount,
            fill.sol_paid,
            fill.sol_fee_paid,
            fill.sol_paid * sol_price_usdc,
            fill.sol_fee_paid * sol_price_usdc,
            self.config.program_tag.clone(),
        ) {
            Ok(h) => h,
            Err(e) => {
                warn!("Fill produced an invalid holding record: {}", e);
                return false;
            }
        };

        match self.store.insert(holding).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Holding store insert failed: {}", e);
                false
            }
        }
    }

    /// Simulation variant: synthetic execution id, estimated fill from
    /// read-only market data. Never touches the execution port.
    async fn simulate_acquisition(&self, pair: &MintPair) -> PipelineOutcome {
        let signature = synthetic_execution_id();
        debug!(stage = ?PipelineStage::Confirmed, token = %pair.token_mint, "simulated");

        let ids = vec![pair.token_mint.clone(), pair.base_mint.clone()];
        let prices = self.prices.get_prices(&ids).await;
        let Some(&sol_price_usdc) = prices.get(&pair.base_mint) else {
            info!("Simulated acquisition aborted. Base price unavailable.");
            return PipelineOutcome::Aborted(AbortReason::PriceUnavailable);
        };
        if let Some(token_price) = prices.get(&pair.token_mint) {
            info!("Token price: {}", token_price);
        }

        let quote = match self
            .prices
            .get_buy_quote(&pair.token_mint, self.config.amount_lamports)
            .await
        {
            Ok(q) => q,
            Err(e) => {
                info!("Simulated acquisition aborted. Buy quote failed: {}", e);
                return PipelineOutcome::Aborted(AbortReason::QuoteFailed);
            }
        };

        let token_amount = quote.out_amount as f64 / LAMPORTS_PER_SOL;
        let sol_paid = self.config.amount_lamports as f64 / LAMPORTS_PER_SOL;
        let sol_paid_usdc = sol_paid * sol_price_usdc;
        let sol_fee_paid_usdc = SIMULATED_FEE_SOL * sol_price_usdc;

        let holding = match HoldingRecord::new(
            pair.token_mint.clone(),
            Utc::now(),
            token_amount,
            sol_paid,
            SIMULATED_FEE_SOL,
            sol_paid_usdc,
            sol_fee_paid_usdc,
            "simulated".to_string(),
        ) {
            Ok(h) => h,
            Err(e) => {
                info!("Simulated acquisition aborted. Invalid estimate: {}", e);
                return PipelineOutcome::Aborted(AbortReason::QuoteFailed);
            }
        };
        let per_token = holding.per_token_paid_usdc;

        let persisted = match self.store.insert(holding).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Simulated holding not saved: {}", e);
                false
            }
        };
        if persisted {
            debug!(stage = ?PipelineStage::Persisted, token = %pair.token_mint);
        }

        self.notifier
            .notify(&format!(
                "New holding (simulated): {} tokens at {} USDC each, fee {} USDC",
                token_amount, per_token, sol_fee_paid_usdc
            ))
            .await;

        PipelineOutcome::Acquired {
            token_mint: pair.token_mint.clone(),
            signature,
            simulated: true,
            persisted,
        }
    }
}

/// Explorer links shown when a token clears the risk gate.
fn token_links(token_mint: &str) -> (String, String) {
    (
        format!("https://gmgn.ai/sol/token/{}", token_mint),
        format!(
            "https://neo.bullx.io/terminal?chainId=1399811149&address={}",
            token_mint
        ),
    )
}

/// Random alphanumeric id standing in for a transaction signature in
/// simulation mode.
pub(crate) fn synthetic_execution_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::market_data::BuyQuote;
    use crate::ports::mocks::{
        InMemoryHoldingStore, MockExecution, MockNotifier, MockPriceSource, MockRugCheck,
        MockTxDetail,
    };
    use crate::ports::rug_check::RugVerdict;
    use crate::ports::transactions::SwapFill;

    const SIG: &str = "PoolSig1111111111111111111111111111111111111";
    const WSOL: &str = "So11111111111111111111111111111111111111112";
    const TOKEN: &str = "TokenMint111111111111111111111111111111111";

    struct Harness {
        tx_detail: Arc<MockTxDetail>,
        rug_check: Arc<MockRugCheck>,
        prices: Arc<MockPriceSource>,
        execution: Arc<MockExecution>,
        store: Arc<InMemoryHoldingStore>,
        notifier: Arc<MockNotifier>,
    }

    impl Harness {
        fn pipeline(&self, simulation_mode: bool) -> AcquisitionPipeline {
            AcquisitionPipeline::new(
                self.tx_detail.clone(),
                RiskGate::new(self.rug_check.clone(), Some("pump".to_string())),
                RetryingPriceClient::new(self.prices.clone(), Duration::from_millis(1)),
                self.execution.clone(),
                self.store.clone(),
                self.notifier.clone(),
                PipelineConfig {
                    base_mint: WSOL.to_string(),
                    amount_lamports: 10_000_000,
                    pre_quote_delay: Duration::from_millis(1),
                    simulation_mode,
                    program_tag: "raydium".to_string(),
                },
            )
        }
    }

    fn harness() -> Harness {
        Harness {
            tx_detail: Arc::new(
                MockTxDetail::new()
                    .with_mints(
                        SIG,
                        MintPair {
                            base_mint: WSOL.to_string(),
                            token_mint: TOKEN.to_string(),
                        },
                    )
                    .with_fill(
                        "BuySig",
                        SwapFill {
                            token_mint: TOKEN.to_string(),
                            token_amount: 5.0,
                            sol_paid: 0.01,
                            sol_fee_paid: 0.001,
                        },
                    ),
            ),
            rug_check: Arc::new(MockRugCheck::new().with_verdict(RugVerdict::pass())),
            prices: Arc::new(
                MockPriceSource::new()
                    .then_prices(&[(TOKEN, 0.5), (WSOL, 200.0)])
                    .with_buy_quote(BuyQuote {
                        token_mint: TOKEN.to_string(),
                        in_amount_lamports: 10_000_000,
                        out_amount: 5_000_000_000,
                    }),
            ),
            execution: Arc::new(MockExecution::new().with_buy_signature("BuySig")),
            store: Arc::new(InMemoryHoldingStore::new()),
            notifier: Arc::new(MockNotifier::new()),
        }
    }

    fn event() -> PoolCreationEvent {
        PoolCreationEvent {
            signature: SIG.to_string(),
        }
    }

    #[tokio::test]
    async fn test_live_acquisition_persists_holding() {
        let h = harness();
        let outcome = h.pipeline(false).process(event()).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Acquired {
                token_mint: TOKEN.to_string(),
                signature: "BuySig".to_string(),
                simulated: false,
                persisted: true,
            }
        );
        assert_eq!(h.execution.buy_count(), 1);

        let holding = h.store.get(TOKEN).unwrap();
        assert_eq!(holding.balance, 5.0);
        assert!((holding.sol_paid_usdc - 2.0).abs() < 1e-9);
        assert!((holding.per_token_paid_usdc - 0.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_transaction_data_aborts() {
        let mut h = harness();
        h.tx_detail = Arc::new(MockTxDetail::new());
        let outcome = h.pipeline(false).process(event()).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Aborted(AbortReason::NoTransactionData)
        );
        assert_eq!(h.execution.call_count(), 0);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_risk_rejection_aborts_before_capital() {
        let mut h = harness();
        h.rug_check = Arc::new(MockRugCheck::new().with_verdict(RugVerdict::fail(vec![
            "mutable metadata".to_string(),
        ])));
        let outcome = h.pipeline(false).process(event()).await;

        assert_eq!(outcome, PipelineOutcome::Aborted(AbortReason::RiskRejected));
        assert_eq!(h.execution.call_count(), 0);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_rug_check_error_fails_closed() {
        let mut h = harness();
        h.rug_check = Arc::new(MockRugCheck::new().failing());
        let outcome = h.pipeline(false).process(event()).await;

        assert_eq!(outcome, PipelineOutcome::Aborted(AbortReason::RiskRejected));
        assert_eq!(h.execution.call_count(), 0);
    }

    #[tokio::test]
    async fn test_execution_failure_creates_no_holding() {
        let mut h = harness();
        h.execution = Arc::new(MockExecution::new().with_buy_failure());
        let outcome = h.pipeline(false).process(event()).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Aborted(AbortReason::ExecutionFailed)
        );
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_non_fatal() {
        let mut h = harness();
        h.store = Arc::new(InMemoryHoldingStore::new().failing_inserts());
        let outcome = h.pipeline(false).process(event()).await;

        // The acquisition succeeded even though the record was not written.
        assert_eq!(
            outcome,
            PipelineOutcome::Acquired {
                token_mint: TOKEN.to_string(),
                signature: "BuySig".to_string(),
                simulated: false,
                persisted: false,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_fill_is_non_fatal() {
        let mut h = harness();
        h.tx_detail = Arc::new(MockTxDetail::new().with_mints(
            SIG,
            MintPair {
                base_mint: WSOL.to_string(),
                token_mint: TOKEN.to_string(),
            },
        ));
        let outcome = h.pipeline(false).process(event()).await;

        match outcome {
            PipelineOutcome::Acquired {
                persisted: false, ..
            } => {}
            other => panic!("Expected unpersisted acquisition, got {:?}", other),
        }
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_simulation_never_calls_execution() {
        let h = harness();
        let outcome = h.pipeline(true).process(event()).await;

        match outcome {
            PipelineOutcome::Acquired {
                simulated: true,
                persisted: true,
                ..
            } => {}
            other => panic!("Expected simulated acquisition, got {:?}", other),
        }
        assert_eq!(h.execution.call_count(), 0);
        assert_eq!(h.store.len(), 1);

        let holding = h.store.get(TOKEN).unwrap();
        assert_eq!(holding.program, "simulated");
        assert!((holding.balance - 5.0).abs() < 1e-9);
        // 0.01 SOL at 200 USDC/SOL
        assert!((holding.sol_paid_usdc - 2.0).abs() < 1e-9);
        assert!((holding.sol_fee_paid_usdc - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_simulation_aborts_without_base_price() {
        let mut h = harness();
        h.prices = Arc::new(MockPriceSource::new().then_empty().with_buy_quote(BuyQuote {
            token_mint: TOKEN.to_string(),
            in_amount_lamports: 10_000_000,
            out_amount: 5_000_000_000,
        }));
        let outcome = h.pipeline(true).process(event()).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Aborted(AbortReason::PriceUnavailable)
        );
        assert!(h.store.is_empty());
        assert_eq!(h.execution.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ignored_suffix_skips_token() {
        let h = harness();
        let tx_detail = Arc::new(MockTxDetail::new().with_mints(
            SIG,
            MintPair {
                base_mint: WSOL.to_string(),
                token_mint: "SomethingEndingInpump".to_string(),
            },
        ));
        let pipeline = AcquisitionPipeline::new(
            tx_detail,
            RiskGate::new(h.rug_check.clone(), Some("pump".to_string())),
            RetryingPriceClient::new(h.prices.clone(), Duration::from_millis(1)),
            h.execution.clone(),
            h.store.clone(),
            h.notifier.clone(),
            PipelineConfig {
                base_mint: WSOL.to_string(),
                amount_lamports: 10_000_000,
                pre_quote_delay: Duration::from_millis(1),
                simulation_mode: false,
                program_tag: "raydium".to_string(),
            },
        );

        let outcome = pipeline.process(event()).await;
        assert_eq!(outcome, PipelineOutcome::Aborted(AbortReason::RiskRejected));
        assert_eq!(h.rug_check.call_count(), 0);
    }

    #[test]
    fn test_token_links() {
        let (gmgn, bullx) = token_links("Mint1");
        assert_eq!(gmgn, "https://gmgn.ai/sol/token/Mint1");
        assert_eq!(
            bullx,
            "https://neo.bullx.io/terminal?chainId=1399811149&address=Mint1"
        );
    }

    #[test]
    fn test_synthetic_id_shape() {
        let id = synthetic_execution_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, synthetic_execution_id());
    }
}
