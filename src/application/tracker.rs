//! Exit Trigger Engine
//!
//! Periodically re-prices every open holding and liquidates positions
//! whose PnL crosses the configured take-profit or stop-loss threshold.
//! Cycles run strictly sequentially on one timer; a cycle that cannot
//! price the portfolio is skipped whole and retried next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::holding::{ExitAction, HoldingRecord};
use crate::ports::execution::ExecutionPort;
use crate::ports::market_data::PricePort;
use crate::ports::notifier::NotifierPort;
use crate::ports::store::HoldingStore;

use super::pipeline::synthetic_execution_id;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Base currency mint received on sells
    pub base_mint: String,
    /// Interval between evaluation cycles
    pub poll_interval: Duration,
    /// Evaluate thresholds and liquidate; false means display-only
    pub auto_sell: bool,
    /// Take-profit threshold, percent of cost basis
    pub take_profit_pct: f64,
    /// Stop-loss threshold, percent of cost basis (positive number)
    pub stop_loss_pct: f64,
    /// Replace live sells with synthetic fills
    pub simulation_mode: bool,
    /// Mirror the per-cycle portfolio display to the notifier
    pub notify_status: bool,
    /// Public wallet whose tracking link is appended to the display
    pub track_wallet: Option<String>,
}

/// What one evaluation cycle did, returned for tests and logging.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Holdings evaluated against current prices
    pub evaluated: usize,
    /// Holdings skipped because their price was missing
    pub skipped: usize,
    /// Tokens liquidated this cycle
    pub liquidated: Vec<String>,
    /// Human-readable status, one line per holding
    pub status_lines: Vec<String>,
}

pub struct ExitTriggerEngine {
    store: Arc<dyn HoldingStore>,
    prices: Arc<dyn PricePort>,
    execution: Arc<dyn ExecutionPort>,
    notifier: Arc<dyn NotifierPort>,
    config: TrackerConfig,
}

impl ExitTriggerEngine {
    pub fn new(
        store: Arc<dyn HoldingStore>,
        prices: Arc<dyn PricePort>,
        execution: Arc<dyn ExecutionPort>,
        notifier: Arc<dyn NotifierPort>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            store,
            prices,
            execution,
            notifier,
            config,
        }
    }

    /// Run evaluation cycles forever. The next cycle never starts before
    /// the previous one finished; ticks missed during a slow cycle are
    /// delayed, not bursted.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.run_cycle().await;
        }
    }

    /// One evaluation cycle over the whole portfolio.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let holdings = match self.store.all().await {
            Ok(holdings) => holdings,
            Err(e) => {
                warn!("Could not read holdings: {}. Skipping cycle.", e);
                return report;
            }
        };

        if holdings.is_empty() {
            report.status_lines.push("No token holdings yet".to_string());
            info!("No token holdings yet");
            return report;
        }

        // One batch request per cycle, current prices for every holding.
        let mut mints: Vec<String> = holdings.iter().map(|h| h.token.clone()).collect();
        mints.push(self.config.base_mint.clone());
        let prices = match self.prices.get_prices(&mints).await {
            Ok(prices) if !prices.is_empty() => prices,
            Ok(_) => {
                warn!("Latest prices could not be fetched. Skipping cycle.");
                return report;
            }
            Err(e) => {
                warn!("Price request failed: {}. Skipping cycle.", e);
                return report;
            }
        };

        for holding in &holdings {
            let Some(&price) = prices.get(&holding.token) else {
                report.skipped += 1;
                report
                    .status_lines
                    .push(format!("{}: price unavailable", holding.token));
                continue;
            };
            report.evaluated += 1;

            let pnl_usdc = holding.unrealized_pnl_usdc(price);
            let pnl_pct = holding.unrealized_pnl_pct(price);
            let mut line = format!(
                "{} | bought {} | balance {:.4} | paid {:.2} USDC | PnL {:.6} USDC ({:+.2}%)",
                holding.token,
                holding.time.format("%Y-%m-%d %H:%M:%S"),
                holding.balance,
                holding.sol_paid_usdc,
                pnl_usdc,
                pnl_pct
            );

            // Exit outcome belongs on the same status line as the PnL it
            // was decided on.
            if self.config.auto_sell {
                if let Some(action) = ExitAction::decide(
                    pnl_pct,
                    self.config.take_profit_pct,
                    self.config.stop_loss_pct,
                ) {
                    if self.liquidate(holding, action).await {
                        report.liquidated.push(holding.token.clone());
                        line.push_str(match action {
                            ExitAction::TakeProfit => " | Took Profit",
                            ExitAction::StopLoss => " | Stop Loss",
                        });
                    } else {
                        line.push_str(" | sell failed, retrying next cycle");
                    }
                }
            }
            report.status_lines.push(line);
        }

        let mut status_text = report.status_lines.join("\n");
        if let Some(wallet) = &self.config.track_wallet {
            status_text.push_str(&format!(
                "\nWallet: https://gmgn.ai/sol/address/{}",
                wallet
            ));
        }
        info!("Current holdings:\n{}", status_text);
        if self.config.notify_status {
            self.notifier.notify(&status_text).await;
        }

        report
    }

    /// Sell one holding and remove it from the store. Returns false when
    /// the sell failed; the holding stays for the next cycle.
    async fn liquidate(&self, holding: &HoldingRecord, action: ExitAction) -> bool {
        let signature = if self.config.simulation_mode {
            synthetic_execution_id()
        } else {
            let amount = sell_amount(holding.balance);
            match self
                .execution
                .sell(&self.config.base_mint, &holding.token, &amount)
                .await
            {
                Ok(sig) => sig,
                Err(e) => {
                    warn!(
                        "Sell failed for {}: {}. Will retry next cycle.",
                        holding.token, e
                    );
                    return false;
                }
            }
        };

        if let Err(e) = self.store.remove(&holding.token).await {
            warn!("Could not remove sold holding {}: {}", holding.token, e);
        }

        let message = match action {
            ExitAction::TakeProfit => {
                format!("Took Profit: https://solscan.io/tx/{}", signature)
            }
            ExitAction::StopLoss => {
                format!("Stop Loss triggered: https://solscan.io/tx/{}", signature)
            }
        };
        info!("{}", message);
        self.notifier.notify(&message).await;
        true
    }
}

/// Raw sell amount for the swap service: the UI balance with the decimal
/// point dropped, matching how the fill amount was recorded.
fn sell_amount(balance: f64) -> String {
    balance.to_string().replace('.', "")
}
