//! Holding Record
//!
//! One open token position with its recorded cost basis, plus the pure
//! PnL math and the take-profit / stop-loss exit decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoldingError {
    #[error("Invalid balance: {0}")]
    InvalidBalance(f64),
    #[error("Invalid per-token cost basis: {0}")]
    InvalidCostBasis(f64),
}

/// One open token holding. Created only by a successful acquisition,
/// removed only by a successful liquidation. Fields are write-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingRecord {
    /// Token mint address (store key)
    pub token: String,
    /// Acquisition time
    pub time: DateTime<Utc>,
    /// Token balance held (UI units)
    pub balance: f64,
    /// SOL spent on the buy
    pub sol_paid: f64,
    /// SOL paid in fees
    pub sol_fee_paid: f64,
    /// USDC value of the SOL spent at acquisition time
    pub sol_paid_usdc: f64,
    /// USDC value of the fee at acquisition time
    pub sol_fee_paid_usdc: f64,
    /// Derived per-token cost basis in USDC
    pub per_token_paid_usdc: f64,
    /// Originating program/venue tag
    pub program: String,
}

impl HoldingRecord {
    pub fn new(
        token: String,
        time: DateTime<Utc>,
        balance: f64,
        sol_paid: f64,
        sol_fee_paid: f64,
        sol_paid_usdc: f64,
        sol_fee_paid_usdc: f64,
        program: String,
    ) -> Result<Self, HoldingError> {
        if balance <= 0.0 {
            return Err(HoldingError::InvalidBalance(balance));
        }
        let per_token_paid_usdc = sol_paid_usdc / balance;
        if !per_token_paid_usdc.is_finite() || per_token_paid_usdc <= 0.0 {
            return Err(HoldingError::InvalidCostBasis(per_token_paid_usdc));
        }

        Ok(Self {
            token,
            time,
            balance,
            sol_paid,
            sol_fee_paid,
            sol_paid_usdc,
            sol_fee_paid_usdc,
            per_token_paid_usdc,
            program,
        })
    }

    /// Unrealized PnL in USDC at the given current price, net of fees.
    pub fn unrealized_pnl_usdc(&self, current_price: f64) -> f64 {
        (current_price - self.per_token_paid_usdc) * self.balance - self.sol_fee_paid_usdc
    }

    /// Unrealized PnL as a percentage of the cost basis.
    pub fn unrealized_pnl_pct(&self, current_price: f64) -> f64 {
        let basis = self.per_token_paid_usdc * self.balance;
        if basis == 0.0 {
            return 0.0;
        }
        self.unrealized_pnl_usdc(current_price) / basis * 100.0
    }
}

/// Which exit threshold fired for a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    TakeProfit,
    StopLoss,
}

impl ExitAction {
    /// Decide whether an exit fires at the given PnL percentage.
    ///
    /// Take-profit is evaluated first and wins ties; at most one action is
    /// returned per evaluation.
    pub fn decide(pnl_pct: f64, take_profit_pct: f64, stop_loss_pct: f64) -> Option<Self> {
        if pnl_pct >= take_profit_pct {
            return Some(ExitAction::TakeProfit);
        }
        if pnl_pct <= -stop_loss_pct {
            return Some(ExitAction::StopLoss);
        }
        None
    }
}
