//! Ports Layer - Trait definitions for external collaborators
//!
//! Following hexagonal architecture, these traits abstract everything the
//! core calls out to:
//! - Swap execution (buy/sell via the quote+swap service)
//! - Market data (batch prices, read-only buy quotes)
//! - Rug check verdicts
//! - Transaction-detail lookups
//! - Durable holding storage
//! - Best-effort operator notifications
//!
//! `mocks` holds recording implementations used across the test suite.

pub mod execution;
pub mod market_data;
pub mod mocks;
pub mod notifier;
pub mod rug_check;
pub mod store;
pub mod transactions;
