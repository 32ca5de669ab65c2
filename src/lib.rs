//! Pool Sniper - Raydium Liquidity Pool Sniper Bot Library
//!
//! Watches AMM program logs for new liquidity pools, rug-checks the new
//! token, buys it through a swap service and liquidates the position when
//! its PnL crosses a take-profit or stop-loss threshold.
//!
//! # Modules
//!
//! - `domain`: Core business logic (events, admission, risk gate, holdings)
//! - `ports`: Trait abstractions over external collaborators
//! - `adapters`: External implementations (stream, Jupiter, RugCheck, Helius)
//! - `config`: Configuration loading and validation
//! - `application`: Pipeline, tracker and orchestration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
