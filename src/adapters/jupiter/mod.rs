//! Jupiter API adapters: market data (price port) and swap execution
//! (execution port).

pub mod price;
pub mod swap;

pub use price::JupiterPriceClient;
pub use swap::JupiterSwapClient;
