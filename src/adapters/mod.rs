//! Adapters Layer - Concrete implementations of the ports
//!
//! - `stream`: WebSocket log subscription feeding raw frames
//! - `jupiter`: price/quote market data and swap execution
//! - `rugcheck`: token report safety assessments
//! - `helius`: enhanced transaction-detail lookups
//! - `store`: file-backed JSON holding store
//! - `discord`: webhook notifier

pub mod discord;
pub mod helius;
pub mod jupiter;
pub mod rugcheck;
pub mod store;
pub mod stream;

pub use discord::{DiscordNotifier, NoopNotifier};
pub use helius::HeliusTxClient;
pub use jupiter::{JupiterPriceClient, JupiterSwapClient};
pub use rugcheck::RugCheckClient;
pub use store::JsonHoldingStore;
pub use stream::{LogStream, LogStreamConfig};
