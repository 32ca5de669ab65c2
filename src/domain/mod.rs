//! Domain Layer - Core business logic for the pool sniper
//!
//! Pure domain types and logic with no I/O of their own. All external
//! interactions happen through the ports layer.
//!
//! - `holding`: open position record and PnL / exit-threshold math
//! - `event`: pool-creation filter over raw stream frames
//! - `admission`: bounded permit pool for concurrent pipelines
//! - `risk_gate`: fail-closed rug-check policy plus suffix ignore list

pub mod admission;
pub mod event;
pub mod holding;
pub mod risk_gate;

pub use admission::{AdmissionController, AdmissionPermit};
pub use event::{extract_pool_creation, PoolCreationEvent, POOL_INIT_LOG};
pub use holding::{ExitAction, HoldingError, HoldingRecord};
pub use risk_gate::RiskGate;
