//! Application Layer - Use-case orchestration over domain logic and ports
//!
//! - `orchestrator`: frame filtering, admission and pipeline dispatch
//! - `pipeline`: the acquisition state machine (live and simulated)
//! - `price_client`: bounded-retry wrapper over the price port
//! - `tracker`: the periodic exit trigger engine

pub mod orchestrator;
pub mod pipeline;
pub mod price_client;
pub mod tracker;

pub use orchestrator::{FrameDisposition, SniperOrchestrator};
pub use pipeline::{AbortReason, AcquisitionPipeline, PipelineConfig, PipelineOutcome};
pub use price_client::RetryingPriceClient;
pub use tracker::{CycleReport, ExitTriggerEngine, TrackerConfig};
