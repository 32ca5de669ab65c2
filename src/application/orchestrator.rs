//! Sniper Orchestrator
//!
//! Consumes raw frames from the log stream, filters them down to pool
//! creation events and dispatches one acquisition pipeline per admitted
//! event. Admission is load-shedding: at capacity the event is dropped
//! and the stream keeps flowing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::admission::AdmissionController;
use crate::domain::event::extract_pool_creation;

use super::pipeline::{AcquisitionPipeline, PipelineOutcome};

/// What happened to one incoming frame.
#[derive(Debug)]
pub enum FrameDisposition {
    /// Not a pool creation event (or carried no signature)
    Ignored,
    /// Qualifying event dropped at the concurrency cap
    Shed,
    /// Pipeline spawned for the event
    Dispatched(JoinHandle<()>),
}

pub struct SniperOrchestrator {
    pipeline: Arc<AcquisitionPipeline>,
    admission: AdmissionController,
    verbose_log: bool,
}

impl SniperOrchestrator {
    pub fn new(
        pipeline: Arc<AcquisitionPipeline>,
        admission: AdmissionController,
        verbose_log: bool,
    ) -> Self {
        Self {
            pipeline,
            admission,
            verbose_log,
        }
    }

    /// Classify and dispatch one raw frame.
    pub fn handle_frame(&self, raw: &str) -> FrameDisposition {
        let Some(event) = extract_pool_creation(raw) else {
            return FrameDisposition::Ignored;
        };

        if self.verbose_log {
            debug!(signature = %event.signature, "Pool creation log received");
        }

        let Some(permit) = self.admission.try_acquire() else {
            info!(
                "Too many pending acquisitions ({}). Skipping this pool.",
                self.admission.max_concurrent()
            );
            return FrameDisposition::Shed;
        };

        let pipeline = Arc::clone(&self.pipeline);
        let signature = event.signature.clone();
        let handle = tokio::spawn(async move {
            // Permit lives for the whole task; any exit path releases it.
            let _permit = permit;
            match pipeline.process(event).await {
                PipelineOutcome::Acquired { token_mint, .. } => {
                    info!("Acquisition complete for {}", token_mint);
                }
                PipelineOutcome::Aborted(reason) => {
                    debug!(signature = %signature, ?reason, "Pipeline aborted");
                }
            }
        });
        FrameDisposition::Dispatched(handle)
    }

    /// Drain frames until the stream side closes the channel.
    pub async fn run(&self, mut frames: mpsc::Receiver<String>) {
        while let Some(raw) = frames.recv().await {
            self.handle_frame(&raw);
        }
        info!("Frame channel closed. Orchestrator stopping.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::risk_gate::RiskGate;
    use crate::ports::mocks::{
        InMemoryHoldingStore, MockExecution, MockNotifier, MockPriceSource, MockRugCheck,
        MockTxDetail,
    };
    use crate::ports::transactions::MintPair;
    use crate::application::pipeline::PipelineConfig;
    use crate::application::price_client::RetryingPriceClient;

    const WSOL: &str = "So11111111111111111111111111111111111111112";
    const TOKEN: &str = "TokenMint111111111111111111111111111111111";

    fn pool_frame(signature: &str) -> String {
        format!(
            r#"{{"jsonrpc":"2.0","method":"logsNotification","params":{{"result":{{"value":{{"signature":"{}","logs":["Program log: initialize2: InitializeInstruction2"]}}}},"subscription":1}}}}"#,
            signature
        )
    }

    fn orchestrator(max_concurrent: usize, execution: Arc<MockExecution>) -> SniperOrchestrator {
        let tx_detail = Arc::new(MockTxDetail::new().with_mints(
            "Sig1",
            MintPair {
                base_mint: WSOL.to_string(),
                token_mint: TOKEN.to_string(),
            },
        ));
        let pipeline = Arc::new(AcquisitionPipeline::new(
            tx_detail,
            RiskGate::new(Arc::new(MockRugCheck::new()), None),
            RetryingPriceClient::new(
                Arc::new(MockPriceSource::new().then_prices(&[(WSOL, 200.0)])),
                Duration::from_millis(1),
            ),
            execution,
            Arc::new(InMemoryHoldingStore::new()),
            Arc::new(MockNotifier::new()),
            PipelineConfig {
                base_mint: WSOL.to_string(),
                amount_lamports: 10_000_000,
                pre_quote_delay: Duration::from_millis(20),
                simulation_mode: false,
                program_tag: "raydium".to_string(),
            },
        ));
        SniperOrchestrator::new(pipeline, AdmissionController::new(max_concurrent), false)
    }

    #[tokio::test]
    async fn test_non_pool_frames_ignored() {
        let orch = orchestrator(2, Arc::new(MockExecution::new()));

        let disposition = orch.handle_frame(r#"{"jsonrpc":"2.0","result":123,"id":1}"#);
        assert!(matches!(disposition, FrameDisposition::Ignored));
        assert_eq!(orch.admission.active(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_holds_permit_until_pipeline_done() {
        let orch = orchestrator(1, Arc::new(MockExecution::new().with_buy_signature("Buy")));

        let first = orch.handle_frame(&pool_frame("Sig1"));
        let FrameDisposition::Dispatched(handle) = first else {
            panic!("first frame should dispatch");
        };

        // Pipeline still inside its pre-quote delay: second event is shed.
        let second = orch.handle_frame(&pool_frame("Sig2"));
        assert!(matches!(second, FrameDisposition::Shed));

        handle.await.unwrap();
        assert_eq!(orch.admission.active(), 0);

        // Slot free again after completion
        let third = orch.handle_frame(&pool_frame("Sig1"));
        assert!(matches!(third, FrameDisposition::Dispatched(_)));
    }

    #[tokio::test]
    async fn test_run_drains_channel_until_close() {
        let orch = orchestrator(4, Arc::new(MockExecution::new()));
        let (tx, rx) = mpsc::channel(8);

        tx.send(r#"not json"#.to_string()).await.unwrap();
        tx.send(pool_frame("Sig1")).await.unwrap();
        drop(tx);

        // Returns once the channel closes
        orch.run(rx).await;
    }
}
