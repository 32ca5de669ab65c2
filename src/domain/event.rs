//! Pool Creation Event Filter
//!
//! Pure extractor over raw `logsNotification` frames from the streaming
//! subscription. A frame qualifies only if it carries a log-line array with
//! the Raydium pool-initialization marker and a well-formed signature.

use serde_json::Value;
use tracing::debug;

/// Log line emitted by Raydium when a new liquidity pool is initialized.
pub const POOL_INIT_LOG: &str = "Program log: initialize2: InitializeInstruction2";

/// Candidate extracted from one stream frame. Ephemeral: lives only for the
/// duration of one pipeline invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCreationEvent {
    /// Transaction signature of the pool-creation transaction
    pub signature: String,
}

/// Extract a pool-creation candidate from a raw frame, if it qualifies.
///
/// Returns `None` for anything malformed: not JSON, no log array, no
/// matching marker line, or a missing/empty signature. Malformed frames are
/// dropped silently (debug log only).
pub fn extract_pool_creation(raw: &str) -> Option<PoolCreationEvent> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            debug!("Dropping non-JSON frame: {}", e);
            return None;
        }
    };

    let value = parsed.get("params")?.get("result")?.get("value")?;

    let logs = value.get("logs")?.as_array()?;
    let contains_create = logs
        .iter()
        .filter_map(|l| l.as_str())
        .any(|l| l.contains(POOL_INIT_LOG));
    if !contains_create {
        return None;
    }

    let signature = value.get("signature")?.as_str()?;
    if signature.is_empty() {
        debug!("Dropping pool-creation frame with empty signature");
        return None;
    }

    Some(PoolCreationEvent {
        signature: signature.to_string(),
    })
}
