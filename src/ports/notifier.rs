//! Notifier Port
//!
//! Fire-and-forget text delivery to the operator. Implementations log
//! delivery failures themselves; nothing propagates to callers.

use async_trait::async_trait;

#[async_trait]
pub trait NotifierPort: Send + Sync {
    /// Deliver a message best-effort. Failures are logged, never returned.
    async fn notify(&self, message: &str);
}
