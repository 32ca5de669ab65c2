//! Holding Store Port
//!
//! Durable storage for open holdings, keyed by token mint. The pipeline
//! creates records, the exit tracker reads and deletes them. Inserting an
//! already-held mint replaces the record (last write wins).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::holding::HoldingRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[async_trait]
pub trait HoldingStore: Send + Sync {
    /// Persist a holding. The record must be fully visible to `all()` once
    /// this call returns.
    async fn insert(&self, holding: HoldingRecord) -> Result<(), StoreError>;

    /// All currently open holdings.
    async fn all(&self) -> Result<Vec<HoldingRecord>, StoreError>;

    /// Remove the holding for a token mint. Removing an absent mint is not
    /// an error.
    async fn remove(&self, token_mint: &str) -> Result<(), StoreError>;
}
