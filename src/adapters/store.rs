//! JSON Holding Store
//!
//! File-backed implementation of the holding store: one JSON document
//! holding every open position, keyed by token mint. The map is rewritten
//! whole on every mutation and guarded by a mutex, so `all()` always sees
//! a record once its `insert()` returned.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::holding::HoldingRecord;
use crate::ports::store::{HoldingStore, StoreError};

pub struct JsonHoldingStore {
    path: PathBuf,
    holdings: Mutex<HashMap<String, HoldingRecord>>,
}

impl JsonHoldingStore {
    /// Open the store, loading any holdings persisted by a previous run.
    /// A missing file starts empty; a corrupt file is an error.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let holdings = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::IoError(e.to_string())),
        };
        debug!(path = %path.display(), count = holdings.len(), "Holding store opened");
        Ok(Self {
            path,
            holdings: Mutex::new(holdings),
        })
    }

    fn write_file(&self, holdings: &HashMap<String, HoldingRecord>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(holdings)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| StoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl HoldingStore for JsonHoldingStore {
    async fn insert(&self, holding: HoldingRecord) -> Result<(), StoreError> {
        let mut holdings = self.holdings.lock().await;
        holdings.insert(holding.token.clone(), holding);
        self.write_file(&holdings)
    }

    async fn all(&self) -> Result<Vec<HoldingRecord>, StoreError> {
        let holdings = self.holdings.lock().await;
        Ok(holdings.values().cloned().collect())
    }

    async fn remove(&self, token_mint: &str) -> Result<(), StoreError> {
        let mut holdings = self.holdings.lock().await;
        if holdings.remove(token_mint).is_some() {
            self.write_file(&holdings)?;
        }
        Ok(())
    }
}
