use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sidereal_core::error::SiderealError;
use sidereal_core::types::{TransactionNumber, TransactionTime};

#[derive(Debug, Error)]
pub enum CasError {
    #[error("content not found in CAS")]
    NotFound,
    #[error("CAS unavailable: {0}")]
    Unavailable(String),
}

impl From<CasError> for SiderealError {
    fn from(error: CasError) -> Self {
        match error {
            CasError::NotFound => SiderealError::NotFound,
            CasError::Unavailable(message) => SiderealError::CasUnavailable(message),
        }
    }
}

// ── Ledger feed ──────────────────────────────────────────────────────────────

/// One anchoring transaction from the ledger feed, in strictly increasing
/// `transaction_number`. `transaction_time_hash` and `anchor_file_hash` are
/// carried but opaque to this layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolvedTransaction {
    pub transaction_time: TransactionTime,
    pub transaction_number: TransactionNumber,
    pub transaction_time_hash: Vec<u8>,
    pub anchor_file_hash: Vec<u8>,
    pub batch_file_hash: Vec<u8>,
}

// ── CAS ──────────────────────────────────────────────────────────────────────

/// Read access to the content-addressed store holding batch files.
#[allow(async_fn_in_trait)]
pub trait CasClient {
    async fn read(&self, address: &[u8]) -> Result<Vec<u8>, CasError>;
}

/// In-memory CAS used by tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryCas {
    blobs: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under `address`.
    pub fn put(&self, address: &[u8], content: Vec<u8>) {
        self.blobs
            .lock()
            .expect("cas mutex poisoned")
            .insert(address.to_vec(), content);
    }
}

impl CasClient for MemoryCas {
    async fn read(&self, address: &[u8]) -> Result<Vec<u8>, CasError> {
        self.blobs
            .lock()
            .expect("cas mutex poisoned")
            .get(address)
            .cloned()
            .ok_or(CasError::NotFound)
    }
}
