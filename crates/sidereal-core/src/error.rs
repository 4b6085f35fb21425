use thiserror::Error;

use crate::types::TransactionTime;

#[derive(Debug, Error)]
pub enum SiderealError {
    // ── Operation construction ───────────────────────────────────────────────
    #[error("malformed operation: {0}")]
    MalformedOperation(String),

    #[error("malformed base64url encoding: {0}")]
    MalformedEncoding(String),

    #[error("operation is not anchored; hashing requires a transaction time")]
    HashTimeUnknown,

    // ── Documents ────────────────────────────────────────────────────────────
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    // ── Protocol ─────────────────────────────────────────────────────────────
    #[error("no protocol parameters configured for transaction time {0}")]
    NoProtocolConfigured(TransactionTime),

    #[error("unsupported multihash algorithm code {0:#x}")]
    UnsupportedHashAlgorithm(u64),

    #[error("malformed protocol configuration: {0}")]
    MalformedProtocolConfig(String),

    // ── Batch ingestion ──────────────────────────────────────────────────────
    #[error("batch exceeds protocol limit: max {max} operations, got {got}")]
    BatchSizeExceeded { max: usize, got: usize },

    #[error("operation exceeds protocol limit: max {max} bytes, got {got}")]
    OperationSizeExceeded { max: usize, got: usize },

    #[error("malformed batch file: {0}")]
    MalformedBatchFile(String),

    // ── External collaborators ───────────────────────────────────────────────
    #[error("content not found in CAS")]
    NotFound,

    #[error("CAS unavailable: {0}")]
    CasUnavailable(String),
}
