use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_OPERATIONS_PER_BATCH, DEFAULT_MAX_OPERATION_BYTE_SIZE, SHA256_MULTIHASH_CODE,
};
use crate::error::SiderealError;
use crate::types::TransactionTime;

// ── ProtocolParameters ───────────────────────────────────────────────────────

/// Parameters in force for operations anchored at a given ledger time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameters {
    /// Multihash algorithm code used for operation hashing.
    pub hash_algorithm_code: u64,

    /// Maximum size of a single operation buffer in bytes.
    pub max_operation_byte_size: usize,

    /// Maximum number of operations in one batch file.
    pub max_operations_per_batch: usize,
}

/// One protocol version: parameters plus the ledger time they take effect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub starting_transaction_time: TransactionTime,
    #[serde(flatten)]
    pub parameters: ProtocolParameters,
}

// ── ProtocolRegistry ─────────────────────────────────────────────────────────

/// Process-wide mapping from ledger time to the protocol version in force.
///
/// Built once at startup from a configuration source and handed to
/// consumers by reference (or `Arc`); there is no ambient global.
#[derive(Debug)]
pub struct ProtocolRegistry {
    /// Sorted ascending by `starting_transaction_time`, validated distinct.
    versions: Vec<ProtocolVersion>,
}

impl ProtocolRegistry {
    /// Build a registry from version entries. The set must be non-empty and
    /// free of duplicate start times.
    pub fn new(mut versions: Vec<ProtocolVersion>) -> Result<Self, SiderealError> {
        if versions.is_empty() {
            return Err(SiderealError::MalformedProtocolConfig(
                "no protocol versions configured".into(),
            ));
        }
        versions.sort_by_key(|v| v.starting_transaction_time);
        for pair in versions.windows(2) {
            if pair[0].starting_transaction_time == pair[1].starting_transaction_time {
                return Err(SiderealError::MalformedProtocolConfig(format!(
                    "duplicate starting_transaction_time {}",
                    pair[0].starting_transaction_time
                )));
            }
        }
        Ok(Self { versions })
    }

    /// Load a registry from a JSON array of version entries.
    pub fn from_json(json: &str) -> Result<Self, SiderealError> {
        let versions: Vec<ProtocolVersion> = serde_json::from_str(json)
            .map_err(|e| SiderealError::MalformedProtocolConfig(e.to_string()))?;
        Self::new(versions)
    }

    /// Parameters in force at `transaction_time`: the version with the
    /// largest start time `<=` the query.
    pub fn get(
        &self,
        transaction_time: TransactionTime,
    ) -> Result<&ProtocolParameters, SiderealError> {
        self.versions
            .iter()
            .rev()
            .find(|v| v.starting_transaction_time <= transaction_time)
            .map(|v| &v.parameters)
            .ok_or(SiderealError::NoProtocolConfigured(transaction_time))
    }

    /// Single-version registry with the genesis defaults, effective from
    /// ledger time zero. Used by tests and local tooling.
    pub fn testnet() -> Self {
        Self {
            versions: vec![ProtocolVersion {
                starting_transaction_time: 0,
                parameters: ProtocolParameters {
                    hash_algorithm_code: SHA256_MULTIHASH_CODE,
                    max_operation_byte_size: DEFAULT_MAX_OPERATION_BYTE_SIZE,
                    max_operations_per_batch: DEFAULT_MAX_OPERATIONS_PER_BATCH,
                },
            }],
        }
    }
}
