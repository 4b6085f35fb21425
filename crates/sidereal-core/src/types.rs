use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger-assigned logical time at which a transaction was anchored
/// (block height or equivalent).
pub type TransactionTime = u64;

/// Strict total order assigned by the ledger across all anchored
/// transactions.
pub type TransactionNumber = u64;

/// Position of an operation within its batch file.
pub type OperationIndex = u32;

// ── OperationType ────────────────────────────────────────────────────────────

/// Every DID mutation anchored on the ledger is one of these variants.
///
/// `Recover` is reserved in the wire format; its payload semantics are not
/// yet defined and recover operations are rejected at payload validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Create,
    Update,
    Delete,
    Recover,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "create",
            OperationType::Update => "update",
            OperationType::Delete => "delete",
            OperationType::Recover => "recover",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(OperationType::Create),
            "update" => Some(OperationType::Update),
            "delete" => Some(OperationType::Delete),
            "recover" => Some(OperationType::Recover),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── AnchoringContext ─────────────────────────────────────────────────────────

/// The ledger-supplied envelope accompanying every ingested operation.
///
/// `(transaction_number, operation_index)` is globally unique and totally
/// ordered; every deterministic tie-break in resolution consults it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoringContext {
    /// Ledger time of the anchoring transaction. Selects the protocol
    /// parameters in force for this operation.
    pub transaction_time: TransactionTime,

    /// Position of the anchoring transaction in the ledger's total order.
    pub transaction_number: TransactionNumber,

    /// CAS address of the batch file this operation was read from.
    pub batch_file_hash: Vec<u8>,

    /// Position of this operation within the batch file.
    pub operation_index: OperationIndex,
}

impl AnchoringContext {
    /// The global ordering key imposed by the ledger.
    pub fn ledger_order(&self) -> (TransactionNumber, OperationIndex) {
        (self.transaction_number, self.operation_index)
    }
}

// ── OperationHash ────────────────────────────────────────────────────────────

/// Base64url-encoded multihash content-addressing one operation.
///
/// Creates are identified by their hash (it becomes the DID unique suffix);
/// updates link to their predecessor through it. Since the encoding is
/// canonical, string equality is byte-wise digest equality.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationHash(String);

impl OperationHash {
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OperationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for OperationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(12).collect();
        write!(f, "OperationHash({head}…)")
    }
}

// ── UniqueSuffix ─────────────────────────────────────────────────────────────

/// The method-specific suffix of a DID: the base64url multihash of the
/// Create operation's encoded payload. The full DID string is
/// `<method prefix><unique suffix>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniqueSuffix(String);

impl UniqueSuffix {
    pub fn new(suffix: String) -> Self {
        Self(suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A Create operation's unique suffix is exactly its operation hash.
    pub fn matches_hash(&self, hash: &OperationHash) -> bool {
        self.0 == hash.as_str()
    }
}

impl From<OperationHash> for UniqueSuffix {
    fn from(hash: OperationHash) -> Self {
        Self(hash.into_string())
    }
}

impl fmt::Display for UniqueSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for UniqueSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(12).collect();
        write!(f, "UniqueSuffix({head}…)")
    }
}
