//! ─── Sidereal Protocol Constants ────────────────────────────────────────────
//!
//! Layer-2 DID overlay: operations anchored on an external ledger are folded
//! into per-DID documents. These constants fix the method identity and the
//! genesis protocol limits; limits for later ledger epochs come from the
//! protocol registry.

// ── DID method ───────────────────────────────────────────────────────────────

/// DID method prefix. Full DID strings are `<prefix><unique suffix>`.
pub const DID_METHOD_PREFIX: &str = "did:sidereal:";

// ── Hashing ──────────────────────────────────────────────────────────────────

/// Multihash algorithm code for SHA2-256, the only hash defined at genesis.
pub const SHA256_MULTIHASH_CODE: u64 = 0x12;

// ── Genesis protocol limits ──────────────────────────────────────────────────

/// Maximum operations in a single batch file.
pub const DEFAULT_MAX_OPERATIONS_PER_BATCH: usize = 10_000;

/// Maximum size of a single operation buffer in bytes.
pub const DEFAULT_MAX_OPERATION_BYTE_SIZE: usize = 2_000;
