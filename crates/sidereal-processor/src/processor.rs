use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use sidereal_core::constants::DID_METHOD_PREFIX;
use sidereal_core::error::SiderealError;
use sidereal_core::protocol::ProtocolRegistry;
use sidereal_core::types::{OperationHash, TransactionNumber, UniqueSuffix};
use sidereal_document::{apply_patch, DidDocument};

use crate::operation::{Operation, OperationDetail};
use crate::store::{IndexedOperation, OperationBucket, OperationStore};

// ── OperationProcessor ───────────────────────────────────────────────────────

/// Per-DID reconstruction engine.
///
/// `process` only indexes operations; every correctness decision —
/// signature checks, chain selection, patch application — happens in
/// `resolve`. That split is what makes ingestion idempotent and
/// order-independent: the resolved document is a function of the operation
/// set, not of arrival order.
pub struct OperationProcessor {
    registry: Arc<ProtocolRegistry>,
    method_prefix: String,
    store: OperationStore,
}

impl OperationProcessor {
    pub fn new(registry: Arc<ProtocolRegistry>) -> Self {
        Self::with_method_prefix(registry, DID_METHOD_PREFIX)
    }

    pub fn with_method_prefix(registry: Arc<ProtocolRegistry>, method_prefix: &str) -> Self {
        Self {
            registry,
            method_prefix: method_prefix.to_string(),
            store: OperationStore::default(),
        }
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    pub fn method_prefix(&self) -> &str {
        &self.method_prefix
    }

    /// Number of operations currently indexed.
    pub fn operation_count(&self) -> usize {
        self.store.len()
    }

    // ── Ingestion ────────────────────────────────────────────────────────────

    /// Index an anchored operation.
    ///
    /// Idempotent: redelivery of an already-seen
    /// `(transaction_number, operation_index)` slot is a no-op. Operations
    /// addressing a foreign DID method are inert. No signature or chain
    /// validation happens here.
    pub fn process(&mut self, operation: Operation) -> Result<(), SiderealError> {
        let anchoring = operation
            .anchoring()
            .ok_or(SiderealError::HashTimeUnknown)?
            .clone();
        let hash = operation.operation_hash(&self.registry)?;
        let Some(suffix) = operation.unique_suffix(&self.registry, &self.method_prefix)? else {
            debug!(
                did = operation.did().unwrap_or_default(),
                "operation targets a foreign DID method; ignored"
            );
            return Ok(());
        };

        let indexed = IndexedOperation {
            hash,
            operation: Arc::new(operation),
        };
        if self.store.insert(anchoring.ledger_order(), suffix.clone(), indexed) {
            info!(
                %suffix,
                transaction_number = anchoring.transaction_number,
                operation_index = anchoring.operation_index,
                "indexed operation"
            );
        } else {
            debug!(
                transaction_number = anchoring.transaction_number,
                operation_index = anchoring.operation_index,
                "duplicate delivery ignored"
            );
        }
        Ok(())
    }

    /// Discard every operation with `transaction_number > n`. Used when the
    /// ledger reorganizes; state is rebuilt from the retained operations.
    pub fn rollback(&mut self, transaction_number: TransactionNumber) {
        let removed = self.store.rollback(transaction_number);
        info!(transaction_number, removed, "rolled back operations");
    }

    // ── Resolution ───────────────────────────────────────────────────────────

    /// Materialize the current DID Document for `did`, or `None` when no
    /// valid chain exists (including tombstoned DIDs).
    ///
    /// Deterministic under any ingestion order: every selection among peers
    /// breaks ties by `(transaction_number, operation_index)`, and document
    /// construction is a pure function of the chosen chain. Invalid
    /// operations are skipped, never surfaced as errors: anchored content
    /// may be deliberately adversarial.
    pub fn resolve(&self, did: &str) -> Option<DidDocument> {
        let suffix = UniqueSuffix::new(did.strip_prefix(&self.method_prefix)?.to_string());
        let bucket = self.store.bucket(&suffix)?;

        let create = self.select_create(bucket, &suffix)?;
        let OperationDetail::Create { did_document } = create.operation.detail() else {
            return None;
        };
        let mut document = did_document.clone();

        let mut tip_hash = create.hash.clone();
        let mut expected_operation_number = 1u32;
        let mut visited: HashSet<OperationHash> = HashSet::from([tip_hash.clone()]);

        while let Some((accepted_hash, patched)) =
            self.select_update(bucket, &tip_hash, expected_operation_number, &document)
        {
            // A link structure that revisits a hash cannot be a valid chain.
            if !visited.insert(accepted_hash.clone()) {
                break;
            }
            tip_hash = accepted_hash;
            document = patched;
            expected_operation_number += 1;
        }

        if self.tombstoned(bucket, &document) {
            return None;
        }
        Some(document)
    }

    /// The canonical Create for `suffix`: among candidates whose hash equals
    /// the suffix, the earliest in ledger order — provided its signature
    /// verifies against the named key in its own document.
    fn select_create<'a>(
        &self,
        bucket: &'a OperationBucket,
        suffix: &UniqueSuffix,
    ) -> Option<&'a IndexedOperation> {
        let mut candidates: Vec<&IndexedOperation> = bucket
            .creates
            .iter()
            .filter(|c| suffix.matches_hash(&c.hash))
            .collect();
        candidates.sort_by_key(|c| c.operation.ledger_order());

        let earliest = candidates.first()?;
        let OperationDetail::Create { did_document } = earliest.operation.detail() else {
            return None;
        };
        if !signature_valid(&earliest.operation, did_document) {
            debug!(%suffix, "create signature rejected");
            return None;
        }
        Some(earliest)
    }

    /// Extend the chain by one operation: the earliest update in ledger
    /// order claiming `tip_hash` that passes the signature check against the
    /// current document, carries the expected operation number, and whose
    /// patch applies cleanly. Later peers are tried when an earlier one
    /// fails.
    fn select_update(
        &self,
        bucket: &OperationBucket,
        tip_hash: &OperationHash,
        expected_operation_number: u32,
        document: &DidDocument,
    ) -> Option<(OperationHash, DidDocument)> {
        let mut candidates: Vec<&IndexedOperation> =
            bucket.updates.get(tip_hash)?.iter().collect();
        candidates.sort_by_key(|c| c.operation.ledger_order());

        for candidate in candidates {
            let OperationDetail::Update {
                operation_number,
                patch,
                ..
            } = candidate.operation.detail()
            else {
                continue;
            };
            if !signature_valid(&candidate.operation, document) {
                debug!(hash = %candidate.hash, "update signature rejected; skipping");
                continue;
            }
            if *operation_number != expected_operation_number {
                debug!(
                    hash = %candidate.hash,
                    got = *operation_number,
                    expected = expected_operation_number,
                    "operation number out of sequence; skipping"
                );
                continue;
            }
            match apply_patch(document, patch) {
                Ok(patched) => return Some((candidate.hash.clone(), patched)),
                Err(error) => {
                    debug!(hash = %candidate.hash, %error, "patch rejected; skipping");
                }
            }
        }
        None
    }

    /// Whether any Delete for this DID verifies against a key present in
    /// the document as resolved. One valid Delete suffices.
    fn tombstoned(&self, bucket: &OperationBucket, document: &DidDocument) -> bool {
        bucket
            .deletes
            .iter()
            .any(|d| signature_valid(&d.operation, document))
    }
}

/// Look up the operation's signing key in `document` and verify the
/// signature. A missing key, unparseable key material, or a bad signature
/// all make the operation ineligible.
fn signature_valid(operation: &Operation, document: &DidDocument) -> bool {
    document
        .public_key(operation.signing_key_id())
        .and_then(|key| key.verification_key())
        .is_some_and(|public_key| operation.verify_signature(&public_key))
}
