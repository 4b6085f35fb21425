use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use sidereal_core::types::{OperationHash, OperationIndex, TransactionNumber, UniqueSuffix};

use crate::operation::{Operation, OperationDetail};

/// One operation as indexed: the parsed operation plus its cached content
/// hash.
#[derive(Clone, Debug)]
pub struct IndexedOperation {
    pub hash: OperationHash,
    pub operation: Arc<Operation>,
}

/// All operations known for one DID, grouped the way resolution consumes
/// them.
#[derive(Debug, Default)]
pub struct OperationBucket {
    /// Candidate Creates; several may claim the same suffix.
    pub creates: Vec<IndexedOperation>,
    /// Updates grouped by the predecessor hash they claim.
    pub updates: HashMap<OperationHash, Vec<IndexedOperation>>,
    /// Deletes for this DID.
    pub deletes: Vec<IndexedOperation>,
}

/// In-memory operation index: per-DID buckets plus the global anchoring
/// order used for deduplication and rollback.
///
/// Indexes:
///   buckets   — unique suffix → OperationBucket
///   by_anchor — (transaction_number, operation_index) → bucket entry
#[derive(Debug, Default)]
pub struct OperationStore {
    buckets: HashMap<UniqueSuffix, OperationBucket>,
    by_anchor: BTreeMap<(TransactionNumber, OperationIndex), (UniqueSuffix, IndexedOperation)>,
}

impl OperationStore {
    /// Insert an operation under `suffix`. Returns `false` when the
    /// anchoring slot is already occupied (redelivery).
    pub fn insert(
        &mut self,
        order: (TransactionNumber, OperationIndex),
        suffix: UniqueSuffix,
        indexed: IndexedOperation,
    ) -> bool {
        match self.by_anchor.entry(order) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert((suffix.clone(), indexed.clone()));
                bucket_insert(&mut self.buckets, suffix, indexed);
                true
            }
        }
    }

    pub fn bucket(&self, suffix: &UniqueSuffix) -> Option<&OperationBucket> {
        self.buckets.get(suffix)
    }

    pub fn len(&self) -> usize {
        self.by_anchor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_anchor.is_empty()
    }

    /// Drop every operation anchored after `transaction_number` and rebuild
    /// the per-DID buckets from the retained order. Returns how many
    /// operations were discarded.
    pub fn rollback(&mut self, transaction_number: TransactionNumber) -> usize {
        let before = self.by_anchor.len();
        self.by_anchor
            .retain(|(anchored_at, _), _| *anchored_at <= transaction_number);
        let removed = before - self.by_anchor.len();

        if removed > 0 {
            self.buckets.clear();
            let retained: Vec<_> = self.by_anchor.values().cloned().collect();
            for (suffix, indexed) in retained {
                bucket_insert(&mut self.buckets, suffix, indexed);
            }
        }
        removed
    }
}

fn bucket_insert(
    buckets: &mut HashMap<UniqueSuffix, OperationBucket>,
    suffix: UniqueSuffix,
    indexed: IndexedOperation,
) {
    let bucket = buckets.entry(suffix).or_default();
    match indexed.operation.detail() {
        OperationDetail::Create { .. } => bucket.creates.push(indexed),
        OperationDetail::Update {
            previous_operation_hash,
            ..
        } => {
            let predecessor = previous_operation_hash.clone();
            bucket.updates.entry(predecessor).or_default().push(indexed);
        }
        OperationDetail::Delete { .. } => bucket.deletes.push(indexed),
    }
}
