use serde::Deserialize;
use tracing::warn;

use sidereal_core::encoder;
use sidereal_core::error::SiderealError;
use sidereal_core::types::AnchoringContext;

use crate::cas::{CasClient, ResolvedTransaction};
use crate::operation::Operation;
use crate::processor::OperationProcessor;

/// Decoded batch file: the ordered operation buffers anchored by one
/// transaction. An operation's index within this list is its
/// `operation_index`.
#[derive(Debug, Deserialize)]
struct BatchFile {
    operations: Vec<String>,
}

/// Outcome of ingesting one anchored transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Operations parsed and handed to the processor.
    pub accepted: usize,
    /// Operations rejected at construction (malformed buffer or payload).
    pub rejected: usize,
}

/// Fetch the batch file for `transaction` from the CAS and feed its
/// operations to `processor`.
///
/// The protocol limits in force at the transaction's ledger time bound the
/// batch: an oversized batch or operation buffer fails the whole
/// transaction, since a writer violating consensus limits produced an
/// invalid batch. An individually malformed operation is rejected and
/// counted without failing its batch. External I/O errors propagate.
pub async fn ingest_transaction(
    processor: &mut OperationProcessor,
    cas: &impl CasClient,
    transaction: &ResolvedTransaction,
) -> Result<IngestReport, SiderealError> {
    let parameters = processor.registry().get(transaction.transaction_time)?.clone();

    let batch_bytes = cas.read(&transaction.batch_file_hash).await?;
    let batch: BatchFile = serde_json::from_slice(&batch_bytes)
        .map_err(|e| SiderealError::MalformedBatchFile(e.to_string()))?;

    if batch.operations.len() > parameters.max_operations_per_batch {
        return Err(SiderealError::BatchSizeExceeded {
            max: parameters.max_operations_per_batch,
            got: batch.operations.len(),
        });
    }

    let mut report = IngestReport::default();
    for (index, encoded_buffer) in batch.operations.iter().enumerate() {
        let buffer = match encoder::decode(encoded_buffer) {
            Ok(buffer) => buffer,
            Err(error) => {
                warn!(index, %error, "batch entry is not base64url; rejected");
                report.rejected += 1;
                continue;
            }
        };
        if buffer.len() > parameters.max_operation_byte_size {
            return Err(SiderealError::OperationSizeExceeded {
                max: parameters.max_operation_byte_size,
                got: buffer.len(),
            });
        }

        let anchoring = AnchoringContext {
            transaction_time: transaction.transaction_time,
            transaction_number: transaction.transaction_number,
            batch_file_hash: transaction.batch_file_hash.clone(),
            operation_index: index as u32,
        };
        match Operation::anchored(&buffer, anchoring) {
            Ok(operation) => {
                processor.process(operation)?;
                report.accepted += 1;
            }
            Err(error) => {
                warn!(index, %error, "malformed operation rejected");
                report.rejected += 1;
            }
        }
    }
    Ok(report)
}
