pub mod cas;
pub mod ingest;
pub mod operation;
pub mod processor;
pub mod store;

pub use cas::{CasClient, CasError, MemoryCas, ResolvedTransaction};
pub use ingest::{ingest_transaction, IngestReport};
pub use operation::{Operation, OperationDetail};
pub use processor::OperationProcessor;
