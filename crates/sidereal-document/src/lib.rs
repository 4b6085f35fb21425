pub mod document;
pub mod patch;

pub use document::{is_valid_original_document, DidDocument, DocumentKey};
pub use patch::apply_patch;
