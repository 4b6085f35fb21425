use json_patch::Patch;

use sidereal_core::error::SiderealError;

use crate::document::DidDocument;

/// Apply an RFC 6902 patch to `document`, returning the patched document.
///
/// The input is never mutated. Application is strict: a single invalid
/// operation (unresolvable path, failed `test`) rejects the whole patch.
pub fn apply_patch(document: &DidDocument, patch: &Patch) -> Result<DidDocument, SiderealError> {
    let mut value = document.as_value().clone();
    json_patch::patch(&mut value, patch).map_err(|e| SiderealError::InvalidPatch(e.to_string()))?;
    Ok(DidDocument::from_value(value))
}
