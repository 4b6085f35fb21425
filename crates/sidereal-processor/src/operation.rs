use json_patch::Patch;
use secp256k1::PublicKey;
use serde::Deserialize;
use serde_json::Value;

use sidereal_core::encoder;
use sidereal_core::error::SiderealError;
use sidereal_core::protocol::ProtocolRegistry;
use sidereal_core::types::{
    AnchoringContext, OperationHash, OperationIndex, OperationType, TransactionNumber,
    UniqueSuffix,
};
use sidereal_crypto::jws;
use sidereal_document::{is_valid_original_document, DidDocument};

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct OperationEnvelope {
    header: OperationHeader,
    payload: String,
    signature: String,
}

#[derive(Deserialize)]
struct OperationHeader {
    operation: String,
    kid: String,
    #[serde(rename = "proofOfWork")]
    proof_of_work: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload {
    did: String,
    operation_number: u32,
    previous_operation_hash: String,
    patch: Patch,
}

#[derive(Deserialize)]
struct DeletePayload {
    did: String,
}

// ── Operation ────────────────────────────────────────────────────────────────

/// Immutable parsed form of one operation.
///
/// The original buffer is preserved byte-for-byte: the hash of a non-Create
/// operation is defined over it, so the stored form must never be
/// re-serialized.
#[derive(Clone, Debug)]
pub struct Operation {
    operation_buffer: Vec<u8>,
    anchoring: Option<AnchoringContext>,
    operation_type: OperationType,
    signing_key_id: String,
    signature: Vec<u8>,
    encoded_payload: String,
    detail: OperationDetail,
}

/// Type-specific payload fields.
#[derive(Clone, Debug)]
pub enum OperationDetail {
    Create {
        did_document: DidDocument,
    },
    Update {
        did: String,
        operation_number: u32,
        previous_operation_hash: OperationHash,
        patch: Patch,
    },
    Delete {
        did: String,
    },
}

impl Operation {
    /// Parse an anchored operation read from a batch file.
    pub fn anchored(
        operation_buffer: &[u8],
        anchoring: AnchoringContext,
    ) -> Result<Self, SiderealError> {
        Self::parse(operation_buffer, Some(anchoring))
    }

    /// Parse an operation that has not been anchored yet (client-side
    /// validation before submission). Hashing it fails with
    /// `HashTimeUnknown`.
    pub fn unanchored(operation_buffer: &[u8]) -> Result<Self, SiderealError> {
        Self::parse(operation_buffer, None)
    }

    fn parse(buffer: &[u8], anchoring: Option<AnchoringContext>) -> Result<Self, SiderealError> {
        let envelope: OperationEnvelope = serde_json::from_slice(buffer)
            .map_err(|e| SiderealError::MalformedOperation(e.to_string()))?;

        let operation_type = OperationType::parse(&envelope.header.operation).ok_or_else(|| {
            malformed(format!(
                "unknown operation type `{}`",
                envelope.header.operation
            ))
        })?;
        if envelope.header.kid.is_empty() {
            return Err(malformed("header.kid must be a non-empty string"));
        }
        if !envelope.header.proof_of_work.is_object() {
            return Err(malformed("header.proofOfWork must be an object"));
        }
        if envelope.payload.is_empty() {
            return Err(malformed("payload must be a non-empty string"));
        }
        if envelope.signature.is_empty() {
            return Err(malformed("signature must be a non-empty string"));
        }

        let signature = encoder::decode(&envelope.signature)
            .map_err(|_| malformed("signature is not base64url"))?;
        let payload_json = encoder::decode_as_utf8(&envelope.payload)
            .map_err(|_| malformed("payload is not base64url-encoded UTF-8"))?;
        let payload: Value = serde_json::from_str(&payload_json)
            .map_err(|e| malformed(format!("payload is not JSON: {e}")))?;
        let detail = parse_detail(operation_type, payload)?;

        Ok(Self {
            operation_buffer: buffer.to_vec(),
            anchoring,
            operation_type,
            signing_key_id: envelope.header.kid,
            signature,
            encoded_payload: envelope.payload,
            detail,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    pub fn anchoring(&self) -> Option<&AnchoringContext> {
        self.anchoring.as_ref()
    }

    pub fn ledger_order(&self) -> Option<(TransactionNumber, OperationIndex)> {
        self.anchoring.as_ref().map(AnchoringContext::ledger_order)
    }

    /// Id of the key within the target DID Document that signed this
    /// operation.
    pub fn signing_key_id(&self) -> &str {
        &self.signing_key_id
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The base64url payload exactly as received.
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    pub fn operation_buffer(&self) -> &[u8] {
        &self.operation_buffer
    }

    pub fn detail(&self) -> &OperationDetail {
        &self.detail
    }

    /// The embedded target DID, for operation types that carry one.
    pub fn did(&self) -> Option<&str> {
        match &self.detail {
            OperationDetail::Create { .. } => None,
            OperationDetail::Update { did, .. } | OperationDetail::Delete { did } => Some(did),
        }
    }

    /// The original DID Document, for Create operations.
    pub fn did_document(&self) -> Option<&DidDocument> {
        match &self.detail {
            OperationDetail::Create { did_document } => Some(did_document),
            _ => None,
        }
    }

    // ── Hashing & identity ───────────────────────────────────────────────────

    /// Content hash of this operation.
    ///
    /// Creates hash their encoded payload, so the resulting DID is invariant
    /// to header choices (the signature cannot sign its own hash). All other
    /// types hash the full buffer, committing to signature and proof of work
    /// for tamper-evident chaining.
    pub fn operation_hash(
        &self,
        registry: &ProtocolRegistry,
    ) -> Result<OperationHash, SiderealError> {
        let anchoring = self.anchoring.as_ref().ok_or(SiderealError::HashTimeUnknown)?;
        let parameters = registry.get(anchoring.transaction_time)?;
        let hash_input: &[u8] = match self.operation_type {
            OperationType::Create => self.encoded_payload.as_bytes(),
            _ => &self.operation_buffer,
        };
        let multihash = sidereal_crypto::multihash::hash(hash_input, parameters.hash_algorithm_code)?;
        Ok(OperationHash::new(encoder::encode(multihash)))
    }

    /// The unique suffix of the DID this operation targets: the operation
    /// hash for Creates, the embedded `did` minus `method_prefix` otherwise.
    ///
    /// `None` means the operation addresses a foreign DID method.
    pub fn unique_suffix(
        &self,
        registry: &ProtocolRegistry,
        method_prefix: &str,
    ) -> Result<Option<UniqueSuffix>, SiderealError> {
        match &self.detail {
            OperationDetail::Create { .. } => Ok(Some(self.operation_hash(registry)?.into())),
            OperationDetail::Update { did, .. } | OperationDetail::Delete { did } => Ok(did
                .strip_prefix(method_prefix)
                .map(|suffix| UniqueSuffix::new(suffix.to_string()))),
        }
    }

    /// Whether `public_key` verifies this operation's signature over its
    /// JWS signing input. Never errors.
    pub fn verify_signature(&self, public_key: &PublicKey) -> bool {
        jws::verify(&self.encoded_payload, &self.signature, public_key)
    }
}

fn parse_detail(
    operation_type: OperationType,
    payload: Value,
) -> Result<OperationDetail, SiderealError> {
    match operation_type {
        OperationType::Create => {
            if !is_valid_original_document(&payload) {
                return Err(malformed(
                    "create payload is not a valid original DID document",
                ));
            }
            Ok(OperationDetail::Create {
                did_document: DidDocument::from_value(payload),
            })
        }
        OperationType::Update => {
            let update: UpdatePayload = serde_json::from_value(payload)
                .map_err(|e| malformed(format!("update payload: {e}")))?;
            if update.operation_number == 0 {
                return Err(malformed("operationNumber must be >= 1"));
            }
            let hash_bytes = encoder::decode(&update.previous_operation_hash)
                .map_err(|_| malformed("previousOperationHash is not base64url"))?;
            if sidereal_crypto::multihash::parse(&hash_bytes).is_err() {
                return Err(malformed("previousOperationHash is not a multihash"));
            }
            Ok(OperationDetail::Update {
                did: update.did,
                operation_number: update.operation_number,
                previous_operation_hash: OperationHash::new(update.previous_operation_hash),
                patch: update.patch,
            })
        }
        OperationType::Delete => {
            let delete: DeletePayload = serde_json::from_value(payload)
                .map_err(|e| malformed(format!("delete payload: {e}")))?;
            Ok(OperationDetail::Delete { did: delete.did })
        }
        // Reserved in the wire format; payload semantics are not yet
        // defined, so any recover payload shape is unknown by definition.
        OperationType::Recover => Err(malformed("recover payload semantics are not defined")),
    }
}

fn malformed(message: impl Into<String>) -> SiderealError {
    SiderealError::MalformedOperation(message.into())
}
