//! Shared operation builders for the processor integration suites.

#![allow(dead_code)]

use serde_json::{json, Value};

use sidereal_core::constants::DID_METHOD_PREFIX;
use sidereal_core::encoder;
use sidereal_core::protocol::ProtocolRegistry;
use sidereal_core::types::{AnchoringContext, OperationHash};
use sidereal_crypto::KeyPair;
use sidereal_processor::Operation;

pub fn anchoring(transaction_number: u64, operation_index: u32) -> AnchoringContext {
    AnchoringContext {
        transaction_time: transaction_number,
        transaction_number,
        batch_file_hash: vec![0xba; 4],
        operation_index,
    }
}

/// Wire-format operation buffer: a signed envelope around `payload`.
pub fn signed_buffer(operation: &str, kid: &str, payload: &Value, signer: &KeyPair) -> Vec<u8> {
    let encoded_payload = encoder::encode(serde_json::to_vec(payload).unwrap());
    let signature = signer.sign(&encoded_payload);
    serde_json::to_vec(&json!({
        "header": { "operation": operation, "kid": kid, "proofOfWork": {} },
        "payload": encoded_payload,
        "signature": encoder::encode(signature),
    }))
    .unwrap()
}

/// Original document with one hex-form verification key per `(id, keypair)`.
pub fn document_with_keys(keys: &[(&str, &KeyPair)]) -> Value {
    json!({
        "@context": "https://w3id.org/did/v1",
        "publicKey": keys
            .iter()
            .map(|(id, keypair)| json!({
                "id": id,
                "type": "Secp256k1VerificationKey2018",
                "publicKeyHex": keypair.public_key_hex(),
            }))
            .collect::<Vec<_>>()
    })
}

/// Template document: `#key1` controlled by `owner`, plus a second key
/// entry carrying an `owner` attribute for patch-target tests.
pub fn original_document(owner: &KeyPair) -> Value {
    json!({
        "@context": "https://w3id.org/did/v1",
        "publicKey": [
            {
                "id": "#key1",
                "type": "Secp256k1VerificationKey2018",
                "publicKeyHex": owner.public_key_hex(),
            },
            {
                "id": "#key2",
                "type": "Secp256k1VerificationKey2018",
                "owner": format!("{DID_METHOD_PREFIX}original"),
                "publicKeyHex": KeyPair::generate().public_key_hex(),
            }
        ]
    })
}

pub fn create_op(signer: &KeyPair, document: &Value, tn: u64, oi: u32) -> Operation {
    Operation::anchored(&signed_buffer("create", "#key1", document, signer), anchoring(tn, oi))
        .unwrap()
}

pub fn update_op(
    signer: &KeyPair,
    kid: &str,
    did: &str,
    operation_number: u32,
    previous: &OperationHash,
    patch: Value,
    tn: u64,
    oi: u32,
) -> Operation {
    let payload = json!({
        "did": did,
        "operationNumber": operation_number,
        "previousOperationHash": previous.as_str(),
        "patch": patch,
    });
    Operation::anchored(&signed_buffer("update", kid, &payload, signer), anchoring(tn, oi))
        .unwrap()
}

pub fn delete_op(signer: &KeyPair, kid: &str, did: &str, tn: u64, oi: u32) -> Operation {
    Operation::anchored(
        &signed_buffer("delete", kid, &json!({ "did": did }), signer),
        anchoring(tn, oi),
    )
    .unwrap()
}

/// The DID registered by `create`.
pub fn did_of(create: &Operation, registry: &ProtocolRegistry) -> String {
    format!(
        "{DID_METHOD_PREFIX}{}",
        create.operation_hash(registry).unwrap()
    )
}

/// A patch replacing the `owner` attribute of the second document key.
pub fn owner_patch(value: &str) -> Value {
    json!([{ "op": "replace", "path": "/publicKey/1/owner", "value": value }])
}
