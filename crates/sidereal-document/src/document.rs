use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sidereal_crypto::{public_key_from_hex, public_key_from_jwk, PublicKeyJwk};

// ── DocumentKey ──────────────────────────────────────────────────────────────

/// One entry of a DID Document's `publicKey` array, reduced to the fields
/// this layer interprets. The raw document may carry more.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentKey {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<PublicKeyJwk>,
}

impl DocumentKey {
    /// The SECP256K1 verification key carried by this entry, if its
    /// material parses. Hex form wins when both are present.
    pub fn verification_key(&self) -> Option<PublicKey> {
        if let Some(hex_key) = &self.public_key_hex {
            return public_key_from_hex(hex_key).ok();
        }
        if let Some(jwk) = &self.public_key_jwk {
            return public_key_from_jwk(jwk).ok();
        }
        None
    }
}

// ── DidDocument ──────────────────────────────────────────────────────────────

/// A DID Document: the JSON object describing keys and services controlled
/// by the DID subject.
///
/// Held as raw JSON because updates address it with RFC 6902 patches; typed
/// views are parsed out on demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DidDocument(Value);

impl DidDocument {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Look up a public key entry by its `id`.
    pub fn public_key(&self, key_id: &str) -> Option<DocumentKey> {
        let keys = self.0.get("publicKey")?.as_array()?;
        keys.iter()
            .find(|k| k.get("id").and_then(Value::as_str) == Some(key_id))
            .and_then(|k| serde_json::from_value(k.clone()).ok())
    }
}

// ── Original document validation ─────────────────────────────────────────────

/// Structural predicate for the DID Document carried by a Create payload.
///
/// Requires at least one `publicKey` entry with a fragment-style id and a
/// type; `service` entries, when present, must each carry a type and a
/// serviceEndpoint.
pub fn is_valid_original_document(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };

    let Some(keys) = object.get("publicKey").and_then(Value::as_array) else {
        return false;
    };
    if keys.is_empty() || !keys.iter().all(is_valid_key_entry) {
        return false;
    }

    match object.get("service") {
        None => true,
        Some(services) => services
            .as_array()
            .is_some_and(|s| s.iter().all(is_valid_service_entry)),
    }
}

fn is_valid_key_entry(entry: &Value) -> bool {
    let Some(object) = entry.as_object() else {
        return false;
    };
    let id_ok = object
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| id.starts_with('#') && id.len() > 1);
    let type_ok = object
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    id_ok && type_ok
}

fn is_valid_service_entry(entry: &Value) -> bool {
    let Some(object) = entry.as_object() else {
        return false;
    };
    object.get("type").and_then(Value::as_str).is_some()
        && object.get("serviceEndpoint").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "@context": "https://w3id.org/did/v1",
            "publicKey": [{
                "id": "#key1",
                "type": "Secp256k1VerificationKey2018",
                "publicKeyHex": "02f49802fb3f09c6dd43f19aa41293d1e0dad044b68cf81cf7079499edfd0aa9f1"
            }],
            "service": [{
                "type": "IdentityHub",
                "serviceEndpoint": { "@context": "schema.identity.foundation/hub", "instances": [] }
            }]
        })
    }

    #[test]
    fn template_document_is_valid() {
        assert!(is_valid_original_document(&template()));
    }

    #[test]
    fn missing_or_empty_public_keys_invalid() {
        assert!(!is_valid_original_document(&json!({})));
        assert!(!is_valid_original_document(&json!({ "publicKey": [] })));
        assert!(!is_valid_original_document(&json!({ "publicKey": "nope" })));
        assert!(!is_valid_original_document(&json!([1, 2, 3])));
    }

    #[test]
    fn key_entries_need_fragment_id_and_type() {
        let mut doc = template();
        doc["publicKey"][0]["id"] = json!("key1");
        assert!(!is_valid_original_document(&doc));

        let mut doc = template();
        doc["publicKey"][0].as_object_mut().unwrap().remove("type");
        assert!(!is_valid_original_document(&doc));
    }

    #[test]
    fn malformed_service_entry_invalid() {
        let mut doc = template();
        doc["service"][0].as_object_mut().unwrap().remove("serviceEndpoint");
        assert!(!is_valid_original_document(&doc));
    }

    #[test]
    fn key_lookup_by_id() {
        let doc = DidDocument::from_value(template());
        let key = doc.public_key("#key1").unwrap();
        assert_eq!(key.key_type, "Secp256k1VerificationKey2018");
        assert!(key.verification_key().is_some());
        assert!(doc.public_key("#missing").is_none());
    }

    #[test]
    fn unparseable_key_material_yields_no_verification_key() {
        let doc = DidDocument::from_value(json!({
            "publicKey": [{ "id": "#key1", "type": "Secp256k1VerificationKey2018", "publicKeyHex": "00" }]
        }));
        let key = doc.public_key("#key1").unwrap();
        assert!(key.verification_key().is_none());
    }
}
