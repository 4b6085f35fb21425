use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use sha2::{Digest, Sha256};

/// The canonical JWS signing input: the ASCII string `"." + encoded_payload`.
/// There is no protected header.
pub fn signing_input(encoded_payload: &str) -> Vec<u8> {
    let mut input = Vec::with_capacity(encoded_payload.len() + 1);
    input.push(b'.');
    input.extend_from_slice(encoded_payload.as_bytes());
    input
}

fn message_for(encoded_payload: &str) -> Message {
    let digest: [u8; 32] = Sha256::digest(signing_input(encoded_payload)).into();
    Message::from_digest(digest)
}

/// ECDSA-sign the JWS signing input for `encoded_payload`.
/// Returns the compact 64-byte signature.
pub fn sign(encoded_payload: &str, secret_key: &SecretKey) -> [u8; 64] {
    SECP256K1
        .sign_ecdsa(&message_for(encoded_payload), secret_key)
        .serialize_compact()
}

/// Verify a compact ECDSA signature over the JWS signing input for
/// `encoded_payload`.
///
/// Any failure — wrong signature length, malformed compact encoding, wrong
/// key — is `false`; this function never errors.
pub fn verify(encoded_payload: &str, signature: &[u8], public_key: &PublicKey) -> bool {
    let Ok(sig) = Signature::from_compact(signature) else {
        return false;
    };
    SECP256K1
        .verify_ecdsa(&message_for(encoded_payload), &sig, public_key)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;

    #[test]
    fn sign_verify_round_trip() {
        let keypair = KeyPair::generate();
        let payload = "eyJkaWQiOiJkaWQ6c2lkZXJlYWw6YWJjIn0";
        let sig = keypair.sign(payload);
        assert!(verify(payload, &sig, keypair.public_key()));
    }

    #[test]
    fn tampered_payload_fails() {
        let keypair = KeyPair::generate();
        let sig = keypair.sign("original-payload");
        assert!(!verify("tampered-payload", &sig, keypair.public_key()));
    }

    #[test]
    fn wrong_key_fails() {
        let signer = KeyPair::generate();
        let other = KeyPair::generate();
        let sig = signer.sign("payload");
        assert!(!verify("payload", &sig, other.public_key()));
    }

    #[test]
    fn garbage_signature_is_false_not_error() {
        let keypair = KeyPair::generate();
        assert!(!verify("payload", b"not a signature", keypair.public_key()));
        assert!(!verify("payload", &[0u8; 64], keypair.public_key()));
        assert!(!verify("payload", &[], keypair.public_key()));
    }

    #[test]
    fn signing_input_has_no_protected_header() {
        assert_eq!(signing_input("abc"), b".abc");
        assert_eq!(signing_input(""), b".");
    }
}
