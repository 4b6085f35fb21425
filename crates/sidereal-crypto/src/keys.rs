use std::fmt;

use secp256k1::{PublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use sidereal_core::encoder;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("malformed hex key material: {0}")]
    MalformedHex(String),
    #[error("malformed JWK key material: {0}")]
    MalformedJwk(String),
    #[error("invalid secp256k1 point")]
    InvalidPoint,
}

// ── Public key material ──────────────────────────────────────────────────────

/// JSON Web Key form of a SECP256K1 public key, as embedded in DID Document
/// key entries under `publicKeyJwk`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    pub kty: String,
    pub crv: String,
    /// Base64url affine x coordinate (32 bytes).
    pub x: String,
    /// Base64url affine y coordinate (32 bytes).
    pub y: String,
}

/// Parse a SEC1 hex public key (33-byte compressed or 65-byte uncompressed).
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|e| KeyError::MalformedHex(e.to_string()))?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPoint)
}

/// Parse a JWK public key. Only `EC` / `secp256k1` keys are accepted.
pub fn public_key_from_jwk(jwk: &PublicKeyJwk) -> Result<PublicKey, KeyError> {
    if jwk.kty != "EC" || jwk.crv != "secp256k1" {
        return Err(KeyError::MalformedJwk(format!(
            "unsupported key type {}/{}",
            jwk.kty, jwk.crv
        )));
    }
    let x = encoder::decode(&jwk.x).map_err(|e| KeyError::MalformedJwk(e.to_string()))?;
    let y = encoder::decode(&jwk.y).map_err(|e| KeyError::MalformedJwk(e.to_string()))?;
    if x.len() != 32 || y.len() != 32 {
        return Err(KeyError::MalformedJwk(
            "coordinates must be 32 bytes".into(),
        ));
    }
    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..33].copy_from_slice(&x);
    sec1[33..].copy_from_slice(&y);
    PublicKey::from_slice(&sec1).map_err(|_| KeyError::InvalidPoint)
}

// ── KeyPair ──────────────────────────────────────────────────────────────────

/// A SECP256K1 keypair for authoring operations.
///
/// The secret half is held in a `Zeroizing` buffer and wiped on drop.
pub struct KeyPair {
    public_key: PublicKey,
    secret_bytes: Zeroizing<[u8; 32]>,
}

impl KeyPair {
    /// Generate a fresh keypair.
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::new(&mut secp256k1::rand::thread_rng()))
    }

    /// Restore a keypair from raw secret key bytes (e.g. a wallet file).
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidPoint)?;
        Ok(Self::from_secret(secret_key))
    }

    fn from_secret(secret_key: SecretKey) -> Self {
        Self {
            public_key: secret_key.public_key(SECP256K1),
            secret_bytes: Zeroizing::new(secret_key.secret_bytes()),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Compressed SEC1 hex rendering for `publicKeyHex` document entries.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// JWK rendering for `publicKeyJwk` document entries.
    pub fn public_key_jwk(&self) -> PublicKeyJwk {
        let uncompressed = self.public_key.serialize_uncompressed();
        PublicKeyJwk {
            kty: "EC".into(),
            crv: "secp256k1".into(),
            x: encoder::encode(&uncompressed[1..33]),
            y: encoder::encode(&uncompressed[33..65]),
        }
    }

    /// Sign the JWS signing input for `encoded_payload`.
    pub fn sign(&self, encoded_payload: &str) -> [u8; 64] {
        let secret_key = SecretKey::from_slice(self.secret_bytes.as_ref())
            .expect("stored secret bytes are a valid key");
        crate::jws::sign(encoded_payload, &secret_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair {{ public_key: {} }}", self.public_key_hex())
    }
}
