use multihash::Multihash;
use sha2::{Digest, Sha256};

use sidereal_core::constants::SHA256_MULTIHASH_CODE;
use sidereal_core::error::SiderealError;

/// Largest digest size accepted when parsing foreign multihashes.
const MAX_DIGEST_SIZE: usize = 64;

/// Compute the self-describing hash of `data` under `algorithm_code`:
/// `varint(code) || varint(digest length) || digest`.
///
/// SHA2-256 is the only algorithm defined at present; the code is supplied
/// by the protocol registry so future versions can migrate.
pub fn hash(data: &[u8], algorithm_code: u64) -> Result<Vec<u8>, SiderealError> {
    if algorithm_code != SHA256_MULTIHASH_CODE {
        return Err(SiderealError::UnsupportedHashAlgorithm(algorithm_code));
    }
    let digest: [u8; 32] = Sha256::digest(data).into();
    let wrapped = Multihash::<MAX_DIGEST_SIZE>::wrap(algorithm_code, &digest)
        .expect("a sha-256 digest fits the multihash size cap");
    Ok(wrapped.to_bytes())
}

/// Parse a multihash buffer, returning `(algorithm_code, digest)`.
pub fn parse(bytes: &[u8]) -> Result<(u64, Vec<u8>), SiderealError> {
    let parsed = Multihash::<MAX_DIGEST_SIZE>::from_bytes(bytes)
        .map_err(|e| SiderealError::MalformedOperation(format!("invalid multihash: {e}")))?;
    Ok((parsed.code(), parsed.digest().to_vec()))
}

/// Whether `bytes` is a well-formed multihash under an algorithm this
/// implementation can recompute.
pub fn is_supported(bytes: &[u8]) -> bool {
    matches!(parse(bytes), Ok((SHA256_MULTIHASH_CODE, _)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_layout() {
        let bytes = hash(b"", SHA256_MULTIHASH_CODE).unwrap();
        // code, digest length, then the well-known SHA-256 empty digest.
        assert_eq!(bytes[0], 0x12);
        assert_eq!(bytes[1], 0x20);
        assert_eq!(bytes.len(), 34);
        assert_eq!(
            hex::encode(&bytes[2..]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_parse_round_trip() {
        let bytes = hash(b"operation payload", SHA256_MULTIHASH_CODE).unwrap();
        let (code, digest) = parse(&bytes).unwrap();
        assert_eq!(code, SHA256_MULTIHASH_CODE);
        assert_eq!(digest.len(), 32);
        assert!(is_supported(&bytes));
    }

    #[test]
    fn unsupported_algorithm_rejected() {
        assert!(matches!(
            hash(b"data", 0x13),
            Err(SiderealError::UnsupportedHashAlgorithm(0x13))
        ));
    }

    #[test]
    fn truncated_multihash_rejected() {
        let mut bytes = hash(b"data", SHA256_MULTIHASH_CODE).unwrap();
        bytes.truncate(10);
        assert!(parse(&bytes).is_err());
        assert!(!is_supported(&bytes));
    }

    #[test]
    fn foreign_code_not_supported() {
        // sha3-256 multihash code with a plausible digest length.
        let mut bytes = vec![0x16, 0x20];
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(parse(&bytes).is_ok());
        assert!(!is_supported(&bytes));
    }
}
