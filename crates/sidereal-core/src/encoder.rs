use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::SiderealError;

/// Encode bytes as URL-safe base64 without padding.
pub fn encode<T: AsRef<[u8]>>(data: T) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode an unpadded URL-safe base64 string.
pub fn decode(encoded: &str) -> Result<Vec<u8>, SiderealError> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| SiderealError::MalformedEncoding(e.to_string()))
}

/// Decode an unpadded URL-safe base64 string that must hold valid UTF-8.
pub fn decode_as_utf8(encoded: &str) -> Result<String, SiderealError> {
    let bytes = decode(encoded)?;
    String::from_utf8(bytes).map_err(|e| SiderealError::MalformedEncoding(e.to_string()))
}
