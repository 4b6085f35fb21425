pub mod jws;
pub mod keys;
pub mod multihash;

pub use jws::{sign, signing_input, verify};
pub use keys::{public_key_from_hex, public_key_from_jwk, KeyError, KeyPair, PublicKeyJwk};
