//! Shared cryptography utilities
//!
//! This crate provides the primitives behind document sealing: SHA-256
//! fingerprints, PEM key parsing, and RSA PKCS#1 v1.5 signatures.

pub mod digest;
pub mod error;
pub mod keys;
pub mod provider;
pub mod signature;

pub use digest::{digest, Fingerprint, FINGERPRINT_LEN};
pub use error::{KeyError, SignatureError};
pub use keys::{
    generate_key_pair, parse_private_key, parse_public_key, KeyPairPem, PrivateKeyHandle,
    PublicKeyHandle,
};
pub use provider::{CryptoProvider, RsaSha256Provider};
pub use signature::{sign, verify, Signature, ALGORITHM_LABEL};
