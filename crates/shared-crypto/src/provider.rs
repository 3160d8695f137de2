//! Injectable cryptographic capability
//!
//! Workflows never call the primitives directly; they go through a
//! [`CryptoProvider`] so a test double or another backend (an HSM, a
//! different library) can stand in without touching workflow logic.

use crate::digest::{self, Fingerprint};
use crate::error::{KeyError, SignatureError};
use crate::keys::{self, PrivateKeyHandle, PublicKeyHandle};
use crate::signature::{self, Signature, ALGORITHM_LABEL};

/// Hashing, key import, sign and verify behind one seam
pub trait CryptoProvider: Send + Sync {
    /// Handle that can only sign
    type PrivateKey: Send;
    /// Handle that can only verify
    type PublicKey: Send;

    /// Label written into embedded signature blocks
    fn algorithm_label(&self) -> &str;

    fn digest(&self, data: &[u8]) -> Fingerprint;

    fn parse_private_key(&self, pem: &str) -> Result<Self::PrivateKey, KeyError>;

    fn parse_public_key(&self, pem: &str) -> Result<Self::PublicKey, KeyError>;

    fn sign(&self, key: &Self::PrivateKey, data: &[u8]) -> Result<Signature, SignatureError>;

    /// `Ok(false)` on mismatch; `Err` only for structurally unusable signatures
    fn verify(
        &self,
        key: &Self::PublicKey,
        data: &[u8],
        signature: &Signature,
    ) -> Result<bool, SignatureError>;
}

/// The default provider: SHA-256 fingerprints and RSA PKCS#1 v1.5 signatures
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaSha256Provider;

impl CryptoProvider for RsaSha256Provider {
    type PrivateKey = PrivateKeyHandle;
    type PublicKey = PublicKeyHandle;

    fn algorithm_label(&self) -> &str {
        ALGORITHM_LABEL
    }

    fn digest(&self, data: &[u8]) -> Fingerprint {
        digest::digest(data)
    }

    fn parse_private_key(&self, pem: &str) -> Result<PrivateKeyHandle, KeyError> {
        keys::parse_private_key(pem)
    }

    fn parse_public_key(&self, pem: &str) -> Result<PublicKeyHandle, KeyError> {
        keys::parse_public_key(pem)
    }

    fn sign(&self, key: &PrivateKeyHandle, data: &[u8]) -> Result<Signature, SignatureError> {
        signature::sign(key, data)
    }

    fn verify(
        &self,
        key: &PublicKeyHandle,
        data: &[u8],
        signature: &Signature,
    ) -> Result<bool, SignatureError> {
        signature::verify(key, data, signature)
    }
}
