//! RSASSA-PKCS1-v1_5 / SHA-256 signing and verification
//!
//! The engine signs exactly the bytes it is handed. Deciding whether those
//! bytes are a document or the text of its fingerprint is the caller's job.

use crate::error::SignatureError;
use crate::keys::{PrivateKeyHandle, PublicKeyHandle};
use base64::Engine;
use rsa::pkcs1v15;
use rsa::BigUint;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable name of the fixed signature scheme
pub const ALGORITHM_LABEL: &str = "RSASSA-PKCS1-v1_5 with SHA-256";

/// Raw signature bytes. Meaningful only together with the signed bytes and
/// the matching public key; it carries no reference to either.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Standard padded base64
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }

    /// Decode base64 text. Whitespace anywhere in the input is ignored so
    /// wrapped or copy-pasted signatures still decode.
    pub fn from_base64(text: &str) -> Result<Self, SignatureError> {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() {
            return Err(SignatureError::MalformedEncoding(
                "signature is empty".to_string(),
            ));
        }
        base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .map(Self)
            .map_err(|e| SignatureError::MalformedEncoding(format!("invalid base64: {}", e)))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({} bytes)", self.0.len())
    }
}

/// Sign `data` with the private key
#[tracing::instrument(level = "debug", skip(key, data), fields(data_len = data.len()))]
pub fn sign(key: &PrivateKeyHandle, data: &[u8]) -> Result<Signature, SignatureError> {
    let signature: pkcs1v15::Signature = key
        .signing_key()
        .try_sign(data)
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;
    Ok(Signature(signature.to_vec()))
}

/// Verify `signature` over `data`.
///
/// A well-formed signature that does not match yields `Ok(false)`. Only a
/// signature that cannot be a signature for this key at all is an error.
#[tracing::instrument(level = "debug", skip(key, data, signature), fields(data_len = data.len()))]
pub fn verify(
    key: &PublicKeyHandle,
    data: &[u8],
    signature: &Signature,
) -> Result<bool, SignatureError> {
    if signature.len() != key.modulus_len() {
        return Err(SignatureError::MalformedEncoding(format!(
            "expected {} signature bytes, got {}",
            key.modulus_len(),
            signature.len()
        )));
    }
    if BigUint::from_bytes_be(signature.as_bytes()) >= *key.modulus() {
        return Err(SignatureError::MalformedEncoding(
            "signature representative out of range".to_string(),
        ));
    }

    let parsed = pkcs1v15::Signature::try_from(signature.as_bytes())
        .map_err(|e| SignatureError::MalformedEncoding(e.to_string()))?;

    Ok(key.verifying_key().verify(data, &parsed).is_ok())
}
