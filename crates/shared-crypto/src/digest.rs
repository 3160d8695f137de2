//! SHA-256 content fingerprints

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a fingerprint in bytes
pub const FINGERPRINT_LEN: usize = 32;

/// A SHA-256 digest of a document's bytes.
///
/// The lowercase hex rendering is what gets signed and embedded, so it must
/// stay byte-for-byte reproducible: two digits per byte, no separators.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex, 64 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Standard padded base64 (the serverless signer's `hash_b64` rendering)
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.0)
    }

    /// The bytes a signature covers: the UTF-8 encoding of the hex rendering
    pub fn signing_payload(&self) -> Vec<u8> {
        self.to_hex().into_bytes()
    }

    /// Parse a 64-digit hex string (either case)
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut bytes = [0u8; FINGERPRINT_LEN];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

/// Hash data using SHA-256
#[tracing::instrument(level = "trace", skip(data), fields(data_len = data.len()))]
pub fn digest(data: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Fingerprint(hasher.finalize().into())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: SHA-256 produces deterministic 32-byte output
        #[test]
        fn digest_deterministic(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let a = digest(&data);
            let b = digest(&data);
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.to_hex(), b.to_hex());
        }

        /// Property: Different inputs produce different fingerprints
        #[test]
        fn digest_collision_resistant(
            data1 in prop::collection::vec(any::<u8>(), 1..512),
            data2 in prop::collection::vec(any::<u8>(), 1..512),
        ) {
            prop_assume!(data1 != data2);
            prop_assert_ne!(digest(&data1), digest(&data2));
        }

        /// Property: a single flipped bit changes the fingerprint
        #[test]
        fn single_bit_flip_changes_digest(
            data in prop::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut tampered = data.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= 1 << bit;
            prop_assert_ne!(digest(&data), digest(&tampered));
        }
    }
}
