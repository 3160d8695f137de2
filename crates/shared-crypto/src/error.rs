use thiserror::Error;

/// Failures while turning PEM text into a usable key handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Malformed PEM key: {0}")]
    MalformedPem(String),

    #[error("Key is not usable with RSASSA-PKCS1-v1_5/SHA-256: {0}")]
    AlgorithmMismatch(String),

    #[error("Key generation failed: {0}")]
    Generation(String),
}

/// Failures around signature bytes themselves
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Malformed signature: {0}")]
    MalformedEncoding(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
