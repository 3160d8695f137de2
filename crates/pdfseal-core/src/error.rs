use serde::{Deserialize, Serialize};
use shared_crypto::{KeyError, SignatureError};
use shared_pdf::{EmbedError, ExtractError};
use thiserror::Error;

/// A request was missing something the workflow cannot run without
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
}

/// Every way a workflow can fail before reaching a verdict
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Workflow was interrupted: {0}")]
    Interrupted(String),
}

/// Flat classification of [`SealError`] for callers and serialized output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingRequiredField,
    MalformedPem,
    AlgorithmMismatch,
    MalformedSignature,
    HashNotFound,
    UnreadableDocument,
    MalformedDocument,
    SigningFailed,
    Interrupted,
}

impl SealError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SealError::Input(InputError::MissingRequiredField(_)) => ErrorKind::MissingRequiredField,
            SealError::Key(KeyError::MalformedPem(_)) => ErrorKind::MalformedPem,
            SealError::Key(KeyError::AlgorithmMismatch(_)) => ErrorKind::AlgorithmMismatch,
            SealError::Key(KeyError::Generation(_)) => ErrorKind::SigningFailed,
            SealError::Signature(SignatureError::MalformedEncoding(_)) => {
                ErrorKind::MalformedSignature
            }
            SealError::Signature(SignatureError::SigningFailed(_)) => ErrorKind::SigningFailed,
            SealError::Embed(_) => ErrorKind::MalformedDocument,
            SealError::Extract(ExtractError::HashNotFound) => ErrorKind::HashNotFound,
            SealError::Extract(ExtractError::UnreadableDocument(_)) => {
                ErrorKind::UnreadableDocument
            }
            SealError::Interrupted(_) => ErrorKind::Interrupted,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::MissingRequiredField => "missing required field",
            ErrorKind::MalformedPem => "malformed PEM key",
            ErrorKind::AlgorithmMismatch => "key does not fit RSA PKCS#1 v1.5 with SHA-256",
            ErrorKind::MalformedSignature => "malformed signature",
            ErrorKind::HashNotFound => "no embedded hash found",
            ErrorKind::UnreadableDocument => "document text could not be read",
            ErrorKind::MalformedDocument => "document could not be stamped",
            ErrorKind::SigningFailed => "signing failed",
            ErrorKind::Interrupted => "interrupted",
        };
        f.write_str(label)
    }
}
