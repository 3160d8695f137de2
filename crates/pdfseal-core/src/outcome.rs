//! Terminal results of the verification workflows

use crate::error::{ErrorKind, SealError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a verification concluded when its inputs were usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Valid,
    /// Well-formed inputs, cryptographic mismatch
    Invalid,
}

impl From<bool> for Verdict {
    fn from(verified: bool) -> Self {
        if verified {
            Verdict::Valid
        } else {
            Verdict::Invalid
        }
    }
}

/// One of exactly three outcomes. `Invalid` and `Error` are never merged:
/// a tampered document and an unusable key must look different to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "kind", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Valid,
    Invalid,
    Error(ErrorKind),
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationOutcome::Valid)
    }

    /// Process exit status: 0 valid, 1 invalid, 2 error
    pub fn exit_code(&self) -> i32 {
        match self {
            VerificationOutcome::Valid => 0,
            VerificationOutcome::Invalid => 1,
            VerificationOutcome::Error(_) => 2,
        }
    }
}

impl From<Verdict> for VerificationOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Valid => VerificationOutcome::Valid,
            Verdict::Invalid => VerificationOutcome::Invalid,
        }
    }
}

impl From<Result<Verdict, SealError>> for VerificationOutcome {
    fn from(result: Result<Verdict, SealError>) -> Self {
        match result {
            Ok(verdict) => verdict.into(),
            Err(err) => VerificationOutcome::Error(err.kind()),
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationOutcome::Valid => f.write_str("Signature is VALID"),
            VerificationOutcome::Invalid => f.write_str("Signature is INVALID"),
            VerificationOutcome::Error(kind) => write!(f, "Verification failed: {}", kind),
        }
    }
}
