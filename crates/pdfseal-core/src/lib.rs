//! Document sealing engine
//!
//! Three workflows built on `shared-crypto` and `shared-pdf`:
//!
//! - **Sign**: SHA-256 the document, sign the hex fingerprint text with an
//!   RSA PKCS#1 v1.5 key, and embed a signature block into a new copy.
//! - **Verify detached**: recompute the fingerprint and check a supplied
//!   signature against it.
//! - **Verify embedded**: read the fingerprint back out of a signed copy and
//!   check a supplied signature against it.
//!
//! Verification ends in exactly one of [`VerificationOutcome::Valid`],
//! [`VerificationOutcome::Invalid`] or [`VerificationOutcome::Error`].
//!
//! ```no_run
//! use pdfseal_core::{Engine, SignRequest, VerificationOutcome, VerifyEmbeddedRequest};
//!
//! # fn run(document: Vec<u8>, private_pem: String, public_pem: String) {
//! let engine = Engine::default();
//! let signed = engine
//!     .sign(&SignRequest {
//!         document: Some(document),
//!         private_key_pem: Some(private_pem),
//!     })
//!     .unwrap();
//!
//! let outcome = VerificationOutcome::from(engine.verify_embedded(&VerifyEmbeddedRequest {
//!     document: Some(signed.document.clone()),
//!     public_key_pem: Some(public_pem),
//!     signature_base64: Some(signed.signature_base64()),
//! }));
//! assert_eq!(outcome, VerificationOutcome::Valid);
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod task;

pub use config::{EngineConfig, DEFAULT_TIMESTAMP_FORMAT};
pub use engine::{
    DetachedSignature, Engine, SignRequest, SignedDocument, Stage, VerifyDetachedRequest,
    VerifyEmbeddedRequest,
};
pub use error::{ErrorKind, InputError, SealError};
pub use outcome::{Verdict, VerificationOutcome};

pub use shared_crypto::{CryptoProvider, Fingerprint, RsaSha256Provider, Signature};
pub use shared_pdf::{EmbedConfig, EmbeddedSignatureBlock, Placement, SignatureDisplay};
