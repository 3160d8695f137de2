//! The sign and verify workflows
//!
//! Every workflow is a straight line through the stages below and fails on
//! the first error. Nothing is cached between calls: keys are parsed per
//! call and dropped as soon as the primitive returns.
//!
//! The signed bytes are always the UTF-8 text of the lowercase hex
//! fingerprint, never the raw document. That is what the embedded block
//! records, so a detached signature and an embedded one verify the same way.

use crate::config::EngineConfig;
use crate::error::{InputError, SealError};
use crate::outcome::Verdict;
use chrono::{DateTime, Utc};
use shared_crypto::{CryptoProvider, Fingerprint, RsaSha256Provider, Signature};
use shared_pdf::block::sanitize_field;
use shared_pdf::{EmbeddedSignatureBlock, Stamp};
use std::fmt::Write;
use tracing::{debug, info, instrument, warn};

/// Workflow stages, reported as tracing events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reading,
    Digesting,
    Signing,
    Verifying,
    Embedding,
    Extracting,
}

fn enter(stage: Stage) {
    debug!(?stage, "entering stage");
}

#[derive(Debug, Clone, Default)]
pub struct SignRequest {
    pub document: Option<Vec<u8>>,
    pub private_key_pem: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyDetachedRequest {
    pub document: Option<Vec<u8>>,
    pub public_key_pem: Option<String>,
    pub signature_base64: Option<String>,
    /// Fingerprint hex the caller believes the document has. Checked against
    /// the recomputed digest, never used in its place.
    pub asserted_fingerprint_hex: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyEmbeddedRequest {
    pub document: Option<Vec<u8>>,
    pub public_key_pem: Option<String>,
    /// Supplied out of band; the copy rendered in the document is display-only
    pub signature_base64: Option<String>,
}

/// Result of signing without embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedSignature {
    pub fingerprint: Fingerprint,
    pub signature: Signature,
}

/// Result of the Sign workflow
#[derive(Debug, Clone)]
pub struct SignedDocument {
    pub fingerprint: Fingerprint,
    pub signature: Signature,
    /// The Date line written into the block
    pub timestamp: String,
    /// A new document carrying the signature block
    pub document: Vec<u8>,
}

impl SignedDocument {
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.to_hex()
    }

    pub fn signature_base64(&self) -> String {
        self.signature.to_base64()
    }
}

/// Signs and verifies documents through an injected [`CryptoProvider`]
#[derive(Debug, Clone)]
pub struct Engine<P: CryptoProvider = RsaSha256Provider> {
    provider: P,
    config: EngineConfig,
}

impl Engine<RsaSha256Provider> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_provider(RsaSha256Provider, config)
    }
}

impl Default for Engine<RsaSha256Provider> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<P: CryptoProvider> Engine<P> {
    pub fn with_provider(provider: P, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Sign and embed, dating the block with the current UTC time
    pub fn sign(&self, request: &SignRequest) -> Result<SignedDocument, SealError> {
        let timestamp = self.render_timestamp(Utc::now());
        self.sign_at(request, &timestamp)
    }

    /// Sign and embed with a caller-chosen Date line.
    ///
    /// The timestamp is flattened to one line and any block label in it is
    /// defused before it is written; `SignedDocument::timestamp` holds the
    /// text actually embedded.
    #[instrument(skip(self, request), fields(document_len = request.document.as_ref().map(Vec::len)))]
    pub fn sign_at(&self, request: &SignRequest, timestamp: &str) -> Result<SignedDocument, SealError> {
        let DetachedSignature {
            fingerprint,
            signature,
        } = self.sign_detached(request)?;

        enter(Stage::Embedding);
        let timestamp = sanitize_field(timestamp);
        let stamp = Stamp {
            algorithm: self.provider.algorithm_label(),
            fingerprint: &fingerprint,
            signature: &signature,
            timestamp: &timestamp,
        };
        let document = required(request.document.as_deref(), "document")?;
        let derived = shared_pdf::embed(document, &stamp, &self.config.embed)?;

        info!(
            fingerprint = %fingerprint,
            output_len = derived.len(),
            "document signed"
        );
        Ok(SignedDocument {
            fingerprint,
            signature,
            timestamp,
            document: derived,
        })
    }

    /// Sign without producing a derived document
    #[instrument(skip(self, request), fields(document_len = request.document.as_ref().map(Vec::len)))]
    pub fn sign_detached(&self, request: &SignRequest) -> Result<DetachedSignature, SealError> {
        enter(Stage::Reading);
        let document = required(request.document.as_deref(), "document")?;
        let pem = required_text(request.private_key_pem.as_deref(), "private_key")?;

        enter(Stage::Digesting);
        let fingerprint = self.provider.digest(document);

        enter(Stage::Signing);
        let signature = {
            let key = self.provider.parse_private_key(pem)?;
            self.provider.sign(&key, &fingerprint.signing_payload())?
        };

        Ok(DetachedSignature {
            fingerprint,
            signature,
        })
    }

    /// Recompute the document's fingerprint and check the supplied signature
    /// over it. Any change to the document after signing yields `Invalid`.
    #[instrument(skip(self, request), fields(document_len = request.document.as_ref().map(Vec::len)))]
    pub fn verify_detached(&self, request: &VerifyDetachedRequest) -> Result<Verdict, SealError> {
        enter(Stage::Reading);
        let document = required(request.document.as_deref(), "document")?;
        let pem = required_text(request.public_key_pem.as_deref(), "public_key")?;
        let signature = required_text(request.signature_base64.as_deref(), "signature")?;

        enter(Stage::Digesting);
        let fingerprint = self.provider.digest(document);

        enter(Stage::Verifying);
        let verified = self.check(pem, &fingerprint.signing_payload(), signature)?;

        let assertion_holds = match request.asserted_fingerprint_hex.as_deref() {
            Some(asserted) if !asserted.trim().is_empty() => {
                let holds = asserted.trim().eq_ignore_ascii_case(&fingerprint.to_hex());
                if !holds {
                    warn!(recomputed = %fingerprint, "asserted fingerprint does not match document");
                }
                holds
            }
            _ => true,
        };

        let verdict = Verdict::from(verified && assertion_holds);
        info!(?verdict, "detached verification finished");
        Ok(verdict)
    }

    /// Find the embedded fingerprint and check the supplied signature over it.
    ///
    /// The signed artifact is not re-digested: its bytes changed when the
    /// block was embedded.
    #[instrument(skip(self, request), fields(document_len = request.document.as_ref().map(Vec::len)))]
    pub fn verify_embedded(&self, request: &VerifyEmbeddedRequest) -> Result<Verdict, SealError> {
        enter(Stage::Reading);
        let document = required(request.document.as_deref(), "document")?;
        let pem = required_text(request.public_key_pem.as_deref(), "public_key")?;
        let signature = required_text(request.signature_base64.as_deref(), "signature")?;

        let block = self.inspect(document)?;
        self.verify_embedded_block(&block, pem, signature)
    }

    /// Verify a block that was already extracted. The fingerprint text is
    /// signed as found, so any corruption of it gives `Invalid`.
    pub fn verify_embedded_block(
        &self,
        block: &EmbeddedSignatureBlock,
        public_key_pem: &str,
        signature_base64: &str,
    ) -> Result<Verdict, SealError> {
        let pem = required_text(Some(public_key_pem), "public_key")?;
        let signature = required_text(Some(signature_base64), "signature")?;
        if block.signature_truncated {
            debug!("embedded signature text is truncated; using the supplied signature");
        }

        enter(Stage::Verifying);
        let verified = self.check(pem, block.fingerprint_hex.as_bytes(), signature)?;

        let verdict = Verdict::from(verified);
        info!(?verdict, fingerprint = %block.fingerprint_hex, "embedded verification finished");
        Ok(verdict)
    }

    /// Locate the most recent signature block in a document
    pub fn inspect(&self, document: &[u8]) -> Result<EmbeddedSignatureBlock, SealError> {
        enter(Stage::Extracting);
        Ok(shared_pdf::extract(document)?)
    }

    fn check(&self, pem: &str, payload: &[u8], signature_base64: &str) -> Result<bool, SealError> {
        let key = self.provider.parse_public_key(pem)?;
        let signature = Signature::from_base64(signature_base64)?;
        Ok(self.provider.verify(&key, payload, &signature)?)
    }

    fn render_timestamp(&self, at: DateTime<Utc>) -> String {
        let mut rendered = String::new();
        if write!(rendered, "{}", at.format(&self.config.timestamp_format)).is_err() {
            warn!(
                format = %self.config.timestamp_format,
                "invalid timestamp format, using default"
            );
            rendered = at
                .format(crate::config::DEFAULT_TIMESTAMP_FORMAT)
                .to_string();
        }
        sanitize_field(&rendered)
    }
}

fn required<'a>(value: Option<&'a [u8]>, field: &'static str) -> Result<&'a [u8], SealError> {
    value.ok_or(SealError::Input(InputError::MissingRequiredField(field)))
}

fn required_text<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, SealError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(InputError::MissingRequiredField(field).into()),
    }
}
