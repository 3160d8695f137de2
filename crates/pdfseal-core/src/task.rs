//! Async entry points
//!
//! RSA and PDF text rendering are CPU-bound, so each workflow runs on the
//! blocking pool with owned inputs. A panicked or cancelled task surfaces
//! as [`SealError::Interrupted`].

use crate::engine::{
    DetachedSignature, Engine, SignRequest, SignedDocument, VerifyDetachedRequest,
    VerifyEmbeddedRequest,
};
use crate::error::SealError;
use crate::outcome::Verdict;
use shared_crypto::CryptoProvider;

async fn run_blocking<T, F>(work: F) -> Result<T, SealError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SealError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SealError::Interrupted(e.to_string()))?
}

impl<P> Engine<P>
where
    P: CryptoProvider + Clone + 'static,
{
    pub async fn sign_async(&self, request: SignRequest) -> Result<SignedDocument, SealError> {
        let engine = self.clone();
        run_blocking(move || engine.sign(&request)).await
    }

    pub async fn sign_detached_async(
        &self,
        request: SignRequest,
    ) -> Result<DetachedSignature, SealError> {
        let engine = self.clone();
        run_blocking(move || engine.sign_detached(&request)).await
    }

    pub async fn verify_detached_async(
        &self,
        request: VerifyDetachedRequest,
    ) -> Result<Verdict, SealError> {
        let engine = self.clone();
        run_blocking(move || engine.verify_detached(&request)).await
    }

    pub async fn verify_embedded_async(
        &self,
        request: VerifyEmbeddedRequest,
    ) -> Result<Verdict, SealError> {
        let engine = self.clone();
        run_blocking(move || engine.verify_embedded(&request)).await
    }
}
