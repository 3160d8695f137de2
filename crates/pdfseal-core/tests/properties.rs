//! Property tests over the workflows. RSA keys are generated once per
//! binary; case counts are kept low because every case signs.

mod common;

use common::*;
use pdfseal_core::{
    Engine, SignRequest, VerificationOutcome, VerifyDetachedRequest, VerifyEmbeddedRequest,
};
use proptest::prelude::*;

fn sign(engine: &Engine, document: &[u8]) -> pdfseal_core::SignedDocument {
    engine
        .sign(&SignRequest {
            document: Some(document.to_vec()),
            private_key_pem: Some(KEY_A.private_pem.clone()),
        })
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: flipping any single byte of a signed document makes
    /// detached verification report Invalid
    #[test]
    fn tamper_detection(
        document in prop::collection::vec(any::<u8>(), 1..512),
        index in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let engine = Engine::default();
        let signed = engine
            .sign_detached(&SignRequest {
                document: Some(document.clone()),
                private_key_pem: Some(KEY_A.private_pem.clone()),
            })
            .unwrap();

        let mut tampered = document.clone();
        let i = index.index(tampered.len());
        tampered[i] ^= mask;

        let outcome = VerificationOutcome::from(engine.verify_detached(&VerifyDetachedRequest {
            document: Some(tampered),
            public_key_pem: Some(KEY_A.public_pem.clone()),
            signature_base64: Some(signed.signature.to_base64()),
            asserted_fingerprint_hex: None,
        }));
        prop_assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    /// Property: any opaque document survives sign, embed, extract and
    /// verify-embedded as Valid
    #[test]
    fn embedded_round_trip(document in prop::collection::vec(any::<u8>(), 0..512)) {
        // Documents that look like PDFs take the PDF carrier instead
        prop_assume!(!document.starts_with(b"%PDF-"));

        let engine = Engine::default();
        let signed = sign(&engine, &document);

        let block = engine.inspect(&signed.document).unwrap();
        prop_assert_eq!(&block.fingerprint_hex, &signed.fingerprint_hex());

        let outcome = VerificationOutcome::from(engine.verify_embedded(&VerifyEmbeddedRequest {
            document: Some(signed.document.clone()),
            public_key_pem: Some(KEY_A.public_pem.clone()),
            signature_base64: Some(signed.signature_base64()),
        }));
        prop_assert_eq!(outcome, VerificationOutcome::Valid);
    }

    /// Property: key pair A's signatures never verify under key B, and the
    /// mismatch is a verdict rather than an error
    #[test]
    fn wrong_key_rejection(document in prop::collection::vec(any::<u8>(), 0..256)) {
        let engine = Engine::default();
        let signed = engine
            .sign_detached(&SignRequest {
                document: Some(document.clone()),
                private_key_pem: Some(KEY_A.private_pem.clone()),
            })
            .unwrap();

        let outcome = VerificationOutcome::from(engine.verify_detached(&VerifyDetachedRequest {
            document: Some(document),
            public_key_pem: Some(KEY_B.public_pem.clone()),
            signature_base64: Some(signed.signature.to_base64()),
            asserted_fingerprint_hex: None,
        }));
        prop_assert_eq!(outcome, VerificationOutcome::Invalid);
    }
}
