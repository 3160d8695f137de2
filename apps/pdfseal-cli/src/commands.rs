use anyhow::Context;
use pdfseal_core::{
    EmbeddedSignatureBlock, Engine, ErrorKind, SignRequest, VerificationOutcome,
    VerifyDetachedRequest,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

/// Environment fallback for the signing key, as used by hosted signers
pub const PRIVATE_KEY_ENV: &str = "PDFSEAL_PRIVATE_KEY";

pub fn keygen(bits: usize, out_dir: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let pair = shared_crypto::generate_key_pair(bits).context("Failed to generate key pair")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let private_path = out_dir.join("private.pem");
    let public_path = out_dir.join("public.pem");
    write_private(&private_path, &pair.private_pem)?;
    fs::write(&public_path, &pair.public_pem)
        .with_context(|| format!("Failed to write {}", public_path.display()))?;

    info!(bits, "generated key pair");
    if json {
        println!(
            "{}",
            json!({
                "private_key": private_path,
                "public_key": public_path,
                "bits": bits,
            })
        );
    } else {
        println!("Private key: {}", private_path.display());
        println!("Public key:  {}", public_path.display());
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(unix)]
fn write_private(path: &Path, pem: &str) -> anyhow::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.write_all(pem.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(not(unix))]
fn write_private(path: &Path, pem: &str) -> anyhow::Result<()> {
    fs::write(path, pem).with_context(|| format!("Failed to write {}", path.display()))
}

pub async fn sign(
    engine: &Engine,
    input: &Path,
    key: Option<&Path>,
    output: Option<PathBuf>,
    detached: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let request = SignRequest {
        document: Some(read_document(input)?),
        private_key_pem: match key {
            Some(path) => Some(read_text(path)?),
            None => std::env::var(PRIVATE_KEY_ENV).ok().map(|v| unescape_env_pem(&v)),
        },
    };

    if detached {
        let signed = engine.sign_detached_async(request).await?;
        print_signature(
            &signed.fingerprint.to_hex(),
            &signed.signature.to_base64(),
            None,
            json,
        );
        return Ok(ExitCode::SUCCESS);
    }

    let signed = engine.sign_async(request).await?;
    let output = output.unwrap_or_else(|| default_output_path(input));
    fs::write(&output, &signed.document)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_signature(
        &signed.fingerprint_hex(),
        &signed.signature_base64(),
        Some(&output),
        json,
    );
    Ok(ExitCode::SUCCESS)
}

fn print_signature(hash: &str, signature: &str, output: Option<&Path>, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "hash": hash,
                "signature": signature,
                "output": output,
            })
        );
    } else {
        println!("Hash (SHA-256): {}", hash);
        println!("Signature (Base64): {}", signature);
        if let Some(path) = output {
            println!("Signed document: {}", path.display());
        }
    }
}

pub async fn verify(
    engine: &Engine,
    input: &Path,
    public_key: &Path,
    signature: &str,
    hash: Option<String>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let request = VerifyDetachedRequest {
        document: Some(read_document(input)?),
        public_key_pem: Some(read_text(public_key)?),
        signature_base64: Some(signature_argument(signature)?),
        asserted_fingerprint_hex: hash,
    };
    let outcome = VerificationOutcome::from(engine.verify_detached_async(request).await);
    Ok(report(outcome, None, json))
}

pub async fn verify_embedded(
    engine: &Engine,
    input: &Path,
    public_key: &Path,
    signature: &str,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let document = read_document(input)?;
    let public_key_pem = read_text(public_key)?;
    let signature = signature_argument(signature)?;

    let (outcome, block) = check_embedded(engine, document, public_key_pem, signature).await;
    Ok(report(outcome, block.as_ref(), json))
}

/// Extraction and verification run separately so the block can be shown.
/// Both are CPU-bound and go to the blocking pool.
async fn check_embedded(
    engine: &Engine,
    document: Vec<u8>,
    public_key_pem: String,
    signature: String,
) -> (VerificationOutcome, Option<EmbeddedSignatureBlock>) {
    let engine = engine.clone();
    let task = tokio::task::spawn_blocking(move || match engine.inspect(&document) {
        Ok(block) => {
            let verdict = engine.verify_embedded_block(&block, &public_key_pem, &signature);
            (VerificationOutcome::from(verdict), Some(block))
        }
        Err(e) => (VerificationOutcome::Error(e.kind()), None),
    });
    match task.await {
        Ok(checked) => checked,
        Err(e) => {
            warn!(error = %e, "verification task failed");
            (VerificationOutcome::Error(ErrorKind::Interrupted), None)
        }
    }
}

fn report(
    outcome: VerificationOutcome,
    block: Option<&EmbeddedSignatureBlock>,
    json: bool,
) -> ExitCode {
    if json {
        println!("{}", json!({ "result": outcome, "block": block }));
    } else {
        if let Some(block) = block {
            println!("Embedded hash: {}", block.fingerprint_hex);
            if let Some(date) = &block.timestamp {
                println!("Signed at: {}", date);
            }
        }
        println!("{}", outcome);
    }
    ExitCode::from(outcome.exit_code() as u8)
}

fn read_document(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// `@path` reads the signature from a file; anything else is the base64 itself
fn signature_argument(arg: &str) -> anyhow::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => read_text(Path::new(path)),
        None => Ok(arg.to_string()),
    }
}

/// `signed_<name>` next to the input
fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("signed_{}", name))
}

/// Keys stored in env files often carry literal `\n` instead of line breaks
fn unescape_env_pem(value: &str) -> String {
    value.replace("\\n", "\n")
}
