//! The embedded signature block: text format, rendering and location
//!
//! ```text
//! Digital Signature: RSASSA-PKCS1-v1_5 with SHA-256
//! Hash (SHA-256): 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//! Signature (Base64): kq3N...
//! Date: 2024-05-01 09:30:00 UTC
//! ```
//!
//! Extraction matches the literal hash label followed directly by hex digits,
//! so the hash line is never wrapped or padded. The line after it starts with
//! `S`, which is not a hex digit, so a renderer that drops the line break
//! still cannot run the signature into the hash.

use crate::config::SignatureDisplay;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use shared_crypto::{Fingerprint, Signature};

pub const HEADER_LABEL: &str = "Digital Signature: ";
pub const HASH_LABEL: &str = "Hash (SHA-256): ";
pub const SIGNATURE_LABEL: &str = "Signature (Base64): ";
pub const DATE_LABEL: &str = "Date: ";
pub const TRUNCATION_MARKER: &str = "...";

lazy_static! {
    static ref HASH_RE: Regex = Regex::new(r"Hash \(SHA-256\): ([0-9A-Fa-f]+)").unwrap();
    static ref DATE_RE: Regex = Regex::new(r"Date: ([^\r\n]*)").unwrap();
}

/// The values written into a document when it is signed
#[derive(Debug, Clone, Copy)]
pub struct Stamp<'a> {
    pub algorithm: &'a str,
    pub fingerprint: &'a Fingerprint,
    pub signature: &'a Signature,
    pub timestamp: &'a str,
}

/// Make caller text safe to place on a single block line: line breaks become
/// spaces and block labels lose their colon, so extraction cannot mistake
/// the text for a header or hash entry.
pub fn sanitize_field(text: &str) -> String {
    let mut flat = text.replace(['\r', '\n'], " ");
    for label in [HEADER_LABEL, HASH_LABEL, SIGNATURE_LABEL] {
        let label = label.trim_end();
        let defused = label.trim_end_matches(':');
        // Repeat until stable: `Hash (SHA-256)::` must not collapse into a label
        while flat.contains(label) {
            flat = flat.replace(label, defused);
        }
    }
    flat
}

impl Stamp<'_> {
    /// Render the block as text lines.
    ///
    /// With `wrap_columns`, the signature is broken across continuation
    /// lines of at most that many characters. No other line is wrapped.
    pub fn lines(&self, display: SignatureDisplay, wrap_columns: Option<usize>) -> Vec<String> {
        let signature = match display {
            SignatureDisplay::Full => self.signature.to_base64(),
            SignatureDisplay::Truncated { chars } => {
                let full = self.signature.to_base64();
                if full.len() > chars {
                    format!("{}{}", &full[..chars], TRUNCATION_MARKER)
                } else {
                    full
                }
            }
        };

        let mut lines = vec![
            format!("{}{}", HEADER_LABEL, sanitize_field(self.algorithm)),
            format!("{}{}", HASH_LABEL, self.fingerprint.to_hex()),
        ];

        match wrap_columns {
            Some(columns) => {
                let first_width = columns.saturating_sub(SIGNATURE_LABEL.len()).max(1);
                let split = first_width.min(signature.len());
                lines.push(format!("{}{}", SIGNATURE_LABEL, &signature[..split]));
                for chunk in signature.as_bytes()[split..].chunks(columns.max(1)) {
                    // base64 and the marker are ASCII, so byte chunks are valid UTF-8
                    lines.push(String::from_utf8_lossy(chunk).into_owned());
                }
            }
            None => lines.push(format!("{}{}", SIGNATURE_LABEL, signature)),
        }

        lines.push(format!("{}{}", DATE_LABEL, sanitize_field(self.timestamp)));
        lines
    }
}

/// A signature block recovered from a document's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedSignatureBlock {
    /// Text after `Digital Signature: `, if the header line was found
    pub algorithm: Option<String>,
    /// Hex digits exactly as they appear after `Hash (SHA-256): `
    pub fingerprint_hex: String,
    /// Rendered signature text. Display only: never used for verification.
    pub signature_display: Option<String>,
    /// Whether the rendered signature ended in the truncation marker
    pub signature_truncated: bool,
    pub timestamp: Option<String>,
}

impl EmbeddedSignatureBlock {
    /// Find the most recent block in rendered document text.
    ///
    /// A re-signed document carries several blocks. The hash that follows
    /// the last `Digital Signature: ` header wins; text without any header
    /// falls back to the last hash entry in reading order.
    pub fn locate(text: &str) -> Option<Self> {
        let (hash, header) = find_hash(text)?;
        let whole = hash.get(0)?;
        let digits = hash.get(1)?;

        let algorithm = header.map(|pos| {
            let rest = &text[pos + HEADER_LABEL.len()..];
            rest.lines().next().unwrap_or_default().trim().to_string()
        });

        // The rest of this block ends where the next header (if any) begins
        let tail = &text[whole.end()..];
        let tail = match tail.find(HEADER_LABEL) {
            Some(pos) => &tail[..pos],
            None => tail,
        };

        let date = DATE_RE.captures(tail);
        let timestamp = date
            .as_ref()
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());

        let signature_display = tail.find(SIGNATURE_LABEL).map(|pos| {
            let start = pos + SIGNATURE_LABEL.len();
            let end = date
                .as_ref()
                .and_then(|c| c.get(0))
                .map(|m| m.start())
                .filter(|&end| end >= start)
                .unwrap_or(tail.len());
            tail[start..end]
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
        });

        let signature_truncated = signature_display
            .as_deref()
            .is_some_and(|s| s.ends_with(TRUNCATION_MARKER));
        let signature_display = signature_display.map(|s| {
            s.strip_suffix(TRUNCATION_MARKER)
                .map(str::to_string)
                .unwrap_or(s)
        });

        Some(Self {
            algorithm,
            fingerprint_hex: digits.as_str().to_string(),
            signature_display,
            signature_truncated,
            timestamp,
        })
    }
}

/// The hash entry and, when present, the position of the header it belongs to
fn find_hash(text: &str) -> Option<(Captures<'_>, Option<usize>)> {
    let headers: Vec<usize> = text.match_indices(HEADER_LABEL).map(|(i, _)| i).collect();
    for (n, &start) in headers.iter().enumerate().rev() {
        let end = headers.get(n + 1).copied().unwrap_or(text.len());
        if let Some(hash) = HASH_RE.captures_at(&text[..end], start) {
            return Some((hash, Some(start)));
        }
    }

    let hash = HASH_RE.captures_iter(text).last()?;
    let header = text[..hash.get(0)?.start()].rfind(HEADER_LABEL);
    Some((hash, header))
}
