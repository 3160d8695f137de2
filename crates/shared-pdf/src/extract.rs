//! Recovering the signature block from a document's rendered text

use crate::block::EmbeddedSignatureBlock;
use crate::error::ExtractError;
use crate::parser::{sniff, DocumentFormat};
use std::panic;
use tracing::{debug, instrument, warn};

/// Render the document to plain text in reading order.
///
/// PDFs go through pdf-extract; anything else is read as (lossy) UTF-8.
pub fn render_text(document: &[u8]) -> Result<String, ExtractError> {
    match sniff(document) {
        DocumentFormat::Pdf => pdf_text(document),
        DocumentFormat::Opaque => Ok(String::from_utf8_lossy(document).into_owned()),
    }
}

fn pdf_text(document: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some damaged inputs instead of returning an error
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(document)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::UnreadableDocument(e.to_string())),
        Err(_) => Err(ExtractError::UnreadableDocument(
            "text extraction aborted on malformed content".to_string(),
        )),
    }
}

/// Find the most recent signature block in `document`
#[instrument(skip(document), fields(document_len = document.len()))]
pub fn extract(document: &[u8]) -> Result<EmbeddedSignatureBlock, ExtractError> {
    let text = render_text(document)?;
    debug!(text_len = text.len(), "rendered document text");

    match EmbeddedSignatureBlock::locate(&text) {
        Some(block) => Ok(block),
        None => {
            warn!("no signature hash found in document text");
            Err(ExtractError::HashNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf;

    #[test]
    fn test_plain_text_without_block() {
        assert_eq!(
            extract(b"just some notes\nno signature here"),
            Err(ExtractError::HashNotFound)
        );
    }

    #[test]
    fn test_pdf_without_block() {
        let document = test_pdf::with_pages(&["Unsigned invoice"]);
        assert!(render_text(&document).unwrap().contains("Unsigned invoice"));
        assert_eq!(extract(&document), Err(ExtractError::HashNotFound));
    }

    #[test]
    fn test_broken_pdf_is_unreadable() {
        assert!(matches!(
            extract(b"%PDF-1.7\nthis is not a pdf body"),
            Err(ExtractError::UnreadableDocument(_))
        ));
    }

    #[test]
    fn test_opaque_text_with_block() {
        let hex = "ab".repeat(32);
        let text = format!("notes\nHash (SHA-256): {}\n", hex);
        assert_eq!(extract(text.as_bytes()).unwrap().fingerprint_hex, hex);
    }

    #[test]
    fn test_non_utf8_opaque_bytes() {
        let mut bytes = vec![0xff, 0xfe, 0x00];
        bytes.extend_from_slice(b"\nHash (SHA-256): 00ff\n");
        assert_eq!(extract(&bytes).unwrap().fingerprint_hex, "00ff");
    }
}
