//! Shared PDF handling utilities
//!
//! This crate records a signature block inside a document's visible content
//! and finds it again by scraping the rendered text. PDFs get the block drawn
//! on their final page; any other bytes get it appended as trailing text.

pub mod block;
pub mod config;
pub mod embed;
pub mod error;
pub mod extract;
pub mod parser;

#[cfg(test)]
pub(crate) mod test_pdf;

pub use block::{EmbeddedSignatureBlock, Stamp};
pub use config::{EmbedConfig, Placement, SignatureDisplay};
pub use embed::embed;
pub use error::{EmbedError, ExtractError};
pub use extract::{extract, render_text};
pub use parser::{sniff, DocumentFormat, PdfDocument};
