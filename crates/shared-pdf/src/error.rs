use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    #[error("Failed to parse PDF: {0}")]
    MalformedPdf(String),

    #[error("PDF has no pages to stamp")]
    NoPages,

    #[error("Failed to write signed PDF: {0}")]
    Write(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No 'Hash (SHA-256): ' entry found in document text")]
    HashNotFound,

    #[error("Document text could not be rendered: {0}")]
    UnreadableDocument(String),
}
