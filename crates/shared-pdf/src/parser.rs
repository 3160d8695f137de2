//! PDF parsing and manipulation using lopdf

use crate::error::EmbedError;
use lopdf::{Dictionary, Document, Object, ObjectId};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// US Letter, used when no MediaBox can be found
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Guards against cyclic /Parent chains in damaged files
const MAX_TREE_DEPTH: usize = 64;

/// How a document carries its signature block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Drawn onto the final page
    Pdf,
    /// Appended as trailing text
    Opaque,
}

/// Classify bytes by their header
pub fn sniff(bytes: &[u8]) -> DocumentFormat {
    if bytes.starts_with(PDF_MAGIC) {
        DocumentFormat::Pdf
    } else {
        DocumentFormat::Opaque
    }
}

/// Wrapper around lopdf::Document for signing operations
pub struct PdfDocument {
    pub(crate) doc: Document,
}

impl PdfDocument {
    /// Load a PDF from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EmbedError> {
        let doc = Document::load_mem(bytes).map_err(|e| EmbedError::MalformedPdf(e.to_string()))?;
        Ok(Self { doc })
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page number and object ID of the final page
    pub fn last_page(&self) -> Option<(u32, ObjectId)> {
        self.doc
            .get_pages()
            .into_iter()
            .next_back()
    }

    /// Get page dimensions (MediaBox) as [x, y, width, height]
    pub fn page_dimensions(&self, page_id: ObjectId) -> Result<[f64; 4], EmbedError> {
        match self.inherited_attribute(page_id, b"MediaBox")? {
            Some(media_box) => self.parse_rect(&media_box),
            None => Ok(DEFAULT_MEDIA_BOX),
        }
    }

    /// Look up a page attribute, walking /Parent links for inheritable keys
    pub(crate) fn inherited_attribute(
        &self,
        page_id: ObjectId,
        key: &[u8],
    ) -> Result<Option<Object>, EmbedError> {
        let mut current = page_id;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = self.dict(current)?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => return Ok(None),
            }
        }
        Err(EmbedError::MalformedPdf(
            "page tree is too deep or cyclic".to_string(),
        ))
    }

    pub(crate) fn dict(&self, id: ObjectId) -> Result<&Dictionary, EmbedError> {
        self.doc
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| EmbedError::MalformedPdf(format!("object {:?}: {}", id, e)))
    }

    pub(crate) fn dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary, EmbedError> {
        self.doc
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| EmbedError::MalformedPdf(format!("object {:?}: {}", id, e)))
    }

    /// Follow a reference to its target; other objects are returned as-is
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, EmbedError> {
        match obj {
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| EmbedError::MalformedPdf(format!("Failed to resolve reference: {}", e))),
            other => Ok(other),
        }
    }

    /// Parse a PDF rectangle array into [x, y, width, height]
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], EmbedError> {
        let arr = self
            .resolve(obj)?
            .as_array()
            .map_err(|_| EmbedError::MalformedPdf("MediaBox is not an array".to_string()))?;

        if arr.len() != 4 {
            return Err(EmbedError::MalformedPdf(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }

        // Convert from [x1, y1, x2, y2] to [x, y, width, height]
        Ok([
            values[0].min(values[2]),
            values[1].min(values[3]),
            (values[2] - values[0]).abs(),
            (values[3] - values[1]).abs(),
        ])
    }

    /// Extract a number from a PDF object
    fn extract_number(&self, obj: &Object) -> Result<f64, EmbedError> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            _ => Err(EmbedError::MalformedPdf(
                "Expected number in rectangle".to_string(),
            )),
        }
    }

    /// Save the document to bytes
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, EmbedError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| EmbedError::Write(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf;

    #[test]
    fn test_sniff() {
        assert_eq!(sniff(b"%PDF-1.7\n..."), DocumentFormat::Pdf);
        assert_eq!(sniff(b"hello-pdf-bytes"), DocumentFormat::Opaque);
        assert_eq!(sniff(b""), DocumentFormat::Opaque);
    }

    #[test]
    fn test_from_bytes_valid_pdf() {
        let pdf = PdfDocument::from_bytes(&test_pdf::with_pages(&["one", "two"])).unwrap();
        assert_eq!(pdf.page_count(), 2);
        assert_eq!(pdf.last_page().map(|(n, _)| n), Some(2));
    }

    #[test]
    fn test_from_bytes_html_fails() {
        // An SPA fallback page served where a PDF was expected
        let html_bytes = b"<!DOCTYPE html><html><head></head><body>Not a PDF</body></html>";
        assert!(matches!(
            PdfDocument::from_bytes(html_bytes),
            Err(EmbedError::MalformedPdf(_))
        ));
    }

    #[test]
    fn test_from_bytes_garbage_fails() {
        let garbage = vec![0u8; 100];
        assert!(PdfDocument::from_bytes(&garbage).is_err());
        assert!(PdfDocument::from_bytes(b"%PDF-1.5\nnot really").is_err());
    }

    #[test]
    fn test_page_dimensions_inherited_from_parent() {
        let pdf = PdfDocument::from_bytes(&test_pdf::with_inherited_resources("body")).unwrap();
        let (_, page_id) = pdf.last_page().unwrap();
        assert_eq!(pdf.page_dimensions(page_id).unwrap(), [0.0, 0.0, 595.0, 842.0]);
    }

    #[test]
    fn test_parse_rect_array() {
        let pdf = PdfDocument {
            doc: Document::new(),
        };
        let arr = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Real(792.0),
        ]);
        assert_eq!(pdf.parse_rect(&arr).unwrap(), [0.0, 0.0, 612.0, 792.0]);

        let short = Object::Array(vec![Object::Integer(0)]);
        assert!(pdf.parse_rect(&short).is_err());
    }
}
