//! Stamping a signature block into a document
//!
//! PDFs get the block drawn in Helvetica on the final page. Everything else
//! gets the block appended after its bytes, so the signature travels
//! alongside the content.

use crate::block::Stamp;
use crate::config::{EmbedConfig, Placement};
use crate::error::EmbedError;
use crate::parser::{sniff, DocumentFormat, PdfDocument};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use tracing::{debug, instrument};

/// Average Helvetica advance for hex digits and label text, in em
const HASH_CHAR_WIDTH: f64 = 0.6;

/// Conservative Helvetica advance for base64 text, in em
const WRAP_CHAR_WIDTH: f64 = 0.75;

/// Narrowest signature continuation line we will produce
const MIN_WRAP_COLUMNS: usize = 16;

const FONT_RESOURCE_PREFIX: &str = "SealHelv";

/// Produce a new document carrying `stamp`. The input is never modified.
#[instrument(skip(document, stamp, config), fields(document_len = document.len()))]
pub fn embed(document: &[u8], stamp: &Stamp<'_>, config: &EmbedConfig) -> Result<Vec<u8>, EmbedError> {
    match sniff(document) {
        DocumentFormat::Pdf => embed_pdf(document, stamp, config),
        DocumentFormat::Opaque => Ok(embed_opaque(document, stamp, config)),
    }
}

fn embed_opaque(document: &[u8], stamp: &Stamp<'_>, config: &EmbedConfig) -> Vec<u8> {
    debug!("appending signature block as trailing text");
    let text = stamp.lines(config.signature_display, None).join("\n");

    let mut out = Vec::with_capacity(document.len() + text.len() + 2);
    out.extend_from_slice(document);
    out.push(b'\n');
    out.extend_from_slice(text.as_bytes());
    out.push(b'\n');
    out
}

fn embed_pdf(document: &[u8], stamp: &Stamp<'_>, config: &EmbedConfig) -> Result<Vec<u8>, EmbedError> {
    let mut pdf = PdfDocument::from_bytes(document)?;
    let (page_number, last_page_id) = pdf.last_page().ok_or(EmbedError::NoPages)?;
    let media_box = pdf.page_dimensions(last_page_id)?;

    // A page carries at most one block; re-signing moves to a fresh page
    let placement = match config.placement {
        Placement::LastPageBottom if has_seal_font(&pdf, last_page_id)? => Placement::AppendedPage,
        other => other,
    };
    let page_id = match placement {
        Placement::LastPageBottom => last_page_id,
        Placement::AppendedPage => append_blank_page(&mut pdf, last_page_id, media_box)?,
    };
    debug!(page_number, ?placement, "drawing signature block");

    let font_name = install_font(&mut pdf, page_id)?;
    let layout = Layout::fit(stamp, config, media_box);
    let lines = stamp.lines(config.signature_display, Some(layout.wrap_columns));
    let content = layout.content(&font_name, &lines)?;
    append_content(&mut pdf, page_id, content)?;

    pdf.save_to_bytes()
}

/// Font size, wrapping and position for the block on one page
struct Layout {
    x: f64,
    bottom: f64,
    font_size: f64,
    line_height: f64,
    wrap_columns: usize,
}

impl Layout {
    fn fit(stamp: &Stamp<'_>, config: &EmbedConfig, media_box: [f64; 4]) -> Self {
        let [x, y, width, _] = media_box;
        let max_width = (width - config.margin_left - config.margin_right).max(1.0);

        // The hash line must stay on one line; shrink the font until it fits
        let hash_chars = crate::block::HASH_LABEL.len() + stamp.fingerprint.to_hex().len();
        let needed = hash_chars as f64 * HASH_CHAR_WIDTH * config.font_size;
        let scale = if needed > max_width {
            max_width / needed
        } else {
            1.0
        };
        let font_size = config.font_size * scale;
        let line_height = config.line_height * scale;

        let wrap_columns =
            ((max_width / (font_size * WRAP_CHAR_WIDTH)) as usize).max(MIN_WRAP_COLUMNS);

        Self {
            x: x + config.margin_left,
            bottom: y + config.margin_bottom,
            font_size,
            line_height,
            wrap_columns,
        }
    }

    /// Content stream: close the page's saved state, then draw in a fresh one
    fn content(&self, font_name: &str, lines: &[String]) -> Result<Vec<u8>, EmbedError> {
        let top = self.bottom + self.line_height * lines.len().saturating_sub(1) as f64;

        let mut operations = vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font_name.as_bytes().to_vec()), real(self.font_size)]),
            Operation::new("Td", vec![real(self.x), real(top)]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![real(0.0), real(-self.line_height)]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        }
        operations.push(Operation::new("ET", vec![]));
        operations.push(Operation::new("Q", vec![]));

        let mut encoded = b"\n".to_vec();
        encoded.extend(
            Content { operations }
                .encode()
                .map_err(|e| EmbedError::Write(e.to_string()))?,
        );
        encoded.push(b'\n');
        Ok(encoded)
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Whether a previous signing already stamped this page
fn has_seal_font(pdf: &PdfDocument, page_id: ObjectId) -> Result<bool, EmbedError> {
    let Some(resources) = pdf.inherited_attribute(page_id, b"Resources")? else {
        return Ok(false);
    };
    let fonts = pdf
        .resolve(&resources)?
        .as_dict()
        .ok()
        .and_then(|r| r.get(b"Font").ok());
    let fonts = match fonts {
        Some(obj) => pdf.resolve(obj)?.as_dict().ok(),
        None => None,
    };
    Ok(fonts.is_some_and(|f| {
        f.iter()
            .any(|(name, _)| name.starts_with(FONT_RESOURCE_PREFIX.as_bytes()))
    }))
}

/// Add a Helvetica font to the page's own resources and return its name.
///
/// Inherited resources are copied onto the page first so the existing
/// content keeps seeing the fonts and images it was drawn with.
fn install_font(pdf: &mut PdfDocument, page_id: ObjectId) -> Result<String, EmbedError> {
    let mut resources = match pdf.inherited_attribute(page_id, b"Resources")? {
        Some(obj) => pdf
            .resolve(&obj)?
            .as_dict()
            .map_err(|_| EmbedError::MalformedPdf("Resources is not a dictionary".to_string()))?
            .clone(),
        None => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(obj) => pdf
            .resolve(obj)?
            .as_dict()
            .map_err(|_| EmbedError::MalformedPdf("Font resource is not a dictionary".to_string()))?
            .clone(),
        Err(_) => Dictionary::new(),
    };

    let font_name = (1..)
        .map(|n| format!("{}{}", FONT_RESOURCE_PREFIX, n))
        .find(|name| !fonts.has(name.as_bytes()))
        .unwrap_or_else(|| FONT_RESOURCE_PREFIX.to_string());

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    let font_id = pdf.doc.add_object(Object::Dictionary(font));

    fonts.set(font_name.as_bytes().to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));
    pdf.dict_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));

    Ok(font_name)
}

/// Wrap the page's existing content in q/Q and append the block after it
fn append_content(pdf: &mut PdfDocument, page_id: ObjectId, block: Vec<u8>) -> Result<(), EmbedError> {
    let existing: Vec<Object> = match pdf.dict(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match pdf.doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            Ok(_) => vec![Object::Reference(*id)],
            Err(e) => return Err(EmbedError::MalformedPdf(e.to_string())),
        },
        Ok(Object::Array(items)) => items.clone(),
        Ok(_) => {
            return Err(EmbedError::MalformedPdf(
                "page Contents is neither a stream nor an array".to_string(),
            ))
        }
        Err(_) => Vec::new(),
    };

    let save_id = pdf
        .doc
        .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let block_id = pdf.doc.add_object(Stream::new(Dictionary::new(), block));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(block_id));

    pdf.dict_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Insert an empty page after `after` in the same page-tree node
fn append_blank_page(
    pdf: &mut PdfDocument,
    after: ObjectId,
    media_box: [f64; 4],
) -> Result<ObjectId, EmbedError> {
    let parent_id = pdf
        .dict(after)?
        .get(b"Parent")
        .and_then(Object::as_reference)
        .map_err(|_| EmbedError::MalformedPdf("last page has no Parent".to_string()))?;

    let [x, y, width, height] = media_box;
    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(parent_id));
    page.set(
        "MediaBox",
        Object::Array(vec![real(x), real(y), real(x + width), real(y + height)]),
    );
    page.set("Resources", Object::Dictionary(Dictionary::new()));
    let page_id = pdf.doc.add_object(Object::Dictionary(page));

    // Kids may be inline or an indirect array
    let kids_ref = pdf
        .dict(parent_id)?
        .get(b"Kids")
        .and_then(Object::as_reference)
        .ok();
    let kids = match kids_ref {
        Some(id) => pdf.doc.get_object_mut(id),
        None => pdf.dict_mut(parent_id)?.get_mut(b"Kids"),
    }
    .and_then(Object::as_array_mut)
    .map_err(|_| EmbedError::MalformedPdf("page tree node has no Kids array".to_string()))?;

    let position = kids
        .iter()
        .position(|kid| kid.as_reference().ok() == Some(after))
        .map(|i| i + 1)
        .unwrap_or(kids.len());
    kids.insert(position, Object::Reference(page_id));

    // Every ancestor's leaf count grows by one
    let mut node = Some(parent_id);
    let mut depth = 0;
    while let Some(id) = node {
        depth += 1;
        if depth > 64 {
            return Err(EmbedError::MalformedPdf(
                "page tree is too deep or cyclic".to_string(),
            ));
        }
        let dict = pdf.dict_mut(id)?;
        let count = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        dict.set("Count", Object::Integer(count + 1));
        node = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page_id)
}
