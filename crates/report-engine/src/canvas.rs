//! The abstract paged drawing surface and its lopdf implementation.
//!
//! The builder addresses pages by index and measures `y` from the top of
//! the page, which keeps the cursor arithmetic top-down. `LopdfCanvas`
//! converts to PDF's bottom-left origin when it emits operators.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Failed to encode page content: {0}")]
    Encode(String),

    #[error("Failed to serialize document: {0}")]
    Save(String),
}

/// An RGB color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const GREY: Rgb = Rgb(0.45, 0.45, 0.45);
    pub const LIGHT_GREY: Rgb = Rgb(0.8, 0.8, 0.8);
    /// Banner fill for section headers
    pub const NAVY: Rgb = Rgb(0.12, 0.2, 0.38);
    pub const GREEN: Rgb = Rgb(0.1, 0.5, 0.2);
    pub const RED: Rgb = Rgb(0.75, 0.1, 0.1);
    pub const AMBER: Rgb = Rgb(0.8, 0.5, 0.0);
}

/// Abstract multi-page drawing surface.
///
/// `y` coordinates are measured from the TOP of the page; text is drawn
/// with its baseline at `y`. Pages are addressed by index so a final
/// footer pass can write onto earlier pages once the page count is known.
pub trait PageCanvas {
    /// (width, height) in points; fixed for the whole document
    fn page_size(&self) -> (f64, f64);

    /// Append a fresh page and make it the last page
    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    fn draw_text(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        size: f64,
        bold: bool,
        color: Rgb,
        text: &str,
    );

    fn fill_rect(&mut self, page: usize, x: f64, y: f64, width: f64, height: f64, color: Rgb);
}

/// A4 in points
const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;

/// lopdf-backed canvas producing a real PDF.
///
/// Text is emitted with the Helvetica / Helvetica-Bold base fonts, so
/// glyphs outside WinAnsi are replaced with `?` (same policy as PDF
/// string escaping elsewhere in the workspace).
#[derive(Debug, Default)]
pub struct LopdfCanvas {
    pages: Vec<Vec<Operation>>,
}

impl LopdfCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the page tree and serialize the document
    pub fn finish(self) -> Result<Vec<u8>, CanvasError> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let helvetica = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let helvetica_bold = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica-Bold".to_vec())),
        ]));
        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(helvetica));
        fonts.set("F2", Object::Reference(helvetica_bold));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        let resources_id = doc.add_object(resources);

        let mut page_ids = Vec::new();
        for operations in self.pages {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| CanvasError::Encode(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(PAGE_WIDTH as f32),
                        Object::Real(PAGE_HEIGHT as f32),
                    ]),
                ),
                ("Resources", Object::Reference(resources_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| CanvasError::Save(e.to_string()))?;
        Ok(buffer)
    }
}

/// Replace characters the base fonts cannot encode and escape PDF string
/// delimiters
fn sanitize_pdf_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\\' => out.extend_from_slice(b"\\\\"),
            '…' => out.extend_from_slice(b"..."),
            _ if c.is_ascii() && !c.is_ascii_control() => out.push(c as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

impl PageCanvas for LopdfCanvas {
    fn page_size(&self) -> (f64, f64) {
        (PAGE_WIDTH, PAGE_HEIGHT)
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn draw_text(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        size: f64,
        bold: bool,
        color: Rgb,
        text: &str,
    ) {
        let Some(operations) = self.pages.get_mut(page) else {
            return;
        };
        let font = if bold { b"F2".to_vec() } else { b"F1".to_vec() };
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "rg",
                vec![
                    Object::Real(color.0),
                    Object::Real(color.1),
                    Object::Real(color.2),
                ],
            ),
            Operation::new(
                "Tf",
                vec![Object::Name(font), Object::Real(size as f32)],
            ),
            Operation::new(
                "Td",
                vec![
                    Object::Real(x as f32),
                    Object::Real((PAGE_HEIGHT - y) as f32),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(
                    sanitize_pdf_text(text),
                    lopdf::StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, page: usize, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        let Some(operations) = self.pages.get_mut(page) else {
            return;
        };
        // Convert the top-left anchor to PDF's bottom-left origin
        let pdf_y = PAGE_HEIGHT - y - height;
        operations.extend([
            Operation::new(
                "rg",
                vec![
                    Object::Real(color.0),
                    Object::Real(color.1),
                    Object::Real(color.2),
                ],
            ),
            Operation::new(
                "re",
                vec![
                    Object::Real(x as f32),
                    Object::Real(pdf_y as f32),
                    Object::Real(width as f32),
                    Object::Real(height as f32),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_produces_a_loadable_document() {
        let mut canvas = LopdfCanvas::new();
        canvas.add_page();
        canvas.draw_text(0, 50.0, 60.0, 12.0, false, Rgb::BLACK, "Possession clause found");
        canvas.add_page();
        canvas.fill_rect(1, 50.0, 40.0, 495.0, 28.0, Rgb::NAVY);

        let bytes = canvas.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn draw_on_missing_page_is_ignored() {
        let mut canvas = LopdfCanvas::new();
        canvas.draw_text(3, 0.0, 0.0, 10.0, false, Rgb::BLACK, "nowhere");
        assert_eq!(canvas.page_count(), 0);
    }

    #[test]
    fn non_ascii_text_is_replaced_not_dropped() {
        assert_eq!(sanitize_pdf_text("carpet area 62 m²"), b"carpet area 62 m?".to_vec());
        assert_eq!(sanitize_pdf_text("(a) clause"), b"\\(a\\) clause".to_vec());
        assert_eq!(sanitize_pdf_text("cut…"), b"cut...".to_vec());
    }
}
