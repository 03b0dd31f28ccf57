//! Thin wrapper over printpdf for tabular A4 documents.
//!
//! Reports and bills share the same layout vocabulary: a centered title,
//! left-aligned lines, and rows of text at fixed column offsets. This keeps
//! the printpdf plumbing (pages, layers, fonts, the bottom-left origin) in
//! one place.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::{AppError, AppResult};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;

/// Incremental writer for a multi-page A4 document
pub struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    cursor_y: f32,
}

impl PdfWriter {
    pub fn new(title: &str) -> AppResult<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Report(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Report(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            font_bold,
            cursor_y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    /// Centered heading in bold
    pub fn heading(&mut self, text: &str, size: f32) {
        // Helvetica averages roughly half the point size in width
        let approx_width_mm = text.len() as f32 * size * 0.5 * 0.3528;
        let x = ((PAGE_WIDTH_MM - approx_width_mm) / 2.0).max(MARGIN_MM);
        self.cursor_y -= size * 0.5;
        self.layer
            .use_text(text, size, Mm(x), Mm(self.cursor_y), &self.font_bold);
        self.cursor_y -= size * 0.35;
    }

    /// Left-aligned line in the regular face
    pub fn line(&mut self, text: &str, size: f32) {
        self.advance(size);
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.cursor_y), &self.font);
    }

    /// Left-aligned line in bold
    pub fn bold_line(&mut self, text: &str, size: f32) {
        self.advance(size);
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.cursor_y), &self.font_bold);
    }

    /// One row of cells at fixed column offsets (mm from the left margin)
    pub fn row(&mut self, cells: &[(f32, &str)], size: f32, bold: bool) {
        self.advance(size);
        let font = if bold { &self.font_bold } else { &self.font };
        for (offset, text) in cells {
            self.layer.use_text(
                *text,
                size,
                Mm(MARGIN_MM + offset),
                Mm(self.cursor_y),
                font,
            );
        }
    }

    /// Vertical gap
    pub fn space(&mut self, mm: f32) {
        self.cursor_y -= mm;
    }

    fn advance(&mut self, size: f32) {
        let line_height = size * 0.45;
        if self.cursor_y - line_height < MARGIN_MM {
            self.new_page();
        }
        self.cursor_y -= line_height;
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    /// Write the document out, creating parent directories as needed
    pub fn save(self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Report(format!("create {}: {e}", parent.display())))?;
        }
        let file = File::create(path)
            .map_err(|e| AppError::Report(format!("create {}: {e}", path.display())))?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| AppError::Report(e.to_string()))?;
        Ok(())
    }
}
