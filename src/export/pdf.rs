use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{bail, Context, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument, PdfDocumentReference};

// US letter.
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MM_PER_PT: f32 = 0.352_778;

#[derive(Debug, Clone, Copy)]
pub struct PdfOptions {
    pub font_pt: f32,
    pub margin_pt: f32,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            font_pt: 12.0,
            margin_pt: 40.0,
        }
    }
}

/// Renders note content to a PDF: fixed margins, fixed monospaced font, one
/// note line per text line, a fresh page when the current one fills. No
/// smarter pagination or wrapping.
pub fn write_pdf(title: &str, content: &str, path: &Path, options: PdfOptions) -> Result<()> {
    if content.trim().is_empty() {
        bail!("note content is empty");
    }

    let margin_mm = options.margin_pt * MM_PER_PT;
    let line_height_mm = options.font_pt * 1.2 * MM_PER_PT;

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "text");
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .context("embedding builtin monospace font")?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut cursor_mm = PAGE_HEIGHT_MM - margin_mm;

    for line in content.lines() {
        if cursor_mm < margin_mm {
            layer = add_page(&doc);
            cursor_mm = PAGE_HEIGHT_MM - margin_mm;
        }
        layer.use_text(line, options.font_pt, Mm(margin_mm), Mm(cursor_mm), &font);
        cursor_mm -= line_height_mm;
    }

    let file = File::create(path)
        .with_context(|| format!("creating document {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .context("writing PDF document")?;
    Ok(())
}

fn add_page(doc: &PdfDocumentReference) -> printpdf::PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "text");
    doc.get_page(page).get_layer(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_a_document_for_multiline_content() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("note.pdf");
        write_pdf("Test Note", "line one\nline two\nline three", &path, PdfOptions::default())?;
        let bytes = std::fs::read(&path)?;
        assert!(bytes.starts_with(b"%PDF"));
        Ok(())
    }

    #[test]
    fn long_content_spills_onto_extra_pages() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("long.pdf");
        let content = (0..200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        write_pdf("Long Note", &content, &path, PdfOptions::default())?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn empty_content_is_rejected() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("empty.pdf");
        assert!(write_pdf("Empty", "  \n ", &path, PdfOptions::default()).is_err());
        assert!(!path.exists());
        Ok(())
    }
}
