use std::path::Path;

use crate::error::ExtractError;

/// Text extracted from a PDF, split the way the pipeline consumes it:
/// the first page feeds the field-extraction prompt, the full text feeds
/// the reference extractor.
#[derive(Debug, Clone)]
pub struct PdfText {
    pub first_page: String,
    pub full_text: String,
    pub page_count: usize,
}

/// Extract text from a PDF file.
///
/// Missing, corrupt, or encrypted files fail with [`ExtractError::Read`].
/// Image-only pages yield empty text; that is valid input downstream, not an
/// error (no OCR fallback).
pub fn extract_text(path: &Path) -> Result<PdfText, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let pages =
        pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| ExtractError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let first_page = pages.first().map(|p| clean_pdf_text(p)).unwrap_or_default();
    let full_text = clean_pdf_text(&pages.join("\n"));

    Ok(PdfText {
        first_page,
        full_text,
        page_count: pages.len(),
    })
}

/// Clean up extracted PDF text
fn clean_pdf_text(text: &str) -> String {
    text.lines()
        // Remove empty lines and whitespace-only lines
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        // Join with single newlines
        .collect::<Vec<_>>()
        .join("\n")
        // Normalize whitespace
        .replace("  ", " ")
        // Remove common PDF artifacts
        .replace("\u{0}", "")
        .replace("\u{FEFF}", "")
}
