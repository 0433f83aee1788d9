use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::enrich::{self, LookupError};
use crate::error::ExtractError;
use crate::export;
use crate::llm::{LlmClient, ParsedResponse};
use crate::pdf;
use crate::record::DocumentRecord;
use crate::references::ReferenceExtractor;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub enrich: bool,
    pub save_full_text: bool,
}

/// Per-document extraction pipeline: PDF text → model fields → references →
/// optional Crossref enrichment.
///
/// `process_file` never fails: per-document errors (unreadable PDF,
/// unparseable response, network) are logged with the filename and the record
/// keeps its null fields, so one bad file does not halt the batch.
pub struct Pipeline {
    llm: LlmClient,
    references: ReferenceExtractor,
    http: reqwest::Client,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(llm: LlmClient, references: ReferenceExtractor, options: PipelineOptions) -> Self {
        Self {
            llm,
            references,
            http: reqwest::Client::new(),
            options,
        }
    }

    /// Run the full pipeline for one PDF, returning its record.
    pub async fn process_file(&self, path: &Path, output_dir: &Path) -> DocumentRecord {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mut record = DocumentRecord::empty(&file_name);

        let text = match pdf::extract_text(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %file_name, "{}", err);
                return record;
            }
        };

        if text.page_count > 0 {
            record.start_page = Some(1);
            record.end_page = Some(text.page_count as u32);
        }

        if self.options.save_full_text {
            if let Err(err) = export::write_full_text(&text.full_text, &file_name, output_dir) {
                warn!(file = %file_name, "{}", err);
            }
        }

        // An image-only or empty PDF yields empty text; skip the completion
        // call and leave the fields null.
        if text.first_page.is_empty() {
            debug!(file = %file_name, "no extractable first-page text");
        } else {
            match self.llm.extract_fields(&text.first_page).await {
                Ok(ParsedResponse::Fields(fields)) => record.apply_fields(fields),
                Ok(ParsedResponse::Unparseable { raw }) => {
                    let err = ExtractError::Parse { raw };
                    warn!(file = %file_name, "{}", err);
                }
                Err(err) => {
                    warn!(file = %file_name, "{}", err);
                }
            }
        }

        record.references = self.references.extract(&text.full_text);

        if self.options.enrich
            && let Some(title) = record.title.clone()
        {
            match enrich::lookup(&self.http, &title).await {
                Ok(enriched) => record.apply_enrichment(&enriched),
                Err(LookupError::NotFound) => {
                    debug!(file = %file_name, "no Crossref match for title")
                }
                Err(err) => warn!(file = %file_name, "{}", err),
            }
        }

        record
    }
}

/// List the PDF files directly inside `dir`, in directory-listing order.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("input path is not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_pdf(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
