use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enrich::EnrichedFields;
use crate::llm::ParsedFields;

/// Column order for tabular output. Must stay in sync with the serialized
/// shape of [`DocumentRecord`].
pub const COLUMNS: [&str; 19] = [
    "file",
    "id",
    "title",
    "authors",
    "source",
    "document_type",
    "keywords",
    "abstract",
    "affiliations",
    "corresponding_author",
    "publication_year",
    "volume",
    "issue",
    "start_page",
    "end_page",
    "doi",
    "article_id",
    "citation_count",
    "references",
];

/// Bibliographic metadata extracted from one PDF.
///
/// The field set is fixed and known in advance; unresolved fields are kept as
/// null/empty rather than omitted, so every output row has the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub file: String,
    pub id: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    /// Venue: journal, book, or conference name.
    pub source: Option<String>,
    pub document_type: Option<String>,
    pub keywords: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub affiliations: Option<String>,
    pub corresponding_author: Option<String>,
    pub publication_year: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub doi: Option<String>,
    /// Additional unique identifier (e.g. Web of Science or arXiv ID).
    pub article_id: Option<String>,
    pub citation_count: Option<u64>,
    pub references: Vec<String>,
}

impl DocumentRecord {
    /// A record for `file` with every metadata field null.
    pub fn empty(file: &str) -> Self {
        Self {
            file: file.to_string(),
            id: Uuid::new_v4().to_string(),
            title: None,
            authors: Vec::new(),
            source: None,
            document_type: None,
            keywords: Vec::new(),
            abstract_text: None,
            affiliations: None,
            corresponding_author: None,
            publication_year: None,
            volume: None,
            issue: None,
            start_page: None,
            end_page: None,
            doi: None,
            article_id: None,
            citation_count: None,
            references: Vec::new(),
        }
    }

    /// Overlay the fields the model extracted from the first page.
    pub fn apply_fields(&mut self, fields: ParsedFields) {
        self.title = fields.title;
        self.authors = fields.authors;
        self.source = fields.source;
        self.document_type = fields.document_type;
        self.keywords = fields.keywords;
        self.abstract_text = fields.abstract_text;
        self.affiliations = fields.affiliations;
        self.corresponding_author = fields.corresponding_author;
        self.publication_year = fields.publication_year;
        self.volume = fields.volume;
        self.issue = fields.issue;
        self.doi = fields.doi;
        self.article_id = fields.article_id;
    }

    /// Merge enrichment results, filling only fields that are still null.
    pub fn apply_enrichment(&mut self, enriched: &EnrichedFields) {
        if self.source.is_none() {
            self.source = enriched.venue.clone();
        }
        if self.doi.is_none() {
            self.doi = enriched.doi.clone();
        }
        if self.publication_year.is_none() {
            self.publication_year = enriched.publication_year.clone();
        }
        if self.citation_count.is_none() {
            self.citation_count = enriched.citation_count;
        }
    }
}
