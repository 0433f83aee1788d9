/// System prompt for extracting bibliographic fields from a first page
pub const FIELD_EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a bibliographic metadata extractor. You are given the text of the first page of an academic document (delimited by ```). Extract the metadata fields listed below.

Fields:
- "title": the title of the document
- "authors": the author names, in order, as a JSON array of strings
- "source": the name of the journal, book, or conference
- "document_type": e.g. Research Paper, Book, Conference Paper
- "keywords": keywords provided by the authors, usually 3-5 terms, as a JSON array of strings; do not confuse them with the title or abstract
- "abstract": the abstract of the document
- "affiliations": institutional affiliations of the authors, with leading superscripts or footnote markers removed, separated by semicolons
- "corresponding_author": name and email of the corresponding author
- "publication_year": the year of publication
- "volume": the volume number of the source journal or book, if any
- "issue": the issue number of the source journal, if applicable
- "doi": the Digital Object Identifier (DOI) of the document
- "article_id": an additional unique identifier if available, e.g. Web of Science or arXiv ID

Format your output as a single JSON object with exactly those keys:
{
    "title": "...",
    "authors": ["..."],
    "source": "...",
    "document_type": "...",
    "keywords": ["..."],
    "abstract": "...",
    "affiliations": "...",
    "corresponding_author": "...",
    "publication_year": "...",
    "volume": "...",
    "issue": "...",
    "doi": "...",
    "article_id": "..."
}

Rules:
- Use null for any field that is not present in the text
- Copy values from the text; do not invent or complete them
- Do not include any explanation
- Output ONLY valid JSON, no other text"#;

/// User prompt template for field extraction
pub fn field_extraction_user_prompt(first_page: &str) -> String {
    format!("first page: ```{}```\n\noutput: ", first_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_page_text() {
        let prompt = field_extraction_user_prompt("Title: Foo");
        assert!(prompt.contains("```Title: Foo```"));
    }

    #[test]
    fn test_system_prompt_enumerates_all_fields() {
        for key in [
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
            "doi",
            "article_id",
        ] {
            assert!(
                FIELD_EXTRACTION_SYSTEM_PROMPT.contains(&format!("\"{}\"", key)),
                "prompt missing field: {}",
                key
            );
        }
    }
}
