use thiserror::Error;

/// Supplementary metadata from the Crossref works API.
#[derive(Debug, Clone, Default)]
pub struct EnrichedFields {
    pub venue: Option<String>,
    pub doi: Option<String>,
    pub publication_year: Option<String>,
    pub citation_count: Option<u64>,
}

/// Enrichment is best-effort: the caller decides whether to merge or ignore.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("crossref request failed: {0}")]
    Network(String),

    #[error("no matching work found")]
    NotFound,
}

/// Query Crossref by title and return supplementary fields for the first
/// result whose title matches loosely.
pub async fn lookup(client: &reqwest::Client, title: &str) -> Result<EnrichedFields, LookupError> {
    let response = client
        .get("https://api.crossref.org/works")
        .query(&[("query.title", title), ("rows", "5")])
        .header("User-Agent", "bibcite/0.1 (academic metadata extraction)")
        .timeout(std::time::Duration::from_secs(20))
        .send()
        .await
        .map_err(|e| LookupError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Network(format!("HTTP {}", status)));
    }

    let data: serde_json::Value = response
        .json()
        .await
        .map_err(|e| LookupError::Network(e.to_string()))?;

    let items = data["message"]["items"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    for item in items {
        let found_title = item["title"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(|v| v.as_str())
            .unwrap_or("");

        if titles_match(title, found_title) {
            return Ok(enriched_from_item(&item));
        }
    }

    Err(LookupError::NotFound)
}

fn enriched_from_item(item: &serde_json::Value) -> EnrichedFields {
    let venue = item["container-title"]
        .as_array()
        .and_then(|a| a.first())
        .and_then(|v| v.as_str())
        .map(String::from);

    let doi = item["DOI"].as_str().map(String::from);

    // "issued": { "date-parts": [[2020, 5, 1]] }
    let publication_year = item["issued"]["date-parts"]
        .as_array()
        .and_then(|a| a.first())
        .and_then(|parts| parts.as_array())
        .and_then(|parts| parts.first())
        .and_then(|y| y.as_i64())
        .map(|y| y.to_string());

    let citation_count = item["is-referenced-by-count"].as_u64();

    EnrichedFields {
        venue,
        doi,
        publication_year,
        citation_count,
    }
}

/// Loose title comparison: case- and punctuation-insensitive equality, or
/// one normalized title containing the other (handles subtitle truncation).
fn titles_match(query: &str, found: &str) -> bool {
    let a = normalize_title(query);
    let b = normalize_title(found);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(
            normalize_title("Deep  Learning: A Survey!"),
            "deep learning a survey"
        );
    }

    #[test]
    fn test_titles_match_exact() {
        assert!(titles_match("Deep Learning", "deep learning"));
    }

    #[test]
    fn test_titles_match_punctuation_insensitive() {
        assert!(titles_match("Attention Is All You Need.", "Attention is all you need"));
    }

    #[test]
    fn test_titles_match_subtitle_containment() {
        assert!(titles_match(
            "Deep Learning",
            "Deep Learning: Methods and Applications"
        ));
    }

    #[test]
    fn test_titles_do_not_match_unrelated() {
        assert!(!titles_match("Deep Learning", "Shallow Parsing of Legal Text"));
    }

    #[test]
    fn test_titles_empty_never_match() {
        assert!(!titles_match("", ""));
        assert!(!titles_match("Something", "!!!"));
    }

    #[test]
    fn test_enriched_from_item_parses_crossref_shape() {
        let item = serde_json::json!({
            "title": ["Deep Learning"],
            "container-title": ["Nature"],
            "DOI": "10.1038/nature14539",
            "issued": { "date-parts": [[2015, 5]] },
            "is-referenced-by-count": 50000
        });
        let enriched = enriched_from_item(&item);
        assert_eq!(enriched.venue.as_deref(), Some("Nature"));
        assert_eq!(enriched.doi.as_deref(), Some("10.1038/nature14539"));
        assert_eq!(enriched.publication_year.as_deref(), Some("2015"));
        assert_eq!(enriched.citation_count, Some(50000));
    }

    #[test]
    fn test_enriched_from_item_missing_fields() {
        let item = serde_json::json!({ "title": ["Bare Minimum"] });
        let enriched = enriched_from_item(&item);
        assert!(enriched.venue.is_none());
        assert!(enriched.doi.is_none());
        assert!(enriched.publication_year.is_none());
        assert!(enriched.citation_count.is_none());
    }
}
