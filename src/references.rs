use anyhow::Result;
use regex::Regex;

/// Headings recognized as the start of a bibliography when the config does
/// not override them.
pub const DEFAULT_HEADINGS: [&str; 5] = [
    "References",
    "Bibliography",
    "Works Cited",
    "Literature Cited",
    "Reference List",
];

/// Locates the references section of a document and splits it into
/// individual citation strings.
///
/// The heading list is configurable; segmentation tries `[n]` markers first,
/// then `n.` markers, then falls back to one entry per line. A text with no
/// recognizable heading yields an empty list, which is not an error.
pub struct ReferenceExtractor {
    heading: Regex,
    end_markers: Vec<Regex>,
    bracketed: Regex,
    numbered: Regex,
}

impl ReferenceExtractor {
    pub fn new(headings: &[String]) -> Result<Self> {
        let escaped: Vec<String> = headings.iter().map(|h| regex::escape(h)).collect();
        let heading = Regex::new(&format!(r"(?i)\b(?:{})\b", escaped.join("|")))?;

        // Section headers and copyright notices that follow the bibliography
        let end_markers = vec![
            Regex::new(r"(?im)^\s*(?:Appendix|Acknowledge?ments?|Tables|Figures)\b")?,
            Regex::new(r"©\s*\d{4}")?,
        ];

        Ok(Self {
            heading,
            end_markers,
            bracketed: Regex::new(r"(?m)^\s*\[\d+\]")?,
            numbered: Regex::new(r"(?m)^\s*\d{1,3}\.\s")?,
        })
    }

    /// Extract citation strings from the full document text.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let Some(m) = self.heading.find(text) else {
            return Vec::new();
        };

        let tail = &text[m.end()..];

        // Truncate at the earliest trailing-section marker
        let mut end = tail.len();
        for marker in &self.end_markers {
            if let Some(em) = marker.find(tail) {
                end = end.min(em.start());
            }
        }

        let section = tail[..end].trim();
        if section.is_empty() {
            return Vec::new();
        }

        self.segment(section)
    }

    fn segment(&self, section: &str) -> Vec<String> {
        if let Some(entries) = split_at_markers(&self.bracketed, section) {
            return entries;
        }
        if let Some(entries) = split_at_markers(&self.numbered, section) {
            return entries;
        }
        // Newline-delimited fallback
        section
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        let headings: Vec<String> = DEFAULT_HEADINGS.into_iter().map(String::from).collect();
        // Patterns are static and known-good
        Self::new(&headings).expect("default reference patterns must compile")
    }
}

/// Split `section` at each marker match, one entry per marker. Returns `None`
/// when the marker never occurs so the caller can try the next heuristic.
fn split_at_markers(marker: &Regex, section: &str) -> Option<Vec<String>> {
    let starts: Vec<usize> = marker.find_iter(section).map(|m| m.start()).collect();
    if starts.is_empty() {
        return None;
    }

    let mut entries = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(section.len());
        let entry = collapse_whitespace(&section[start..end]);
        if !entry.is_empty() {
            entries.push(entry);
        }
    }
    Some(entries)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_heading_returns_empty() {
        let extractor = ReferenceExtractor::default();
        let text = "This paper has no bibliography section at all.";
        assert!(extractor.extract(text).is_empty());
    }

    #[test]
    fn test_empty_text_returns_empty() {
        let extractor = ReferenceExtractor::default();
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn test_single_bracketed_entry() {
        let extractor = ReferenceExtractor::default();
        let text = "Body text.\nReferences\n[1] X. Y, 2020.";
        assert_eq!(extractor.extract(text), vec!["[1] X. Y, 2020."]);
    }

    #[test]
    fn test_bracketed_entries_split_and_joined() {
        let extractor = ReferenceExtractor::default();
        let text = "Intro.\nReferences\n\
            [1] A. Author, Some Title,\nJournal, 2019.\n\
            [2] B. Writer, Other Title, 2021.";
        let refs = extractor.extract(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], "[1] A. Author, Some Title, Journal, 2019.");
        assert!(refs[1].starts_with("[2]"));
    }

    #[test]
    fn test_numbered_entries() {
        let extractor = ReferenceExtractor::default();
        let text = "Bibliography\n1. First citation, 2018.\n2. Second citation, 2019.";
        let refs = extractor.extract(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], "1. First citation, 2018.");
        assert_eq!(refs[1], "2. Second citation, 2019.");
    }

    #[test]
    fn test_newline_delimited_fallback() {
        let extractor = ReferenceExtractor::default();
        let text = "References\nAuthor A, Title A, 2010\nAuthor B, Title B, 2011";
        let refs = extractor.extract(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], "Author A, Title A, 2010");
    }

    #[test]
    fn test_truncates_at_appendix() {
        let extractor = ReferenceExtractor::default();
        let text = "References\n[1] Cited work, 2020.\nAppendix A\nExtra material here.";
        let refs = extractor.extract(text);
        assert_eq!(refs, vec!["[1] Cited work, 2020."]);
    }

    #[test]
    fn test_truncates_at_copyright() {
        let extractor = ReferenceExtractor::default();
        let text = "References\n[1] Cited work, 2020.\n© 2021 Some Publisher";
        let refs = extractor.extract(text);
        assert_eq!(refs, vec!["[1] Cited work, 2020."]);
    }

    #[test]
    fn test_alternate_headings() {
        let extractor = ReferenceExtractor::default();
        for heading in ["Works Cited", "Literature Cited", "Reference List", "BIBLIOGRAPHY"] {
            let text = format!("Body.\n{}\n[1] Entry, 2020.", heading);
            assert_eq!(extractor.extract(&text).len(), 1, "heading: {}", heading);
        }
    }

    #[test]
    fn test_custom_headings() {
        let extractor = ReferenceExtractor::new(&["Sources".to_string()]).unwrap();
        let text = "Body.\nSources\n[1] Entry, 2020.";
        assert_eq!(extractor.extract(text).len(), 1);
        // Default heading no longer recognized
        let text = "Body.\nReferences\n[1] Entry, 2020.";
        assert!(extractor.extract(text).is_empty());
    }

    #[test]
    fn test_heading_with_nothing_after() {
        let extractor = ReferenceExtractor::default();
        assert!(extractor.extract("References\n").is_empty());
    }
}
