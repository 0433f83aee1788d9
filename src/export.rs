use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ExtractError;
use crate::record::{DocumentRecord, COLUMNS};

/// Write all records to a JSON file (array of objects, pretty-printed).
/// Overwrites the file if present.
pub fn write_json(records: &[DocumentRecord], path: &Path) -> Result<(), ExtractError> {
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, records)
        .map_err(|e| write_error(path, io::Error::other(e)))?;

    Ok(())
}

/// Write all records to a CSV file with the fixed column order.
/// Overwrites the file if present.
///
/// List-valued columns: authors and keywords are joined with "; ";
/// references are serialized as a JSON array string, since citation strings
/// routinely contain both commas and semicolons.
pub fn write_csv(records: &[DocumentRecord], path: &Path) -> Result<(), ExtractError> {
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut writer = BufWriter::new(file);

    write_csv_to(records, &mut writer).map_err(|e| write_error(path, e))
}

fn write_csv_to<W: Write>(records: &[DocumentRecord], writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", COLUMNS.join(","))?;

    for record in records {
        let references_json =
            serde_json::to_string(&record.references).unwrap_or_else(|_| "[]".to_string());

        let cells = [
            quote(&record.file),
            quote(&record.id),
            quote_opt(record.title.as_deref()),
            quote(&record.authors.join("; ")),
            quote_opt(record.source.as_deref()),
            quote_opt(record.document_type.as_deref()),
            quote(&record.keywords.join("; ")),
            quote_opt(record.abstract_text.as_deref()),
            quote_opt(record.affiliations.as_deref()),
            quote_opt(record.corresponding_author.as_deref()),
            quote_opt(record.publication_year.as_deref()),
            quote_opt(record.volume.as_deref()),
            quote_opt(record.issue.as_deref()),
            number_opt(record.start_page.map(u64::from)),
            number_opt(record.end_page.map(u64::from)),
            quote_opt(record.doi.as_deref()),
            quote_opt(record.article_id.as_deref()),
            number_opt(record.citation_count),
            quote(&references_json),
        ];
        writeln!(writer, "{}", cells.join(","))?;
    }

    Ok(())
}

/// Write one plain-text file with the full extracted text of a PDF,
/// named after the PDF's stem. Returns the path written.
pub fn write_full_text(
    text: &str,
    pdf_file: &str,
    output_dir: &Path,
) -> Result<PathBuf, ExtractError> {
    let stem = Path::new(pdf_file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| pdf_file.to_string());
    let path = output_dir.join(format!("{}.txt", stem));

    std::fs::write(&path, text).map_err(|e| write_error(&path, e))?;
    Ok(path)
}

fn write_error(path: &Path, source: io::Error) -> ExtractError {
    ExtractError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape_csv(s))
}

fn quote_opt(s: Option<&str>) -> String {
    quote(s.unwrap_or(""))
}

fn number_opt(n: Option<u64>) -> String {
    n.map(|v| v.to_string()).unwrap_or_default()
}

/// Escape special characters for CSV
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_records() -> Vec<DocumentRecord> {
        let mut full = DocumentRecord::empty("paper.pdf");
        full.title = Some("A Study of Things".into());
        full.authors = vec!["Jane Doe".into(), "John Smith".into()];
        full.source = Some("Journal of Things".into());
        full.publication_year = Some("2020".into());
        full.start_page = Some(1);
        full.end_page = Some(12);
        full.doi = Some("10.1000/things.2020".into());
        full.citation_count = Some(3);
        full.references = vec!["[1] X. Y, 2020.".into(), "[2] Z. W, 2019.".into()];

        let empty = DocumentRecord::empty("broken.pdf");
        vec![full, empty]
    }

    // ── JSON ────────────────────────────────────────────────────────

    #[test]
    fn test_write_json_creates_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&sample_records(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["title"], "A Study of Things");
        // Null-field row keeps the uniform shape
        assert!(parsed[1]["title"].is_null());
        assert_eq!(parsed[1]["file"], "broken.pdf");
    }

    #[test]
    fn test_write_json_roundtrip_row_and_column_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rt.json");
        let records = sample_records();
        write_json(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reparsed: Vec<DocumentRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(reparsed.len(), records.len());
        for value in serde_json::from_str::<Vec<serde_json::Value>>(&content).unwrap() {
            assert_eq!(value.as_object().unwrap().len(), COLUMNS.len());
        }
    }

    #[test]
    fn test_write_json_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&sample_records(), &path).unwrap();
        write_json(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }

    #[test]
    fn test_write_json_unwritable_path_is_write_error() {
        let err = write_json(&[], Path::new("/nonexistent/dir/out.json")).unwrap_err();
        assert!(matches!(err, ExtractError::Write { .. }));
    }

    // ── CSV ─────────────────────────────────────────────────────────

    #[test]
    fn test_write_csv_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample_records(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], COLUMNS.join(","));
        assert_eq!(lines.len(), 3); // header + 2 records
        assert!(lines[1].contains("\"A Study of Things\""));
        assert!(lines[1].contains("\"Jane Doe; John Smith\""));
    }

    #[test]
    fn test_write_csv_references_as_json_array_cell() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample_records(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // JSON array string with CSV-escaped quotes
        assert!(content.contains("\"[\"\"[1] X. Y, 2020.\"\",\"\"[2] Z. W, 2019.\"\"]\""));
    }

    #[test]
    fn test_write_csv_special_characters() {
        let mut record = DocumentRecord::empty("q.pdf");
        record.title = Some("A \"quoted\" title".into());

        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&[record], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"\"quoted\"\"")); // CSV double-quote escaping
    }

    #[test]
    fn test_write_csv_same_column_count_every_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample_records(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // Quoted commas make naive splitting wrong; count unquoted commas
        for line in content.lines() {
            let mut in_quotes = false;
            let mut commas = 0;
            let mut chars = line.chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        if in_quotes && chars.peek() == Some(&'"') {
                            chars.next(); // escaped quote
                        } else {
                            in_quotes = !in_quotes;
                        }
                    }
                    ',' if !in_quotes => commas += 1,
                    _ => {}
                }
            }
            assert_eq!(commas, COLUMNS.len() - 1, "line: {}", line);
        }
    }

    // ── Full text ───────────────────────────────────────────────────

    #[test]
    fn test_write_full_text_uses_pdf_stem() {
        let dir = tempdir().unwrap();
        let path = write_full_text("full text here", "paper.pdf", dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "paper.txt");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "full text here");
    }

    // ── Escape ──────────────────────────────────────────────────────

    #[test]
    fn test_escape_csv_double_quotes() {
        assert_eq!(escape_csv("test\"quote"), "test\"\"quote");
        assert_eq!(escape_csv("no special"), "no special");
    }
}
