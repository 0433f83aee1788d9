//! Defensive parsing of LLM field-extraction responses.
//!
//! LLM responses are unpredictable — they may wrap JSON in markdown fences,
//! include explanatory text before/after, return numbers where strings are
//! expected, or return a comma-separated string where an array was asked for.
//! This module turns raw model output into a tagged [`ParsedResponse`] so
//! downstream code pattern-matches instead of probing defensively.
//!
//! Fields are converted one at a time from the parsed JSON object, so a
//! single field in an odd shape degrades to null on its own instead of
//! invalidating the whole response.

use serde_json::{Map, Value};

/// Result of parsing a model response: either a set of cleaned fields, or
/// the raw response when no recognizable field structure was found.
#[derive(Debug, Clone)]
pub enum ParsedResponse {
    Fields(ParsedFields),
    Unparseable { raw: String },
}

/// Bibliographic fields as reported by the model, after cleaning.
///
/// Every field is optional; sentinel values like "unknown" or "n/a" are
/// mapped to `None`, and list fields accept either a JSON array or a
/// comma/semicolon-separated string.
#[derive(Debug, Clone, Default)]
pub struct ParsedFields {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub source: Option<String>,
    pub document_type: Option<String>,
    pub keywords: Vec<String>,
    pub abstract_text: Option<String>,
    pub affiliations: Option<String>,
    pub corresponding_author: Option<String>,
    pub publication_year: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub doi: Option<String>,
    pub article_id: Option<String>,
}

fn fields_from_object(obj: &Map<String, Value>) -> ParsedFields {
    ParsedFields {
        title: scalar_field(obj.get("title")),
        authors: list_field(obj.get("authors")),
        source: scalar_field(obj.get("source")),
        document_type: scalar_field(obj.get("document_type")),
        keywords: list_field(obj.get("keywords")),
        abstract_text: scalar_field(obj.get("abstract")),
        affiliations: scalar_field(obj.get("affiliations")),
        corresponding_author: scalar_field(obj.get("corresponding_author")),
        publication_year: scalar_field(obj.get("publication_year")),
        volume: scalar_field(obj.get("volume")),
        issue: scalar_field(obj.get("issue")),
        doi: scalar_field(obj.get("doi")),
        article_id: scalar_field(obj.get("article_id")),
    }
}

fn scalar_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => clean_field(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(item_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        other => item_text(other),
    }
}

fn list_field(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    match value {
        Value::String(s) => split_name_list(s),
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items.iter().filter_map(item_text).collect(),
        _ => Vec::new(),
    }
}

/// Best-effort text of a single value. Objects yield their first string
/// value (models sometimes return `{"name": "..."}` entries); booleans and
/// nulls carry no usable text.
fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean_field(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(m) => m.values().find_map(|v| v.as_str()).and_then(clean_field),
        _ => None,
    }
}

/// Split a comma- or semicolon-separated list the model returned as a string.
fn split_name_list(s: &str) -> Vec<String> {
    let separator = if s.contains(';') { ';' } else { ',' };
    s.split(separator)
        .filter_map(clean_field)
        .collect()
}

/// Trim a field value and map sentinel "absent" answers to `None`.
fn clean_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    let sentinel = matches!(
        lowered.as_str(),
        "null" | "none" | "unknown" | "n/a" | "na" | "not available" | "not provided"
            | "not specified" | "not found"
    );
    if sentinel {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a raw LLM response into a tagged [`ParsedResponse`].
///
/// Handles clean JSON objects, JSON wrapped in markdown code fences, and
/// JSON with leading/trailing prose. A response with no recognizable JSON
/// object at all yields `Unparseable` carrying the raw text.
pub fn parse_fields_json(response: &str) -> ParsedResponse {
    let json_str = extract_json_object(response);

    match serde_json::from_str::<Value>(&json_str) {
        Ok(Value::Object(obj)) => ParsedResponse::Fields(fields_from_object(&obj)),
        Ok(_) => {
            tracing::debug!("response JSON is not an object");
            ParsedResponse::Unparseable {
                raw: response.to_string(),
            }
        }
        Err(e) => {
            tracing::debug!("field JSON did not parse: {}", e);
            ParsedResponse::Unparseable {
                raw: response.to_string(),
            }
        }
    }
}

/// Extract a JSON object from a response that may contain extra text.
///
/// Tries the following strategies in order:
/// 1. Strip markdown code fences (` ```json ... ``` `)
/// 2. If the (cleaned) text starts with `{`, find matching `}`
/// 3. Search for the first `{` in the text and find its matching `}`
/// 4. Fall back to returning the original text as-is
pub fn extract_json_object(response: &str) -> String {
    let response = response.trim();

    // Strip markdown code fences if present
    let stripped = strip_code_fences(response);

    // Strategy 1: starts with {
    if stripped.starts_with('{')
        && let Some(end) = find_matching_brace(stripped)
    {
        return stripped[..=end].to_string();
    }

    // Strategy 2: find first { anywhere
    if let Some(start) = stripped.find('{')
        && let Some(end) = find_matching_brace(&stripped[start..])
    {
        return stripped[start..=start + end].to_string();
    }

    // Fallback
    stripped.to_string()
}

/// Strip markdown code fences (``` or ```json) from around content.
fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();

    // Handle ```json\n...\n``` or ```\n...\n```
    if s.starts_with("```") {
        // Find the end of the opening fence line
        if let Some(first_newline) = s.find('\n') {
            let inner = &s[first_newline + 1..];
            // Find closing fence
            if let Some(closing) = inner.rfind("```") {
                return inner[..closing].trim();
            }
        }
    }

    s
}

/// Find the index of the `}` that matches the first `{` in the string.
///
/// Returns `None` if braces are unbalanced.
fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ─── Tests ──────────────────────────────────────────────────────────────────
