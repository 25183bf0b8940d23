//! SQL extraction from generated model text.
//!
//! Layered heuristics applied in a fixed order, each narrowing the text
//! toward a single candidate statement. Extraction never fails: when nothing
//! resembling SQL is found, the first line is returned as-is and execution
//! fails naturally at the database layer. Known limitations are intentional
//! and kept: there is no defense against multi-statement input and no check
//! that the extracted text parses as SQL.

use once_cell::sync::Lazy;
use regex::Regex;

/// Text after an instruction-style "### Response:" marker.
static RESPONSE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)###\s*Response:\s*(.*)").unwrap());

/// Contents of a fenced code block, with or without a language tag.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)```(?:sql)?\s*(.*?)```").unwrap());

/// Line beginning with a SQL keyword.
static LEADING_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(SELECT|INSERT|UPDATE|DELETE|WITH)\b").unwrap());

/// A SELECT ... FROM statement anywhere in the text, optionally followed by
/// further clauses.
static SELECT_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(SELECT\s+.*?\s+FROM\s+\w+(?:\s+(?:WHERE|JOIN|GROUP BY|ORDER BY|LIMIT|HAVING)[^;]*)?)")
        .unwrap()
});

/// Extract the first SQL query from generated model text.
pub fn extract_sql(text: &str) -> String {
    // 1. Keep only text after a "### Response:" marker, if present.
    let text = match RESPONSE_MARKER.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => text,
    };

    // 2. Keep only the contents of a fenced code block, if present.
    let text = match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => text,
    };

    // 3. If the first line starts with a SQL keyword, use it.
    let first_line = text.trim().lines().next().unwrap_or("").trim();
    if LEADING_KEYWORD.is_match(first_line) {
        return finalize(truncate_union(first_line));
    }

    // 4. Otherwise look for a SELECT statement anywhere in the text.
    if let Some(m) = SELECT_STATEMENT.captures(text).and_then(|c| c.get(1)) {
        return finalize(truncate_union(m.as_str().trim()));
    }

    // 5. Best-effort fallback: the first line, stripped.
    if first_line.is_empty() {
        text.trim().to_string()
    } else {
        finalize(first_line)
    }
}

/// Stop at a UNION clause so only the first statement survives.
fn truncate_union(sql: &str) -> &str {
    match sql.to_ascii_uppercase().find(" UNION ") {
        Some(pos) if pos > 0 => sql[..pos].trim_end(),
        _ => sql,
    }
}

/// Strip trailing semicolons and surrounding whitespace.
fn finalize(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim().to_string()
}
