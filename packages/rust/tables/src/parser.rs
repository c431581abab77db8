//! Line-walking parser for document tables embedded in markdown.
//!
//! A table is a contiguous run of lines starting with `|`. The first line
//! is the header row and the second must be a pure separator row, or the
//! whole block is rejected. Column resolution is name-based and
//! case-insensitive: `document` and `author` must match exactly, while the
//! description and period columns match by substring.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crossweave_shared::Document;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome of parsing a markdown document for tables.
///
/// Parsing never fails; malformed blocks contribute zero documents and a
/// diagnostic entry instead.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Documents extracted from well-formed table rows, in input order.
    pub documents: Vec<Document>,
    /// Table blocks that were rejected wholesale.
    pub skipped: Vec<SkippedTable>,
    /// Data rows dropped individually (no parseable day range, or fewer
    /// cells than header columns).
    pub rows_dropped: usize,
}

/// Diagnostic record for a rejected table block.
#[derive(Debug, Clone)]
pub struct SkippedTable {
    /// 1-based line number where the block starts.
    pub line: usize,
    /// Section heading active at the block, if any.
    pub heading: Option<String>,
    pub reason: SkipReason,
}

/// Why a table block produced no documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than two lines: no room for a header and separator.
    TooShort,
    /// The second line is not an all-dash separator row.
    NoSeparatorRow,
    /// The header lacks one of the required columns.
    MissingRequiredColumns,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TooShort => "too short",
            Self::NoSeparatorRow => "no separator row",
            Self::MissingRequiredColumns => "missing required columns",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `## Heading` through `###### Heading`.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,6})\s+(.*)").expect("heading regex"));

/// Matches a single separator cell: optional colons around three-plus dashes.
static SEPARATOR_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-{3,}:?$").expect("separator cell regex"));

/// Matches a markdown link `[text](url)` anywhere in a cell.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex"));

/// Matches `day N` / `days N-M` anywhere in the period cell.
static DAY_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)days?\s*(\d+)\s*(?:-\s*(\d+))?").expect("day range regex"));

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse all document tables in a markdown string.
///
/// Section headings (`##` and deeper) set the `category` of documents in
/// subsequent tables. Non-table content is ignored.
pub fn parse_document_tables(text: &str) -> ParseReport {
    let lines: Vec<&str> = text.lines().collect();
    let mut report = ParseReport::default();
    let mut current_heading: Option<String> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(caps) = HEADING_RE.captures(line) {
            current_heading = Some(caps[2].trim().to_string());
            i += 1;
            continue;
        }

        if line.trim_start().starts_with('|') {
            let block_start = i;
            let mut table_lines: Vec<&str> = Vec::new();
            while i < lines.len() && lines[i].trim_start().starts_with('|') {
                table_lines.push(lines[i]);
                i += 1;
            }
            parse_single_table(
                &table_lines,
                block_start + 1,
                current_heading.as_deref(),
                &mut report,
            );
            continue;
        }

        i += 1;
    }

    debug!(
        documents = report.documents.len(),
        skipped_tables = report.skipped.len(),
        rows_dropped = report.rows_dropped,
        "document tables parsed"
    );

    report
}

/// Parse one contiguous table block into documents, or record why it was
/// rejected.
fn parse_single_table(
    table_lines: &[&str],
    start_line: usize,
    heading: Option<&str>,
    report: &mut ParseReport,
) {
    let mut skip = |reason: SkipReason| {
        debug!(line = start_line, %reason, "skipping table block");
        report.skipped.push(SkippedTable {
            line: start_line,
            heading: heading.map(String::from),
            reason,
        });
    };

    if table_lines.len() < 2 {
        skip(SkipReason::TooShort);
        return;
    }

    let header_cells = split_row(table_lines[0]);
    let separator_cells = split_row(table_lines[1]);
    if !is_separator_row(&separator_cells) {
        skip(SkipReason::NoSeparatorRow);
        return;
    }

    let columns: Vec<String> = header_cells.iter().map(|c| c.to_lowercase()).collect();
    let doc_idx = columns.iter().position(|c| c == "document");
    let author_idx = columns.iter().position(|c| c == "author");
    let desc_idx = columns.iter().position(|c| c.contains("description"));
    let period_idx = columns
        .iter()
        .position(|c| c.contains("period") || c.contains("example"));

    let (Some(doc_idx), Some(author_idx), Some(desc_idx), Some(period_idx)) =
        (doc_idx, author_idx, desc_idx, period_idx)
    else {
        skip(SkipReason::MissingRequiredColumns);
        return;
    };

    for row_line in &table_lines[2..] {
        let cells = split_row(row_line);
        if cells.len() < columns.len() {
            report.rows_dropped += 1;
            continue;
        }
        // Malformed input sometimes repeats the separator mid-table.
        if is_separator_row(&cells) {
            continue;
        }

        let (name, link) = parse_markdown_link(&cells[doc_idx]);
        let period_cell = &cells[period_idx];

        let Some((start_day, end_day)) = parse_day_range(period_cell) else {
            report.rows_dropped += 1;
            continue;
        };

        report.documents.push(Document {
            name,
            description: cells[desc_idx].clone(),
            author: cells[author_idx].clone(),
            period_text: period_cell.clone(),
            start_day,
            end_day,
            link,
            category: heading.map(String::from),
        });
    }
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

/// Split a `| a | b |` line into trimmed cell strings.
fn split_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|part| part.trim().to_string())
        .collect()
}

/// True when every cell is an all-dash separator cell.
fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|cell| SEPARATOR_CELL_RE.is_match(cell))
}

/// Extract `(name, link)` from a cell that may hold a markdown link.
fn parse_markdown_link(cell: &str) -> (String, Option<String>) {
    match LINK_RE.captures(cell) {
        Some(caps) => (
            caps[1].trim().to_string(),
            Some(caps[2].trim().to_string()),
        ),
        None => (cell.trim().to_string(), None),
    }
}

/// Extract an inclusive day range from free text such as `Days 5-10` or
/// `Day 7`. Swaps the bounds when they arrive reversed.
fn parse_day_range(text: &str) -> Option<(i64, i64)> {
    let caps = DAY_RANGE_RE.captures(text)?;
    let start: i64 = caps[1].parse().ok()?;
    let end: i64 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => start,
    };
    if start > end {
        return Some((end, start));
    }
    Some((start, end))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_single_row() {
        let text = "\
| Document | Description | Author | Period |
|----------|-------------|--------|--------|
| [Foo](http://x) | desc | Bob | Days 5-10 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents.len(), 1);

        let doc = &report.documents[0];
        assert_eq!(doc.name, "Foo");
        assert_eq!(doc.link.as_deref(), Some("http://x"));
        assert_eq!(doc.description, "desc");
        assert_eq!(doc.author, "Bob");
        assert_eq!(doc.start_day, 5);
        assert_eq!(doc.end_day, 10);
    }

    #[test]
    fn missing_author_column_yields_no_documents() {
        let text = "\
| Document | Description | Period |
|----------|-------------|--------|
| Foo | desc | Days 1-3 |
";
        let report = parse_document_tables(text);
        assert!(report.documents.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingRequiredColumns);
    }

    #[test]
    fn missing_separator_row_rejects_table() {
        let text = "\
| Document | Description | Author | Period |
| Foo | desc | Bob | Days 1-3 |
";
        let report = parse_document_tables(text);
        assert!(report.documents.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::NoSeparatorRow);
    }

    #[test]
    fn heading_sets_category() {
        let text = "\
## Retrospectives

| Document | Description | Author | Period |
|---|---|---|---|
| One | d | A | Day 1 |

### Deep Dives

| Document | Description | Author | Period |
|---|---|---|---|
| Two | d | B | Day 2 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.documents[0].category.as_deref(), Some("Retrospectives"));
        assert_eq!(report.documents[1].category.as_deref(), Some("Deep Dives"));
    }

    #[test]
    fn plain_cell_without_link() {
        let text = "\
| Document | Description | Author | Period |
|---|---|---|---|
|  Plain name  | d | A | Day 4 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents[0].name, "Plain name");
        assert!(report.documents[0].link.is_none());
    }

    #[test]
    fn reversed_range_is_swapped() {
        let text = "\
| Document | Description | Author | Period |
|---|---|---|---|
| Foo | d | A | Days 10-5 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents[0].start_day, 5);
        assert_eq!(report.documents[0].end_day, 10);
    }

    #[test]
    fn row_without_day_range_is_dropped() {
        let text = "\
| Document | Description | Author | Period |
|---|---|---|---|
| Foo | d | A | sometime in spring |
| Bar | d | B | Day 3 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].name, "Bar");
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn stray_separator_mid_table_is_skipped() {
        let text = "\
| Document | Description | Author | Period |
|---|---|---|---|
| Foo | d | A | Day 1 |
|---|---|---|---|
| Bar | d | B | Day 2 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.rows_dropped, 0);
    }

    #[test]
    fn example_column_accepted_for_period() {
        let text = "\
| Document | Description | Author | Example Days |
|---|---|---|---|
| Foo | d | A | days 2-4 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].start_day, 2);
        assert_eq!(report.documents[0].end_day, 4);
    }

    #[test]
    fn column_names_case_insensitive() {
        let text = "\
| DOCUMENT | DESCRIPTION | AUTHOR | PERIOD |
|---|---|---|---|
| Foo | d | A | Day 9 |
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents.len(), 1);
    }

    #[test]
    fn prose_between_tables_is_ignored() {
        let text = "\
Intro paragraph.

| Document | Description | Author | Period |
|---|---|---|---|
| Foo | d | A | Day 1 |

Some notes that are not a table.
- a list
";
        let report = parse_document_tables(text);
        assert_eq!(report.documents.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn day_range_variants() {
        assert_eq!(parse_day_range("Days 5-10"), Some((5, 10)));
        assert_eq!(parse_day_range("day 7"), Some((7, 7)));
        assert_eq!(parse_day_range("DAYS  12 - 14"), Some((12, 14)));
        assert_eq!(parse_day_range("week 2"), None);
    }

    #[test]
    fn separator_cells_with_alignment_colons() {
        let cells = split_row("|:---|----:|:---:|");
        assert!(is_separator_row(&cells));
        let cells = split_row("|--|--|");
        assert!(!is_separator_row(&cells));
    }

    #[test]
    fn parse_markdown_fixture() {
        let text = std::fs::read_to_string("../../../fixtures/markdown/documents.fixture.md")
            .expect("read fixture");
        let report = parse_document_tables(&text);

        assert_eq!(report.documents.len(), 4);
        assert_eq!(report.documents[0].name, "Kickoff Retrospective");
        assert_eq!(
            report.documents[0].link.as_deref(),
            Some("https://example.com/kickoff")
        );
        assert_eq!(
            report.documents[0].category.as_deref(),
            Some("Retrospectives")
        );
        // The malformed table in the fixture is rejected, not fatal.
        assert_eq!(report.skipped.len(), 1);
        // One row has no day range.
        assert_eq!(report.rows_dropped, 1);
    }
}
