//! Delimited-text parsing into flat records.
//!
//! Text is split into lines first and each line is split into fields on its
//! own, so a malformed line never affects its neighbours. The first line is
//! the header. Data lines whose field count differs from the header are
//! dropped rather than reported as errors; the caller gets the number of
//! dropped lines so it can decide whether to mention them.

use crate::record::{Catalog, Record};
use csv::{ReaderBuilder, StringRecord};
use log::debug;

/// Result of parsing a catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub records: Catalog,
    /// Lines discarded because their field count did not match the header.
    pub dropped: usize,
}

/// Parse comma-delimited text with a header line into records.
///
/// Commas inside `"..."` do not split a field. A line with an unbalanced `"`
/// is malformed. Every `"` is removed from the resulting values and
/// surrounding whitespace is trimmed. Blank lines are skipped. Empty input
/// yields an empty catalog.
pub fn parse_records(text: &str) -> ParseOutcome {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        // Ragged lines must reach the length check below instead of aborting the read.
        .flexible(true)
        .quote(b'"');

    let mut lines = text
        .trim()
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let headers: Vec<String> = match lines.next() {
        Some((_, line)) => match split_line(&builder, line) {
            Some(row) => row.iter().map(clean_value).collect(),
            None => {
                debug!("unreadable header line");
                return ParseOutcome::default();
            }
        },
        None => return ParseOutcome::default(),
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (index, line) in lines {
        let line_no = index + 1;
        let Some(row) = split_line(&builder, line) else {
            debug!("dropping line {line_no}: unbalanced quotes");
            dropped += 1;
            continue;
        };

        if row.len() != headers.len() {
            debug!(
                "dropping line {line_no}: expected {} fields, found {}",
                headers.len(),
                row.len()
            );
            dropped += 1;
            continue;
        }

        let record: Record = headers
            .iter()
            .map(String::as_str)
            .zip(row.iter().map(clean_value))
            .collect();
        records.push(record);
    }

    if dropped > 0 {
        debug!("parsed {} records, dropped {dropped}", records.len());
    }

    ParseOutcome {
        records: Catalog::new(records),
        dropped,
    }
}

/// Split one line into fields. `None` when a quote is left open.
fn split_line(builder: &ReaderBuilder, line: &str) -> Option<StringRecord> {
    if line.matches('"').count() % 2 != 0 {
        return None;
    }
    let mut reader = builder.from_reader(line.as_bytes());
    let mut row = StringRecord::new();
    match reader.read_record(&mut row) {
        Ok(true) => Some(row),
        Ok(false) => None,
        Err(e) => {
            debug!("csv reader rejected line: {e}");
            None
        }
    }
}

fn clean_value(raw: &str) -> String {
    raw.replace('"', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "id,title,author,year,category,type,tags,description,thumbnail_url,download_url";

    #[test]
    fn test_quoted_field_keeps_commas() {
        let text = format!(
            "{HEADER}\n1,Alpha,Jane Doe,2001,Fiction,Book,\"fantasy, adventure\",A tale,,http://x\n"
        );
        let outcome = parse_records(&text);

        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.records.len(), 1);
        let record = outcome.records.get(0).unwrap();
        assert_eq!(record.id(), "1");
        assert_eq!(record.tags(), "fantasy, adventure");
        assert_eq!(record.thumbnail_url(), "");
        assert_eq!(record.download_url(), "http://x");
    }

    #[test]
    fn test_mismatched_rows_are_dropped() {
        let text = "a,b,c\n1,2,3\n1,2\n4,5,6\n1,2,3,4\n";
        let outcome = parse_records(text);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.records.get(0).unwrap().get("a"), "1");
        assert_eq!(outcome.records.get(1).unwrap().get("c"), "6");
    }

    #[test]
    fn test_values_are_trimmed_and_unquoted() {
        let text = "name , note\n  padded  ,\"  quoted  \"\n";
        let outcome = parse_records(text);

        let record = outcome.records.get(0).unwrap();
        assert_eq!(record.get("name"), "padded");
        assert_eq!(record.get("note"), "quoted");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_records(""), ParseOutcome::default());
        assert_eq!(parse_records("   \n\n  "), ParseOutcome::default());
    }

    #[test]
    fn test_header_only() {
        let outcome = parse_records(HEADER);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "id,title\r\n1,One\r\n2,Two\r\n";
        let outcome = parse_records(text);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records.get(1).unwrap().title(), "Two");
    }

    #[test]
    fn test_stray_quote_drops_only_its_line() {
        let text = "id,title,author\n1,One,Ann\n2,\"Two,Bob\n3,Three,Cy\n4,Four,Di\n";
        let outcome = parse_records(text);

        let ids: Vec<_> = outcome.records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_quoted_field_across_lines_is_two_bad_lines() {
        let text = "id,title\n1,\"A\nB\"\n2,Two\n";
        let outcome = parse_records(text);

        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records.get(0).unwrap().title(), "Two");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let text = "id,title\n\n1,One\n   \n2,Two\n";
        let outcome = parse_records(text);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let text = "id\nc\na\nb\n";
        let ids: Vec<_> = parse_records(text)
            .records
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
