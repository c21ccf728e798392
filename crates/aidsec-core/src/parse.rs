#![forbid(unsafe_code)]

//! RFC4180 row parser.
//!
//! Every widget goes through [`parse_csv`]; quoted fields may contain the
//! delimiter, doubled quotes, and line breaks. Parsing never fails: malformed
//! rows are skipped and counted on the returned [`Dataset`].

use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::record::{Dataset, Record};

const BOM: char = '\u{feff}';

/// Parse CSV text whose first row holds the field names.
///
/// Empty input, or input with only a header row, yields an empty dataset.
#[must_use]
pub fn parse_csv(text: &str) -> Dataset {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    let headers: Arc<[String]> = match reader.headers() {
        Ok(row) => row
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                if idx == 0 {
                    name.trim_start_matches(BOM).to_string()
                } else {
                    name.to_string()
                }
            })
            .collect(),
        Err(err) => {
            tracing::warn!(target: "aidsec.parse", error = %err, "unreadable header row");
            return Dataset::default();
        }
    };
    if headers.is_empty() {
        return Dataset::default();
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut truncated = 0usize;
    let mut row = StringRecord::new();
    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                tracing::debug!(target: "aidsec.parse", error = %err, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        }
        if is_blank(&row) {
            continue;
        }
        if row.len() < headers.len() {
            skipped += 1;
            continue;
        }
        if row.len() > headers.len() {
            truncated += 1;
        }
        let values = row
            .iter()
            .take(headers.len())
            .map(str::to_string)
            .collect();
        records.push(Record::new(Arc::clone(&headers), values));
    }

    if skipped > 0 || truncated > 0 {
        tracing::debug!(
            target: "aidsec.parse",
            records = records.len(),
            skipped,
            truncated,
            "parsed csv with malformed rows"
        );
    }
    Dataset::new(headers, records, skipped, truncated)
}

// A line holding only whitespace reads as a single blank field.
fn is_blank(row: &StringRecord) -> bool {
    row.len() == 1 && row.get(0).is_some_and(|field| field.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::parse_csv;

    #[test]
    fn empty_and_header_only_inputs_are_empty() {
        assert!(parse_csv("").is_empty());
        let header_only = parse_csv("Country,Year\n");
        assert!(header_only.is_empty());
        assert_eq!(header_only.headers(), ["Country", "Year"]);
    }

    #[test]
    fn quoted_fields_keep_commas_quotes_and_newlines() {
        let text = "Country,Details\n\"Congo, DR\",\"He said \"\"stop\"\"\nthen left\"\n";
        let data = parse_csv(text);
        assert_eq!(data.len(), 1);
        let record = &data.records()[0];
        assert_eq!(record.get("Country"), Some("Congo, DR"));
        assert_eq!(record.get("Details"), Some("He said \"stop\"\nthen left"));
    }

    #[test]
    fn short_rows_are_skipped_not_padded() {
        let data = parse_csv("a,b,c\n1,2,3\n4,5\n6,7,8\n");
        assert_eq!(data.len(), 2);
        assert_eq!(data.skipped_rows, 1);
        assert_eq!(data.records()[1].get("a"), Some("6"));
    }

    #[test]
    fn long_rows_keep_leading_fields() {
        let data = parse_csv("a,b\n1,2,3\n");
        assert_eq!(data.len(), 1);
        assert_eq!(data.truncated_rows, 1);
        assert_eq!(data.records()[0].len(), 2);
    }

    #[test]
    fn blank_lines_and_bom_are_ignored() {
        let data = parse_csv("\u{feff}Country,Year\n\nChad,2020\n   \nMali,2021\n");
        assert_eq!(data.headers()[0], "Country");
        assert_eq!(data.len(), 2);
        assert_eq!(data.skipped_rows, 0);
    }

    #[test]
    fn crlf_line_endings_parse() {
        let data = parse_csv("Country,Year\r\nChad,2020\r\n");
        assert_eq!(data.records()[0].get("Year"), Some("2020"));
    }
}
