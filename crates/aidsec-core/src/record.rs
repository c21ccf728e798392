#![forbid(unsafe_code)]

//! Parsed CSV rows.
//!
//! A [`Record`] is an ordered mapping from header name to raw string value.
//! Records share one header list per [`Dataset`] and are never mutated after
//! parsing.

use std::sync::Arc;

/// One CSV data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    headers: Arc<[String]>,
    values: Box<[String]>,
}

impl Record {
    /// Build a record. `values` must have exactly one entry per header.
    pub(crate) fn new(headers: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(headers.len(), values.len());
        Self {
            headers,
            values: values.into_boxed_slice(),
        }
    }

    /// Value of the first column named exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|header| header == name)
            .map(|idx| self.values[idx].as_str())
    }

    /// Value at a column index.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Header names, in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// `(header, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// All records parsed from one CSV text, plus row-level parse statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Arc<[String]>,
    records: Vec<Record>,
    /// Rows dropped because they had fewer fields than headers (or failed to read).
    pub skipped_rows: usize,
    /// Rows that carried more fields than headers; extra fields were dropped.
    pub truncated_rows: usize,
}

impl Dataset {
    pub(crate) fn new(
        headers: Arc<[String]>,
        records: Vec<Record>,
        skipped_rows: usize,
        truncated_rows: usize,
    ) -> Self {
        Self {
            headers,
            records,
            skipped_rows,
            truncated_rows,
        }
    }

    /// Build a dataset directly from header names and rows.
    ///
    /// Rows shorter than the header list are skipped, longer rows are cut,
    /// matching [`parse_csv`](crate::parse_csv).
    #[must_use]
    pub fn from_rows<H, R, V>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = V>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let headers: Arc<[String]> = headers.into_iter().map(Into::into).collect();
        let mut records = Vec::new();
        let mut skipped = 0;
        let mut truncated = 0;
        for row in rows {
            let mut values: Vec<String> = row.into_iter().map(Into::into).collect();
            if values.len() < headers.len() {
                skipped += 1;
                continue;
            }
            if values.len() > headers.len() {
                values.truncate(headers.len());
                truncated += 1;
            }
            records.push(Record::new(Arc::clone(&headers), values));
        }
        Self::new(headers, records, skipped, truncated)
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
