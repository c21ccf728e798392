#![forbid(unsafe_code)]

//! Grouped aggregation over a [`Dataset`].
//!
//! An [`AggregateSpec`] names a grouping concept, the numeric fields to
//! accumulate, and optional row filters. [`aggregate`] folds every record into
//! an [`Aggregate`]: a map from group key to a fixed-shape [`Tally`], plus a
//! synthetic [`ALL_KEY`] total computed once when the fold finishes.
//!
//! Dirty rows never abort a fold. A blank key skips the row; a non-numeric
//! cell contributes 0.

use std::cmp::Ordering;
use std::sync::Arc;

use ahash::AHashMap;

use crate::concept::{self, Bindings, ConceptTable};
use crate::number;
use crate::record::{Dataset, Record};

/// Key of the whole-dataset total. Reserved: data rows may not use it.
pub const ALL_KEY: &str = "All";

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Accumulated values for one group, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tally(Vec<u64>);

impl Tally {
    #[must_use]
    pub fn zeros(width: usize) -> Self {
        Self(vec![0; width])
    }

    /// Value of the field at `index`; 0 past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> u64 {
        self.0.get(index).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.0
    }

    /// Sum across all fields.
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    fn add(&mut self, values: &[u64]) {
        for (slot, value) in self.0.iter_mut().zip(values) {
            *slot = slot.saturating_add(*value);
        }
    }
}

/// `numerator / denominator × 100`, or 0 when the denominator is 0.
#[must_use]
pub fn percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// What partitions the records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBy {
    /// Text key taken from the concept's first bound column.
    Concept(String),
    /// Integer year taken from the concept's first bound column; rows
    /// without a leading integer are skipped.
    Year(String),
}

impl GroupBy {
    fn concept(&self) -> &str {
        match self {
            Self::Concept(name) | Self::Year(name) => name,
        }
    }
}

/// Where a field's per-row contribution comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Sum of every column bound to the concept.
    Sum(String),
    /// 1 per record.
    Count,
}

/// One accumulated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    pub field: String,
    pub source: ValueSource,
}

impl ValueSpec {
    #[must_use]
    pub fn sum(field: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            source: ValueSource::Sum(concept.into()),
        }
    }

    #[must_use]
    pub fn count(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            source: ValueSource::Count,
        }
    }
}

/// Row predicate applied before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Keep rows whose concept value has a leading integer `<= max`.
    AtMost { concept: String, max: i64 },
    /// Keep rows whose normalized concept value equals `value`.
    Equals { concept: String, value: String },
}

impl RowFilter {
    /// Keep rows up to and including `year`.
    #[must_use]
    pub fn year_at_most(year: i64) -> Self {
        Self::AtMost {
            concept: concept::YEAR.to_string(),
            max: year,
        }
    }

    #[must_use]
    pub fn equals(concept: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            concept: concept.into(),
            value: value.into(),
        }
    }

    fn keeps(&self, record: &Record, bindings: &Bindings) -> bool {
        match self {
            Self::AtMost { concept, max } => first_value(record, bindings, concept)
                .and_then(number::leading_int)
                .is_some_and(|value| value <= *max),
            Self::Equals { concept, value } => first_value(record, bindings, concept)
                .is_some_and(|raw| normalize_key(raw) == value),
        }
    }
}

/// Full description of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    pub group: GroupBy,
    pub values: Vec<ValueSpec>,
    pub filters: Vec<RowFilter>,
}

impl AggregateSpec {
    #[must_use]
    pub fn by(group: GroupBy) -> Self {
        Self {
            group,
            values: Vec::new(),
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn value(mut self, value: ValueSpec) -> Self {
        self.values.push(value);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.values.iter().map(|v| v.field.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

/// Counters describing what a fold kept and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateStats {
    /// Records offered to the fold.
    pub rows_seen: usize,
    /// Records removed by a [`RowFilter`].
    pub rows_filtered: usize,
    /// Records whose key was empty after trimming.
    pub skipped_blank: usize,
    /// Year-keyed records whose key had no leading integer.
    pub skipped_invalid: usize,
    /// Records whose key collided with [`ALL_KEY`].
    pub skipped_reserved: usize,
}

/// Incremental fold into an [`Aggregate`].
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    fields: Arc<[String]>,
    entries: Vec<(String, Tally)>,
    index: AHashMap<String, usize>,
    stats: AggregateStats,
}

impl AggregateBuilder {
    #[must_use]
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            entries: Vec::new(),
            index: AHashMap::new(),
            stats: AggregateStats::default(),
        }
    }

    /// Add one contribution for `key`.
    ///
    /// The key is normalized first; blank and reserved keys are rejected and
    /// counted. Returns whether the contribution was kept.
    pub fn add(&mut self, key: &str, values: &[u64]) -> bool {
        let key = normalize_key(key);
        if key.is_empty() {
            self.stats.skipped_blank += 1;
            return false;
        }
        if key == ALL_KEY {
            self.stats.skipped_reserved += 1;
            return false;
        }
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.entries
                    .push((key.to_string(), Tally::zeros(self.fields.len())));
                self.index.insert(key.to_string(), slot);
                slot
            }
        };
        self.entries[slot].1.add(values);
        true
    }

    /// Seal the fold and compute the [`ALL_KEY`] total.
    #[must_use]
    pub fn finish(self) -> Aggregate {
        let mut all = Tally::zeros(self.fields.len());
        for (_, tally) in &self.entries {
            all.add(tally.values());
        }
        Aggregate {
            fields: self.fields,
            entries: self.entries,
            index: self.index,
            all,
            stats: self.stats,
        }
    }
}

/// Fold a dataset using the concept table to find columns.
#[must_use]
pub fn aggregate(dataset: &Dataset, table: &ConceptTable, spec: &AggregateSpec) -> Aggregate {
    let bindings = table.bind(dataset.headers());
    aggregate_with(dataset, &bindings, spec)
}

/// Fold a dataset with pre-resolved bindings.
#[must_use]
pub fn aggregate_with(dataset: &Dataset, bindings: &Bindings, spec: &AggregateSpec) -> Aggregate {
    let mut builder = AggregateBuilder::new(spec.fields());
    let group_column = bindings.first(spec.group.concept());
    if group_column.is_none() {
        tracing::warn!(
            target: "aidsec.aggregate",
            concept = spec.group.concept(),
            "group concept has no matching column"
        );
    }

    let mut row_values = vec![0u64; spec.values.len()];
    for record in dataset.records() {
        builder.stats.rows_seen += 1;
        if !spec.filters.iter().all(|f| f.keeps(record, bindings)) {
            builder.stats.rows_filtered += 1;
            continue;
        }
        let raw_key = group_column.and_then(|idx| record.value(idx)).unwrap_or("");
        let year_key;
        let key = match &spec.group {
            GroupBy::Concept(_) => raw_key,
            GroupBy::Year(_) => match number::leading_int(normalize_key(raw_key)) {
                Some(year) => {
                    year_key = year.to_string();
                    year_key.as_str()
                }
                None => {
                    if normalize_key(raw_key).is_empty() {
                        builder.stats.skipped_blank += 1;
                    } else {
                        builder.stats.skipped_invalid += 1;
                    }
                    continue;
                }
            },
        };
        for (slot, value) in row_values.iter_mut().zip(&spec.values) {
            *slot = match &value.source {
                ValueSource::Count => 1,
                ValueSource::Sum(concept) => bindings
                    .columns(concept)
                    .iter()
                    .filter_map(|idx| record.value(*idx))
                    .fold(0u64, |acc, raw| acc.saturating_add(number::count(raw))),
            };
        }
        builder.add(key, &row_values);
    }

    let aggregate = builder.finish();
    tracing::debug!(
        target: "aidsec.aggregate",
        groups = aggregate.len(),
        rows_seen = aggregate.stats.rows_seen,
        rows_filtered = aggregate.stats.rows_filtered,
        skipped_blank = aggregate.stats.skipped_blank,
        "aggregation finished"
    );
    aggregate
}

/// Trim whitespace and surrounding quote characters from a key.
#[must_use]
pub fn normalize_key(raw: &str) -> &str {
    raw.trim().trim_matches(['"', '\'']).trim()
}

fn first_value<'r>(record: &'r Record, bindings: &Bindings, concept: &str) -> Option<&'r str> {
    bindings.first(concept).and_then(|idx| record.value(idx))
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Grouped tallies plus the synthetic [`ALL_KEY`] total. Read-only once built.
#[derive(Debug, Clone)]
pub struct Aggregate {
    fields: Arc<[String]>,
    entries: Vec<(String, Tally)>,
    index: AHashMap<String, usize>,
    all: Tally,
    stats: AggregateStats,
}

impl Aggregate {
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Tally for a key; [`ALL_KEY`] returns the whole-dataset total.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Tally> {
        if key == ALL_KEY {
            return Some(&self.all);
        }
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// One field of one key.
    #[must_use]
    pub fn value(&self, key: &str, field: &str) -> Option<u64> {
        let idx = self.field_index(field)?;
        self.get(key).map(|tally| tally.get(idx))
    }

    /// Whole-dataset total.
    #[must_use]
    pub fn all(&self) -> &Tally {
        &self.all
    }

    /// Whether `key` is a real group or [`ALL_KEY`].
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        key == ALL_KEY || self.index.contains_key(key)
    }

    /// Number of real groups (excluding [`ALL_KEY`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Real groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tally)> {
        self.entries.iter().map(|(key, tally)| (key.as_str(), tally))
    }

    /// Dropdown order: [`ALL_KEY`] first, then case-insensitive alphabetical.
    #[must_use]
    pub fn keys_sorted(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_by(|a, b| compare_labels(a, b));
        keys.insert(0, ALL_KEY);
        keys
    }

    /// The `n` largest groups by `field`, descending. Ties keep first-seen order.
    #[must_use]
    pub fn top_n(&self, field: &str, n: usize) -> Vec<(&str, u64)> {
        let Some(idx) = self.field_index(field) else {
            return Vec::new();
        };
        let mut ranked: Vec<(&str, u64)> = self
            .entries
            .iter()
            .map(|(key, tally)| (key.as_str(), tally.get(idx)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// `numerator / denominator × 100` for one key; 0 when the denominator is 0.
    #[must_use]
    pub fn percentage(&self, key: &str, numerator: &str, denominator: &str) -> Option<f64> {
        let num = self.field_index(numerator)?;
        let den = self.field_index(denominator)?;
        self.get(key).map(|t| percent(t.get(num), t.get(den)))
    }

    /// [`percentage`](Self::percentage) for every real group, first-seen order.
    #[must_use]
    pub fn percentages(&self, numerator: &str, denominator: &str) -> Vec<(&str, f64)> {
        let (Some(num), Some(den)) = (self.field_index(numerator), self.field_index(denominator))
        else {
            return Vec::new();
        };
        self.entries
            .iter()
            .map(|(key, t)| (key.as_str(), percent(t.get(num), t.get(den))))
            .collect()
    }
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::{COUNTRY, TOTAL, VERIFIED};

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_rows(
            headers.iter().copied(),
            rows.iter().map(|row| row.iter().copied()),
        )
    }

    #[test]
    fn blank_and_quoted_keys_are_normalized() {
        let data = dataset(
            &["Country"],
            &[&["Kenya"], &[""], &["  "], &["\"Kenya\""], &["' '"]],
        );
        let agg = aggregate(
            &data,
            &ConceptTable::security_incidents(),
            &AggregateSpec::by(GroupBy::Concept(COUNTRY.into())).value(ValueSpec::count("count")),
        );
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.value("Kenya", "count"), Some(2));
        assert_eq!(agg.stats().skipped_blank, 3);
    }

    #[test]
    fn all_key_is_reserved_and_sums_real_keys() {
        let mut builder = AggregateBuilder::new(["a", "b"]);
        builder.add("x", &[1, 2]);
        builder.add("y", &[3, 4]);
        assert!(!builder.add(ALL_KEY, &[100, 100]));
        let agg = builder.finish();
        assert_eq!(agg.all().values(), &[4, 6]);
        assert_eq!(agg.get(ALL_KEY), Some(agg.all()));
        assert_eq!(agg.len(), 2);
        assert_eq!(agg.stats().skipped_reserved, 1);
    }

    #[test]
    fn empty_aggregate_has_zero_total() {
        let agg = AggregateBuilder::new(["a"]).finish();
        assert!(agg.is_empty());
        assert_eq!(agg.all().values(), &[0]);
        assert_eq!(agg.keys_sorted(), vec![ALL_KEY]);
    }

    #[test]
    fn non_numeric_cells_contribute_zero() {
        let data = dataset(
            &["Country", "Verified", "Total"],
            &[&["Chad", "x", "3"], &["Chad", "1", ""], &["Chad", "2", "4 reports"]],
        );
        let spec = AggregateSpec::by(GroupBy::Concept(COUNTRY.into()))
            .value(ValueSpec::sum("verified", VERIFIED))
            .value(ValueSpec::sum("total", TOTAL));
        let agg = aggregate(&data, &ConceptTable::security_incidents(), &spec);
        assert_eq!(agg.value("Chad", "verified"), Some(3));
        assert_eq!(agg.value("Chad", "total"), Some(7));
    }

    #[test]
    fn percentage_guards_zero_denominator() {
        let mut builder = AggregateBuilder::new(["verified", "total"]);
        builder.add("Chad", &[1, 4]);
        builder.add("Mali", &[3, 0]);
        let agg = builder.finish();
        assert_eq!(agg.percentage("Chad", "verified", "total"), Some(25.0));
        assert_eq!(agg.percentage("Mali", "verified", "total"), Some(0.0));
        assert_eq!(agg.percentage("Peru", "verified", "total"), None);
        assert_eq!(
            agg.percentages("verified", "total"),
            vec![("Chad", 25.0), ("Mali", 0.0)]
        );
    }

    #[test]
    fn top_n_breaks_ties_by_first_seen() {
        let mut builder = AggregateBuilder::new(["count"]);
        for key in ["b", "a", "c", "a", "b", "d"] {
            builder.add(key, &[1]);
        }
        let agg = builder.finish();
        assert_eq!(agg.top_n("count", 3), vec![("b", 2), ("a", 2), ("c", 1)]);
        assert!(agg.top_n("missing", 3).is_empty());
    }

    #[test]
    fn keys_sorted_puts_all_first_then_alphabetical() {
        let mut builder = AggregateBuilder::new(["n"]);
        for key in ["sudan", "Afghanistan", "Mali"] {
            builder.add(key, &[1]);
        }
        assert_eq!(
            builder.finish().keys_sorted(),
            vec![ALL_KEY, "Afghanistan", "Mali", "sudan"]
        );
    }

    #[test]
    fn filters_drop_rows_before_grouping() {
        let data = dataset(
            &["Country", "Year"],
            &[&["Sudan", "2020"], &["Chad", "2020"], &["Sudan", "2025"], &["Sudan", "n/a"]],
        );
        let spec = AggregateSpec::by(GroupBy::Concept(COUNTRY.into()))
            .value(ValueSpec::count("count"))
            .filter(RowFilter::equals(COUNTRY, "Sudan"))
            .filter(RowFilter::year_at_most(2024));
        let agg = aggregate(&data, &ConceptTable::security_incidents(), &spec);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.value("Sudan", "count"), Some(1));
        assert_eq!(agg.stats().rows_filtered, 3);
    }

    #[test]
    fn year_grouping_skips_non_years() {
        let data = dataset(&["Year"], &[&["2020"], &["2020.0"], &["unknown"], &[""]]);
        let agg = aggregate(
            &data,
            &ConceptTable::security_incidents(),
            &AggregateSpec::by(GroupBy::Year(crate::concept::YEAR.into()))
                .value(ValueSpec::count("incidents")),
        );
        assert_eq!(agg.value("2020", "incidents"), Some(2));
        assert_eq!(agg.stats().skipped_invalid, 1);
        assert_eq!(agg.stats().skipped_blank, 1);
    }

    #[test]
    fn missing_group_column_yields_empty_aggregate() {
        let data = dataset(&["Region"], &[&["East"]]);
        let agg = aggregate(
            &data,
            &ConceptTable::security_incidents(),
            &AggregateSpec::by(GroupBy::Concept(COUNTRY.into())).value(ValueSpec::count("n")),
        );
        assert!(agg.is_empty());
    }
}
