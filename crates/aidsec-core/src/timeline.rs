#![forbid(unsafe_code)]

//! Year-ordered views of a year-keyed [`Aggregate`].
//!
//! Scroll-reveal charts show the first `k` years and grow `k` as the reader
//! scrolls; [`TimeSeries::first`] produces those slices.

use crate::aggregate::Aggregate;
use crate::number;

/// Year-keyed tallies sorted by ascending year.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSeries {
    fields: Vec<String>,
    years: Vec<i64>,
    // One row per year, one column per field.
    rows: Vec<Vec<u64>>,
}

impl TimeSeries {
    /// Collect every integer key of `aggregate`; other keys are ignored.
    #[must_use]
    pub fn from_aggregate(aggregate: &Aggregate) -> Self {
        let mut points: Vec<(i64, Vec<u64>)> = aggregate
            .iter()
            .filter_map(|(key, tally)| {
                number::leading_int(key)
                    .filter(|year| year.to_string() == key)
                    .map(|year| (year, tally.values().to_vec()))
            })
            .collect();
        points.sort_by_key(|(year, _)| *year);
        let (years, rows) = points.into_iter().unzip();
        Self {
            fields: aggregate.fields().to_vec(),
            years,
            rows,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Distinct years, ascending.
    #[must_use]
    pub fn years(&self) -> &[i64] {
        &self.years
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Values of one field in year order; empty for an unknown field.
    #[must_use]
    pub fn series(&self, field: &str) -> Vec<u64> {
        match self.fields.iter().position(|f| f == field) {
            Some(idx) => self.rows.iter().map(|row| row[idx]).collect(),
            None => Vec::new(),
        }
    }

    /// The first `k` years (clamped to the series length).
    #[must_use]
    pub fn first(&self, k: usize) -> TimeSlice<'_> {
        TimeSlice {
            series: self,
            len: k.min(self.years.len()),
        }
    }

    /// The whole series as a slice.
    #[must_use]
    pub fn full(&self) -> TimeSlice<'_> {
        self.first(self.years.len())
    }
}

/// A year-prefix of a [`TimeSeries`].
#[derive(Debug, Clone, Copy)]
pub struct TimeSlice<'a> {
    series: &'a TimeSeries,
    len: usize,
}

impl TimeSlice<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn years(&self) -> &[i64] {
        &self.series.years[..self.len]
    }

    /// One field's values over the visible years.
    #[must_use]
    pub fn series(&self, field: &str) -> Vec<u64> {
        let mut values = self.series.series(field);
        values.truncate(self.len);
        values
    }

    /// Largest value of any of `fields` over the visible years.
    #[must_use]
    pub fn max_of(&self, fields: &[&str]) -> u64 {
        fields
            .iter()
            .flat_map(|field| self.series(field))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::TimeSeries;
    use crate::aggregate::AggregateBuilder;

    fn series() -> TimeSeries {
        let mut builder = AggregateBuilder::new(["incidents"]);
        builder.add("2021", &[5]);
        builder.add("2019", &[2]);
        builder.add("2020", &[9]);
        builder.add("Sudan", &[100]);
        TimeSeries::from_aggregate(&builder.finish())
    }

    #[test]
    fn years_are_sorted_ascending() {
        let ts = series();
        assert_eq!(ts.years(), &[2019, 2020, 2021]);
        assert_eq!(ts.series("incidents"), vec![2, 9, 5]);
        assert!(ts.series("missing").is_empty());
    }

    #[test]
    fn first_k_slices_and_clamps() {
        let ts = series();
        let slice = ts.first(2);
        assert_eq!(slice.years(), &[2019, 2020]);
        assert_eq!(slice.series("incidents"), vec![2, 9]);
        assert_eq!(slice.max_of(&["incidents"]), 9);
        assert_eq!(ts.first(10).len(), 3);
        assert!(ts.first(0).is_empty());
        assert_eq!(ts.first(0).max_of(&["incidents"]), 0);
    }
}
