#![forbid(unsafe_code)]

//! Core: CSV records, concept resolution, and grouped aggregation.
//!
//! # Role in aidsec
//! `aidsec-core` is the data layer. Every chart on the page starts from the
//! same security-incidents CSV; this crate turns that text into records,
//! resolves logical concepts ("year", "male victims") to physical columns,
//! and folds the records into per-key tallies that chart adapters slice.
//!
//! # Primary responsibilities
//! - **Dataset / Record**: RFC4180 parsing with a header row, immutable rows.
//! - **ConceptTable**: fuzzy header matching (exact, substring, regex) with
//!   explicit non-overlapping groups.
//! - **Aggregate**: grouped tallies with a synthetic `All` total, top-N,
//!   percentage views, and year time series.
//! - **Words**: description tokenization for the word cloud.
//!
//! # How it fits in the system
//! `aidsec-runtime` loads a [`Dataset`] once per source path and hands it to
//! widgets; widgets run an [`AggregateSpec`] and pass slices to the render
//! contract in `aidsec-render`. Nothing in this crate performs I/O.

pub mod aggregate;
pub mod concept;
pub mod number;
pub mod parse;
pub mod record;
pub mod timeline;
pub mod words;

pub use aggregate::{
    ALL_KEY, Aggregate, AggregateBuilder, AggregateSpec, AggregateStats, GroupBy, RowFilter,
    Tally, ValueSpec, aggregate, aggregate_with,
};
pub use concept::{Bindings, Concept, ConceptError, ConceptTable, Matcher, Take};
pub use parse::parse_csv;
pub use record::{Dataset, Record};
pub use timeline::{TimeSeries, TimeSlice};
