#![forbid(unsafe_code)]

//! Word frequencies for incident descriptions.

use crate::aggregate::{Aggregate, AggregateBuilder};
use crate::concept::{self, Bindings};
use crate::number;
use crate::record::Dataset;

/// Field name of the word-count tally.
pub const COUNT_FIELD: &str = "count";

/// Words dropped before counting.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "was",
    "that", "as", "this", "also", "other", "along", "were", "who", "their", "they", "from",
    "after", "when", "while",
];

const STRIPPED: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')', '\'', '"',
];

/// Tokens of one description, in order, after normalization and filtering.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect();
    cleaned
        .split(' ')
        .filter(|word| keep(word))
        .map(str::to_string)
        .collect()
}

fn keep(word: &str) -> bool {
    word.chars().count() > 2
        && !STOP_WORDS.contains(&word)
        && !number::leading_int(word).is_some_and(|n| n != 0)
}

/// Count words across the dataset's details column.
#[must_use]
pub fn word_counts(dataset: &Dataset, bindings: &Bindings) -> Aggregate {
    let mut builder = AggregateBuilder::new([COUNT_FIELD]);
    let Some(column) = bindings.first(concept::DETAILS) else {
        tracing::warn!(target: "aidsec.words", "no details column");
        return builder.finish();
    };
    for record in dataset.records() {
        let Some(text) = record.value(column) else {
            continue;
        };
        for word in tokenize(text) {
            builder.add(&word, &[1]);
        }
    }
    builder.finish()
}
