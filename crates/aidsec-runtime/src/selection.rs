#![forbid(unsafe_code)]

//! Dropdown selection over aggregate keys.

use aidsec_core::{ALL_KEY, Aggregate};

/// Label shown for the [`ALL_KEY`] option.
pub const ALL_LABEL: &str = "All Countries";

/// Result of [`DropdownSelection::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The current key moved; the widget should redraw.
    Changed,
    /// The key was already selected.
    Unchanged,
    /// The key is not among the options; the selection is untouched.
    Unknown,
}

/// Option list plus current selection. Defaults to [`ALL_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownSelection {
    options: Vec<String>,
    current: usize,
}

impl DropdownSelection {
    /// Options are `All` followed by the aggregate keys, case-insensitively
    /// sorted.
    #[must_use]
    pub fn from_aggregate(aggregate: &Aggregate) -> Self {
        let options = aggregate
            .keys_sorted()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            options,
            current: 0,
        }
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// `(value, label)` pairs in display order.
    #[must_use]
    pub fn labeled_options(&self) -> Vec<(&str, &str)> {
        self.options
            .iter()
            .map(|key| (key.as_str(), option_label(key)))
            .collect()
    }

    #[must_use]
    pub fn current(&self) -> &str {
        self.options
            .get(self.current)
            .map_or(ALL_KEY, String::as_str)
    }

    pub fn select(&mut self, key: &str) -> SelectOutcome {
        match self.options.iter().position(|option| option == key) {
            Some(idx) if idx == self.current => SelectOutcome::Unchanged,
            Some(idx) => {
                self.current = idx;
                SelectOutcome::Changed
            }
            None => SelectOutcome::Unknown,
        }
    }
}

/// Display label for a dropdown key.
#[must_use]
pub fn option_label(key: &str) -> &str {
    if key == ALL_KEY { ALL_LABEL } else { key }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidsec_core::AggregateBuilder;

    fn sample() -> Aggregate {
        let mut builder = AggregateBuilder::new(["n"]);
        builder.add("sudan", &[1]);
        builder.add("Afghanistan", &[2]);
        builder.add("Kenya", &[3]);
        builder.finish()
    }

    #[test]
    fn options_start_with_all_then_case_insensitive() {
        let selection = DropdownSelection::from_aggregate(&sample());
        assert_eq!(selection.options(), ["All", "Afghanistan", "Kenya", "sudan"]);
        assert_eq!(selection.current(), ALL_KEY);
        assert_eq!(selection.labeled_options()[0], ("All", "All Countries"));
    }

    #[test]
    fn select_reports_change_once() {
        let mut selection = DropdownSelection::from_aggregate(&sample());
        assert_eq!(selection.select("Kenya"), SelectOutcome::Changed);
        assert_eq!(selection.select("Kenya"), SelectOutcome::Unchanged);
        assert_eq!(selection.current(), "Kenya");
    }

    #[test]
    fn unknown_key_leaves_selection() {
        let mut selection = DropdownSelection::from_aggregate(&sample());
        selection.select("Kenya");
        assert_eq!(selection.select("Atlantis"), SelectOutcome::Unknown);
        assert_eq!(selection.current(), "Kenya");
    }
}
