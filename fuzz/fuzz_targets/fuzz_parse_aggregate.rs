#![no_main]

use aidsec_core::concept::{COUNTRY, GENDER_FEMALE, GENDER_MALE, YEAR};
use aidsec_core::words::{COUNT_FIELD, word_counts};
use aidsec_core::{
    AggregateSpec, ConceptTable, GroupBy, TimeSeries, ValueSpec, aggregate, parse_csv,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let dataset = parse_csv(text);
    let table = ConceptTable::security_incidents();

    // Every record has one value per header.
    for record in dataset.records() {
        assert_eq!(record.len(), dataset.headers().len());
    }

    let spec = AggregateSpec::by(GroupBy::Concept(COUNTRY.into()))
        .value(ValueSpec::sum("males", GENDER_MALE))
        .value(ValueSpec::sum("females", GENDER_FEMALE))
        .value(ValueSpec::count(COUNT_FIELD));
    let agg = aggregate(&dataset, &table, &spec);

    // The All tally is the sum of the real keys.
    for (idx, total) in agg.all().values().iter().enumerate() {
        let sum = agg
            .iter()
            .fold(0u64, |acc, (_, tally)| acc.saturating_add(tally.get(idx)));
        assert_eq!(*total, sum);
    }
    let stats = agg.stats();
    assert_eq!(
        agg.value("All", COUNT_FIELD).unwrap_or(0) as usize
            + stats.skipped_blank
            + stats.skipped_reserved,
        stats.rows_seen
    );
    for (_, pct) in agg.percentages("males", COUNT_FIELD) {
        assert!(pct.is_finite());
    }

    let years = aggregate(
        &dataset,
        &table,
        &AggregateSpec::by(GroupBy::Year(YEAR.into())).value(ValueSpec::count(COUNT_FIELD)),
    );
    let series = TimeSeries::from_aggregate(&years);
    assert!(series.years().windows(2).all(|w| w[0] < w[1]));

    let words = word_counts(&dataset, &table.bind(dataset.headers()));
    let ranked = words.top_n(COUNT_FIELD, 100);
    assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
});
