use aidsec_core::concept::{COUNTRY, GENDER_FEMALE, GENDER_MALE, GENDER_UNKNOWN};
use aidsec_core::{AggregateSpec, ConceptTable, GroupBy, ValueSpec, aggregate, parse_csv};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const COUNTRIES: &[&str] = &["Afghanistan", "South Sudan", "Sudan", "Syria", "Somalia", "Mali"];

fn synthetic_csv(rows: usize) -> String {
    let mut out = String::from("Country,Year,Gender Male,Gender Female,Gender Unknown,Details\n");
    for i in 0..rows {
        let country = COUNTRIES[i % COUNTRIES.len()];
        out.push_str(&format!(
            "{country},{},{},{},{},\"Armed men, unknown, attacked convoy {i}\"\n",
            1997 + (i % 28),
            i % 3,
            i % 2,
            i % 5
        ));
    }
    out
}

fn bench_aggregate(c: &mut Criterion) {
    let text = synthetic_csv(5_000);
    let table = ConceptTable::security_incidents();
    let spec = AggregateSpec::by(GroupBy::Concept(COUNTRY.into()))
        .value(ValueSpec::sum("males", GENDER_MALE))
        .value(ValueSpec::sum("females", GENDER_FEMALE))
        .value(ValueSpec::sum("unknown", GENDER_UNKNOWN));

    c.bench_function("parse_csv/5k", |b| b.iter(|| parse_csv(black_box(&text))));

    let data = parse_csv(&text);
    c.bench_function("aggregate/gender_by_country/5k", |b| {
        b.iter(|| aggregate(black_box(&data), &table, &spec))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
