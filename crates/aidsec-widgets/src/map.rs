#![forbid(unsafe_code)]

//! Choropleth map widgets.
//!
//! One widget type, [`MapWidget`], draws four different maps selected by
//! [`MapKind`]. All of them group rows by a country concept; they differ in
//! the value shown and the color scale.

use aidsec_core::concept::{COUNTRY, COUNTRY_CODE, TOTAL, VERIFIED};
use aidsec_core::words::COUNT_FIELD;
use aidsec_core::{Aggregate, AggregateSpec, GroupBy, RowFilter, ValueSpec};
use aidsec_render::palette::{HIGHLIGHT_REDS, LIGHT_GRAY, SAGE_GREEN, VERIFICATION_SCALE};
use aidsec_render::{ChartSpec, ChoroplethTrace, ColorScale, Layout, LocationMode, Margin, Trace};
use aidsec_runtime::{DynRenderer, Widget, WidgetContext, WidgetError};

use crate::common::{Bound, load_bound};

const NO_HOVER: &str = "<extra></extra>";

/// Which map a [`MapWidget`] draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapKind {
    /// Verified / total reports per country, in percent.
    Verified,
    /// Incident count per ISO-3 country code.
    IncidentCount,
    /// One country's incident count drawn over a sage layer of the rest.
    Highlight(String),
    /// Every reporting country in sage green.
    Uniform,
}

#[derive(Debug)]
pub struct MapWidget {
    id: &'static str,
    container: &'static str,
    kind: MapKind,
}

impl MapWidget {
    #[must_use]
    pub fn new(id: &'static str, container: &'static str, kind: MapKind) -> Self {
        Self { id, container, kind }
    }

    #[must_use]
    pub fn verified() -> Self {
        Self::new("verified", "verified-reports-map", MapKind::Verified)
    }

    #[must_use]
    pub fn world() -> Self {
        Self::new("world-map", "world-map", MapKind::IncidentCount)
    }

    #[must_use]
    pub fn sudan() -> Self {
        Self::new("sudan-map", "sudan-map", MapKind::Highlight("Sudan".into()))
    }

    #[must_use]
    pub fn sage() -> Self {
        Self::new("sage-map", "map-container", MapKind::Uniform)
    }

    #[must_use]
    pub fn kind(&self) -> &MapKind {
        &self.kind
    }

    fn traces(&self, bound: &Bound) -> Vec<ChoroplethTrace> {
        match &self.kind {
            MapKind::Verified => {
                let aggregate = bound.fold(
                    &AggregateSpec::by(GroupBy::Concept(COUNTRY.into()))
                        .value(ValueSpec::sum("verified", VERIFIED))
                        .value(ValueSpec::sum("total", TOTAL)),
                );
                vec![verified_trace(&aggregate)]
            }
            MapKind::IncidentCount => {
                let aggregate = bound.fold(&count_by(COUNTRY_CODE));
                vec![count_trace(&aggregate)]
            }
            MapKind::Highlight(country) => {
                let others = bound.fold(&count_by(COUNTRY));
                let highlighted = bound.fold(
                    &count_by(COUNTRY).filter(RowFilter::equals(COUNTRY, country.as_str())),
                );
                let mut traces = vec![uniform_trace(
                    others.iter().map(|(key, _)| key).filter(|key| *key != country.as_str()),
                )];
                if !highlighted.is_empty() {
                    traces.push(highlight_trace(&highlighted));
                }
                traces
            }
            MapKind::Uniform => {
                let aggregate = bound.fold(&count_by(COUNTRY));
                vec![uniform_trace(aggregate.iter().map(|(key, _)| key))]
            }
        }
    }

    fn layout(&self) -> Layout {
        let background = match self.kind {
            MapKind::Verified => SAGE_GREEN,
            _ => LIGHT_GRAY,
        };
        Layout {
            margin: Some(Margin::default()),
            height: matches!(self.kind, MapKind::Verified).then_some(600),
            ..Layout::on(background)
        }
    }

    fn required(&self) -> &'static [&'static str] {
        match self.kind {
            MapKind::IncidentCount => &[COUNTRY_CODE],
            _ => &[COUNTRY],
        }
    }
}

fn count_by(concept: &str) -> AggregateSpec {
    AggregateSpec::by(GroupBy::Concept(concept.into())).value(ValueSpec::count(COUNT_FIELD))
}

fn counts(aggregate: &Aggregate) -> (Vec<String>, Vec<u64>) {
    aggregate
        .iter()
        .map(|(key, tally)| (key.to_string(), tally.get(0)))
        .unzip()
}

fn verified_trace(aggregate: &Aggregate) -> ChoroplethTrace {
    let (locations, z): (Vec<String>, Vec<f64>) = aggregate
        .percentages("verified", "total")
        .into_iter()
        .map(|(key, pct)| (key.to_string(), pct))
        .unzip();
    let text = locations
        .iter()
        .zip(&z)
        .map(|(country, pct)| format!("{country}<br>{pct:.1}% Verified"))
        .collect();
    ChoroplethTrace {
        locationmode: LocationMode::CountryNames,
        locations,
        z,
        text,
        colorscale: ColorScale::stops(&VERIFICATION_SCALE),
        showscale: true,
        zmin: Some(0.0),
        zmax: Some(100.0),
        hovertemplate: None,
    }
}

fn count_trace(aggregate: &Aggregate) -> ChoroplethTrace {
    let (locations, z) = counts(aggregate);
    let text = locations
        .iter()
        .zip(&z)
        .map(|(code, count)| format!("{code}: {count} incidents"))
        .collect();
    ChoroplethTrace {
        locationmode: LocationMode::Iso3,
        locations,
        z: z.into_iter().map(|v| v as f64).collect(),
        text,
        colorscale: ColorScale::Named("Reds"),
        showscale: false,
        zmin: None,
        zmax: None,
        hovertemplate: Some("<b>%{text}</b><br>Incidents: %{z}<extra></extra>".into()),
    }
}

fn highlight_trace(aggregate: &Aggregate) -> ChoroplethTrace {
    let (locations, z) = counts(aggregate);
    let text = locations
        .iter()
        .zip(&z)
        .map(|(country, count)| format!("{country}: {count} incidents"))
        .collect();
    ChoroplethTrace {
        locationmode: LocationMode::CountryNames,
        locations,
        z: z.into_iter().map(|v| v as f64).collect(),
        text,
        colorscale: ColorScale::stops(&HIGHLIGHT_REDS),
        showscale: false,
        zmin: Some(0.0),
        zmax: None,
        hovertemplate: Some("<b>%{location}</b><br>Incidents: <b>%{z}</b><extra></extra>".into()),
    }
}

fn uniform_trace<'a>(countries: impl Iterator<Item = &'a str>) -> ChoroplethTrace {
    let locations: Vec<String> = countries.map(str::to_string).collect();
    ChoroplethTrace {
        locationmode: LocationMode::CountryNames,
        z: vec![1.0; locations.len()],
        locations,
        text: Vec::new(),
        colorscale: ColorScale::uniform(SAGE_GREEN),
        showscale: false,
        zmin: Some(0.0),
        zmax: None,
        hovertemplate: Some(NO_HOVER.into()),
    }
}

impl Widget for MapWidget {
    fn id(&self) -> &str {
        self.id
    }

    fn container(&self) -> &str {
        self.container
    }

    fn init(&mut self, ctx: &WidgetContext<'_>, out: &mut dyn DynRenderer) -> Result<(), WidgetError> {
        let bound = load_bound(ctx, self.required())?;
        let traces = self.traces(&bound);
        if traces.iter().all(|trace| trace.locations.is_empty()) {
            return Err(WidgetError::Empty("no countries".into()));
        }
        tracing::debug!(
            target: "aidsec.widget",
            widget = self.id,
            layers = traces.len(),
            locations = traces.iter().map(|t| t.locations.len()).sum::<usize>(),
            "map built"
        );
        let data = traces.into_iter().map(Trace::Choropleth).collect();
        out.draw(self.container, &ChartSpec::new(data, self.layout()))?;
        Ok(())
    }
}
