#![forbid(unsafe_code)]

//! Bar chart widgets.
//!
//! - [`FilteredBar`]: one bar per field for the selected country, with a
//!   country dropdown (gender, organization roles).
//! - [`RankedBar`]: horizontal bars for the most frequent keys (locations).

use aidsec_core::concept::{
    COUNTRY, GENDER_FEMALE, GENDER_MALE, GENDER_UNKNOWN, LOCATION, ORG_ICRC, ORG_INGO, ORG_NNGO,
    ORG_NRCS_IFRC, ORG_OTHER, ORG_UN,
};
use aidsec_core::words::COUNT_FIELD;
use aidsec_core::{Aggregate, AggregateSpec, GroupBy, ValueSpec};
use aidsec_render::axis::count_range;
use aidsec_render::palette::{GENDER, LOCATION_BAR, ORGANIZATIONS};
use aidsec_render::{Axis, BarTrace, ChartSpec, Margin, Marker, Orientation, Series, Trace};
use aidsec_runtime::{
    DropdownSelection, DynRenderer, EventOutcome, SelectOutcome, UiEvent, Widget, WidgetContext,
    WidgetError,
};

use crate::common::{DEFAULT_WIDTH, load_bound, responsive_margin, sage_layout};

// ---------------------------------------------------------------------------
// FilteredBar
// ---------------------------------------------------------------------------

/// How a filtered bar chart sizes its side margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginPolicy {
    /// Shrink with the container width.
    Responsive,
    Fixed(Margin),
}

/// Bars for one country's tally, chosen from a dropdown.
#[derive(Debug)]
pub struct FilteredBar {
    id: &'static str,
    container: &'static str,
    spec: AggregateSpec,
    labels: &'static [&'static str],
    colors: &'static [&'static str],
    y_title: &'static str,
    margins: MarginPolicy,
    tick_angle: Option<i32>,
    width: f64,
    state: Option<(Aggregate, DropdownSelection)>,
}

const GENDER_LABELS: &[&str] = &["Gender Male", "Gender Female", "Gender Unknown"];
const ROLE_LABELS: &[&str] = &["UN", "INGO", "ICRC", "NRCS and IFRC", "NNGO", "Other"];

impl FilteredBar {
    /// Victims by gender per country.
    #[must_use]
    pub fn gender() -> Self {
        let spec = AggregateSpec::by(GroupBy::Concept(COUNTRY.into()))
            .value(ValueSpec::sum("males", GENDER_MALE))
            .value(ValueSpec::sum("females", GENDER_FEMALE))
            .value(ValueSpec::sum("unknown", GENDER_UNKNOWN));
        Self::new("gender", "gender-comparison-graph", spec, GENDER_LABELS, &GENDER)
            .with_margins(MarginPolicy::Responsive)
    }

    /// Victims by organization type per country.
    #[must_use]
    pub fn roles() -> Self {
        let spec = [ORG_UN, ORG_INGO, ORG_ICRC, ORG_NRCS_IFRC, ORG_NNGO, ORG_OTHER]
            .into_iter()
            .zip(ROLE_LABELS)
            .fold(AggregateSpec::by(GroupBy::Concept(COUNTRY.into())), |spec, (concept, label)| {
                spec.value(ValueSpec::sum(*label, concept))
            });
        let mut bar = Self::new("roles", "roles-comparison-graph", spec, ROLE_LABELS, &ORGANIZATIONS)
            .with_margins(MarginPolicy::Fixed(Margin {
                t: 30.0,
                r: 80.0,
                b: 150.0,
                l: 330.0,
            }));
        bar.tick_angle = Some(0);
        bar
    }

    /// A dropdown bar chart over any aggregate spec. `labels` and `colors`
    /// line up with the `AggregateSpec` value fields.
    #[must_use]
    pub fn new(
        id: &'static str,
        container: &'static str,
        spec: AggregateSpec,
        labels: &'static [&'static str],
        colors: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            container,
            spec,
            labels,
            colors,
            y_title: "Number of Victims",
            margins: MarginPolicy::Responsive,
            tick_angle: None,
            width: DEFAULT_WIDTH,
            state: None,
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: MarginPolicy) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn aggregate(&self) -> Option<&Aggregate> {
        self.state.as_ref().map(|(aggregate, _)| aggregate)
    }

    /// Chart for the current selection.
    #[must_use]
    pub fn chart(&self) -> Option<ChartSpec> {
        let (aggregate, selection) = self.state.as_ref()?;
        let tally = aggregate.get(selection.current())?;
        let values = tally.values().to_vec();

        let mut layout = sage_layout(500);
        layout.width = Some(self.width.round() as u32);
        layout.bargap = Some(0.3);
        layout.margin = Some(match self.margins {
            MarginPolicy::Responsive => responsive_margin(self.width),
            MarginPolicy::Fixed(margin) => margin,
        });
        layout.xaxis = Some(Axis {
            tickangle: self.tick_angle,
            ..Axis::default()
        });
        layout.yaxis = Some(Axis::titled(self.y_title).with_range(count_range(&values)));

        let trace = Trace::Bar(BarTrace {
            x: Series::Labels(self.labels.iter().map(|l| (*l).to_string()).collect()),
            y: Series::Counts(values),
            orientation: None,
            marker: Marker::per_point(self.colors),
            name: None,
        });
        Some(ChartSpec::new(vec![trace], layout))
    }

    fn redraw(&self, out: &mut dyn DynRenderer) -> Result<EventOutcome, WidgetError> {
        match self.chart() {
            Some(spec) => {
                out.draw(self.container, &spec)?;
                Ok(EventOutcome::Redrawn)
            }
            None => Ok(EventOutcome::Ignored),
        }
    }
}

impl Widget for FilteredBar {
    fn id(&self) -> &str {
        self.id
    }

    fn container(&self) -> &str {
        self.container
    }

    fn init(&mut self, ctx: &WidgetContext<'_>, out: &mut dyn DynRenderer) -> Result<(), WidgetError> {
        let bound = load_bound(ctx, &[COUNTRY])?;
        let aggregate = bound.fold(&self.spec);
        if aggregate.is_empty() {
            return Err(WidgetError::Empty("no countries".into()));
        }
        tracing::debug!(
            target: "aidsec.widget",
            widget = self.id,
            keys = aggregate.len(),
            skipped_blank = aggregate.stats().skipped_blank,
            "aggregated"
        );
        let selection = DropdownSelection::from_aggregate(&aggregate);
        self.state = Some((aggregate, selection));
        self.redraw(out)?;
        Ok(())
    }

    fn handle(&mut self, event: &UiEvent, out: &mut dyn DynRenderer) -> Result<EventOutcome, WidgetError> {
        match event {
            UiEvent::Select(key) => {
                let Some((_, selection)) = self.state.as_mut() else {
                    return Ok(EventOutcome::Ignored);
                };
                match selection.select(key) {
                    SelectOutcome::Changed => self.redraw(out),
                    SelectOutcome::Unchanged => Ok(EventOutcome::Unchanged),
                    SelectOutcome::Unknown => {
                        tracing::debug!(target: "aidsec.widget", widget = self.id, key = %key, "unknown selection");
                        Ok(EventOutcome::Ignored)
                    }
                }
            }
            UiEvent::Resize { width } => {
                if (*width - self.width).abs() < f64::EPSILON {
                    return Ok(EventOutcome::Unchanged);
                }
                self.width = width.max(0.0);
                self.redraw(out)
            }
            _ => Ok(EventOutcome::Ignored),
        }
    }

    fn selection(&self) -> Option<&DropdownSelection> {
        self.state.as_ref().map(|(_, selection)| selection)
    }
}

// ---------------------------------------------------------------------------
// RankedBar
// ---------------------------------------------------------------------------

/// Horizontal bars for the `n` most frequent values of a concept.
#[derive(Debug)]
pub struct RankedBar {
    id: &'static str,
    container: &'static str,
    concept: &'static str,
    limit: Option<usize>,
}

impl RankedBar {
    /// Most frequent incident locations.
    #[must_use]
    pub fn locations() -> Self {
        Self {
            id: "locations",
            container: "location-comparison-graph",
            concept: LOCATION,
            limit: None,
        }
    }

    /// Override the page's `top_locations`.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn chart(ranked: &[(&str, u64)]) -> ChartSpec {
        let mut layout = sage_layout(600);
        layout.bargap = Some(0.2);
        layout.margin = Some(Margin {
            t: 30.0,
            r: 30.0,
            b: 50.0,
            l: 200.0,
        });
        layout.xaxis = Some(Axis::titled("Number of Incidents"));
        layout.yaxis = Some(Axis::default());

        let trace = Trace::Bar(BarTrace {
            x: Series::Counts(ranked.iter().map(|(_, count)| *count).collect()),
            y: Series::Labels(ranked.iter().map(|(key, _)| (*key).to_string()).collect()),
            orientation: Some(Orientation::Horizontal),
            marker: Marker::single(LOCATION_BAR),
            name: None,
        });
        ChartSpec::new(vec![trace], layout)
    }
}

impl Widget for RankedBar {
    fn id(&self) -> &str {
        self.id
    }

    fn container(&self) -> &str {
        self.container
    }

    fn init(&mut self, ctx: &WidgetContext<'_>, out: &mut dyn DynRenderer) -> Result<(), WidgetError> {
        let bound = load_bound(ctx, &[self.concept])?;
        let aggregate = bound.fold(
            &AggregateSpec::by(GroupBy::Concept(self.concept.into())).value(ValueSpec::count(COUNT_FIELD)),
        );
        let ranked = aggregate.top_n(COUNT_FIELD, self.limit.unwrap_or(ctx.config.top_locations));
        if ranked.is_empty() {
            return Err(WidgetError::Empty(format!("no {} values", self.concept)));
        }
        out.draw(self.container, &Self::chart(&ranked))?;
        Ok(())
    }
}
