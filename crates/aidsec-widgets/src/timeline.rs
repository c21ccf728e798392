#![forbid(unsafe_code)]

//! Year-axis line charts.
//!
//! [`TimelineChart`] draws every year at once. [`ScrollTimeline`] starts with
//! the first year and reveals more as the reader scrolls, driven by a
//! [`ScrollController`].

use aidsec_core::concept::{TOTAL_INTERNATIONALS, TOTAL_NATIONALS, YEAR};
use aidsec_core::{AggregateSpec, GroupBy, TimeSeries, ValueSpec};
use aidsec_render::axis::{count_range, year_range};
use aidsec_render::palette::{INCIDENT_FILL, INCIDENT_LINE, INTERNATIONAL, NATIONAL};
use aidsec_render::{Axis, ChartSpec, ChartUpdate, LineTrace, Margin, Series, Trace, TracePatch};
use aidsec_runtime::{
    DynRenderer, EventOutcome, ListenerAction, ScrollController, UiEvent, WheelOutcome, Widget,
    WidgetContext, WidgetError,
};

use crate::common::{capped, load_bound, sage_layout, year_axis};

/// Duration of one reveal step.
pub const REVEAL_TRANSITION_MS: u32 = 30;

fn load_series(
    ctx: &WidgetContext<'_>,
    required: &[&str],
    spec: AggregateSpec,
) -> Result<TimeSeries, WidgetError> {
    let bound = load_bound(ctx, required)?;
    let series = TimeSeries::from_aggregate(&bound.fold(&capped(spec, ctx.config.year_cap)));
    if series.is_empty() {
        return Err(WidgetError::Empty("no years".into()));
    }
    Ok(series)
}

// ---------------------------------------------------------------------------
// TimelineChart
// ---------------------------------------------------------------------------

/// One static line per series.
#[derive(Debug)]
pub struct TimelineChart {
    id: &'static str,
    container: &'static str,
    lines: Vec<TimelineLine>,
}

#[derive(Debug, Clone)]
struct TimelineLine {
    field: &'static str,
    concept: &'static str,
    name: &'static str,
    color: &'static str,
    hover: &'static str,
}

impl TimelineChart {
    /// National versus international victims per year.
    #[must_use]
    pub fn national_international() -> Self {
        Self {
            id: "national-international",
            container: "comparison-graph",
            lines: vec![
                TimelineLine {
                    field: "nationals",
                    concept: TOTAL_NATIONALS,
                    name: "National",
                    color: NATIONAL,
                    hover: "national incidents",
                },
                TimelineLine {
                    field: "internationals",
                    concept: TOTAL_INTERNATIONALS,
                    name: "International",
                    color: INTERNATIONAL,
                    hover: "international incidents",
                },
            ],
        }
    }

    #[must_use]
    pub fn chart(&self, series: &TimeSeries, cap: Option<i64>) -> ChartSpec {
        let years = series.years().to_vec();
        let mut all_values = Vec::new();
        let traces: Vec<Trace> = self
            .lines
            .iter()
            .map(|line| {
                let values = series.series(line.field);
                all_values.extend_from_slice(&values);
                Trace::Line(LineTrace::new(years.clone(), values, line.color, line.hover).named(line.name))
            })
            .collect();

        let mut layout = sage_layout(450);
        layout.showlegend = true;
        layout.margin = Some(Margin {
            t: 50.0,
            r: 50.0,
            b: 100.0,
            l: 120.0,
        });
        let first = years.first().copied().unwrap_or_default();
        layout.xaxis = Some(year_axis(first, year_range(&years, cap)).with_tick_angle(-45));
        layout.yaxis = Some(Axis::titled("Number of Incidents").with_range(count_range(&all_values)));
        ChartSpec::new(traces, layout)
    }
}

impl Widget for TimelineChart {
    fn id(&self) -> &str {
        self.id
    }

    fn container(&self) -> &str {
        self.container
    }

    fn init(&mut self, ctx: &WidgetContext<'_>, out: &mut dyn DynRenderer) -> Result<(), WidgetError> {
        let spec = self
            .lines
            .iter()
            .fold(AggregateSpec::by(GroupBy::Year(YEAR.into())), |spec, line| {
                spec.value(ValueSpec::sum(line.field, line.concept))
            });
        let series = load_series(ctx, &[YEAR], spec)?;
        out.draw(self.container, &self.chart(&series, ctx.config.year_cap))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScrollTimeline
// ---------------------------------------------------------------------------

const INCIDENTS: &str = "incidents";

/// Incident count per year, revealed one year at a time while scrolling.
#[derive(Debug)]
pub struct ScrollTimeline {
    id: &'static str,
    container: &'static str,
    series: TimeSeries,
    controller: Option<ScrollController>,
}

impl ScrollTimeline {
    #[must_use]
    pub fn total_incidents() -> Self {
        Self {
            id: "total-incidents",
            container: "incidents-graph",
            series: TimeSeries::default(),
            controller: None,
        }
    }

    #[must_use]
    pub fn controller(&self) -> Option<&ScrollController> {
        self.controller.as_ref()
    }

    /// Full draw showing the first `visible` years.
    #[must_use]
    pub fn chart(&self, visible: usize, cap: Option<i64>) -> ChartSpec {
        let slice = self.series.first(visible);
        let values = slice.series(INCIDENTS);
        let trace = LineTrace::new(slice.years().to_vec(), values.clone(), INCIDENT_LINE, INCIDENTS)
            .filled(INCIDENT_FILL);

        let years = self.series.years();
        let mut layout = sage_layout(450);
        layout.margin = Some(Margin {
            t: 50.0,
            r: 50.0,
            b: 100.0,
            l: 80.0,
        });
        let first = years.first().copied().unwrap_or_default();
        layout.xaxis = Some(year_axis(first, year_range(years, cap)));
        layout.yaxis = Some(Axis::titled("Number of Incidents").with_range(count_range(&values)));
        ChartSpec::new(vec![Trace::Line(trace)], layout)
    }

    /// Animation to the first `visible` years; the y range follows the slice.
    #[must_use]
    pub fn update(&self, visible: usize) -> ChartUpdate {
        let slice = self.series.first(visible);
        let values = slice.series(INCIDENTS);
        ChartUpdate {
            yaxis_range: Some(count_range(&values)),
            data: vec![TracePatch {
                x: Series::Years(slice.years().to_vec()),
                y: Series::Counts(values),
            }],
            transition_ms: REVEAL_TRANSITION_MS,
        }
    }
}

impl Widget for ScrollTimeline {
    fn id(&self) -> &str {
        self.id
    }

    fn container(&self) -> &str {
        self.container
    }

    fn init(&mut self, ctx: &WidgetContext<'_>, out: &mut dyn DynRenderer) -> Result<(), WidgetError> {
        let spec = AggregateSpec::by(GroupBy::Year(YEAR.into())).value(ValueSpec::count(INCIDENTS));
        self.series = load_series(ctx, &[YEAR], spec)?;
        let controller = ScrollController::new(ctx.config.scroll, self.series.len());
        out.draw(self.container, &self.chart(controller.cursor(), ctx.config.year_cap))?;
        self.controller = Some(controller);
        Ok(())
    }

    fn handle(&mut self, event: &UiEvent, out: &mut dyn DynRenderer) -> Result<EventOutcome, WidgetError> {
        let Some(controller) = self.controller.as_mut() else {
            return Ok(EventOutcome::Ignored);
        };
        match event {
            UiEvent::Engage => Ok(controller
                .engage()
                .map_or(EventOutcome::Ignored, EventOutcome::Listener)),
            UiEvent::Settle => Ok(if controller.settle() {
                EventOutcome::Unchanged
            } else {
                EventOutcome::Ignored
            }),
            UiEvent::Wheel { delta_y } => match controller.on_wheel(*delta_y) {
                WheelOutcome::Redraw(cursor) => {
                    out.animate(self.container, &self.update(cursor))?;
                    Ok(EventOutcome::Redrawn)
                }
                WheelOutcome::Unchanged | WheelOutcome::BelowThreshold => Ok(EventOutcome::Unchanged),
                WheelOutcome::Inactive => Ok(EventOutcome::Ignored),
                WheelOutcome::Release(_) => Ok(EventOutcome::Listener(ListenerAction::Detach)),
            },
            _ => Ok(EventOutcome::Ignored),
        }
    }
}
