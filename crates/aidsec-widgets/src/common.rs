#![forbid(unsafe_code)]

//! Helpers shared by every widget.

use std::rc::Rc;

use aidsec_core::{Aggregate, AggregateSpec, Bindings, Dataset, RowFilter, aggregate_with};
use aidsec_render::{Axis, Layout, Margin};
use aidsec_runtime::{WidgetContext, WidgetError};

/// Container width assumed until the host reports one.
pub const DEFAULT_WIDTH: f64 = 960.0;

/// Font used by every chart on the page.
pub const FONT_FAMILY: &str = "Libre Franklin";

/// Loaded rows plus their concept bindings.
pub(crate) struct Bound {
    pub dataset: Rc<Dataset>,
    pub bindings: Bindings,
}

impl Bound {
    pub fn fold(&self, spec: &AggregateSpec) -> Aggregate {
        aggregate_with(&self.dataset, &self.bindings, spec)
    }
}

/// Load the page dataset and bind its headers. Fails when there are no rows
/// or a required concept has no column.
pub(crate) fn load_bound(ctx: &WidgetContext<'_>, required: &[&str]) -> Result<Bound, WidgetError> {
    let dataset = ctx.loader.load(&ctx.config.data_path)?;
    if dataset.is_empty() {
        return Err(WidgetError::Empty(format!("{} has no rows", ctx.config.data_path)));
    }
    let bindings = ctx.concepts.bind(dataset.headers());
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|concept| !bindings.is_bound(concept))
        .collect();
    if !missing.is_empty() {
        return Err(WidgetError::Empty(format!("no column for {}", missing.join(", "))));
    }
    Ok(Bound { dataset, bindings })
}

/// Apply the page's year cap to a year-grouped spec.
pub(crate) fn capped(spec: AggregateSpec, cap: Option<i64>) -> AggregateSpec {
    match cap {
        Some(year) => spec.filter(RowFilter::year_at_most(year)),
        None => spec,
    }
}

/// Left/right margins that shrink with narrow containers.
#[must_use]
pub fn responsive_margin(width: f64) -> Margin {
    Margin {
        t: 30.0,
        r: (width * 0.1).min(80.0),
        b: 150.0,
        l: (width * 0.1).min(150.0),
    }
}

/// Sage-green chart layout with white axes.
pub(crate) fn sage_layout(height: u32) -> Layout {
    Layout {
        height: Some(height),
        ..Layout::on(aidsec_render::palette::SAGE_GREEN)
    }
}

pub(crate) fn year_axis(first: i64, range: Option<[f64; 2]>) -> Axis {
    let axis = Axis::titled("Year").yearly(first as f64);
    match range {
        Some(range) => axis.with_range(range),
        None => axis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn margins_cap_on_wide_containers() {
        let wide = responsive_margin(3000.0);
        assert_eq!(wide.l, 150.0);
        assert_eq!(wide.r, 80.0);
        let narrow = responsive_margin(400.0);
        assert_eq!(narrow.l, 40.0);
        assert_eq!(narrow.r, 40.0);
    }

    proptest! {
        #[test]
        fn margins_stay_within_caps(width in 0.0f64..10_000.0) {
            let margin = responsive_margin(width);
            prop_assert!(margin.l >= 0.0 && margin.l <= 150.0);
            prop_assert!(margin.r >= 0.0 && margin.r <= 80.0);
            prop_assert!(margin.l >= margin.r);
        }
    }
}
