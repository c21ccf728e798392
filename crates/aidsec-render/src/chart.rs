#![forbid(unsafe_code)]

//! Declarative chart descriptions.
//!
//! These types serialize to the shape the charting backend consumes: a list
//! of traces tagged by `type`, and a layout. Field names follow the backend
//! (`x`, `y`, `locations`, `z`, `marker.color`, `xaxis.range`, ...).

use serde::Serialize;

// ---------------------------------------------------------------------------
// Series values
// ---------------------------------------------------------------------------

/// One axis' worth of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Series {
    Labels(Vec<String>),
    Years(Vec<i64>),
    Counts(Vec<u64>),
    Numbers(Vec<f64>),
}

impl Series {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Labels(v) => v.len(),
            Self::Years(v) => v.len(),
            Self::Counts(v) => v.len(),
            Self::Numbers(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for Series {
    fn from(v: Vec<String>) -> Self {
        Self::Labels(v)
    }
}

impl From<Vec<i64>> for Series {
    fn from(v: Vec<i64>) -> Self {
        Self::Years(v)
    }
}

impl From<Vec<u64>> for Series {
    fn from(v: Vec<u64>) -> Self {
        Self::Counts(v)
    }
}

impl From<Vec<f64>> for Series {
    fn from(v: Vec<f64>) -> Self {
        Self::Numbers(v)
    }
}

// ---------------------------------------------------------------------------
// Traces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    #[serde(rename = "v")]
    Vertical,
    #[serde(rename = "h")]
    Horizontal,
}

/// Bar/point colors: one shared color or one per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: MarkerColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Single(String),
    PerPoint(Vec<String>),
}

impl Marker {
    #[must_use]
    pub fn single(color: &str) -> Self {
        Self {
            color: MarkerColor::Single(color.to_string()),
            size: None,
        }
    }

    #[must_use]
    pub fn per_point(colors: &[&str]) -> Self {
        Self {
            color: MarkerColor::PerPoint(colors.iter().map(|c| (*c).to_string()).collect()),
            size: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub x: Series,
    pub y: Series,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub marker: Marker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub x: Vec<i64>,
    pub y: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mode: &'static str,
    pub marker: Marker,
    pub line: LineStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    pub hovertemplate: String,
}

impl LineTrace {
    /// Line with markers in one color.
    #[must_use]
    pub fn new(x: Vec<i64>, y: Vec<u64>, color: &str, hover_suffix: &str) -> Self {
        Self {
            x,
            y,
            name: None,
            mode: "lines+markers",
            marker: Marker::single(color).with_size(8),
            line: LineStyle {
                width: 3,
                color: color.to_string(),
            },
            fill: None,
            fillcolor: None,
            hovertemplate: format!("%{{x}} - %{{y}} {hover_suffix}<extra></extra>"),
        }
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Fill the area under the line.
    #[must_use]
    pub fn filled(mut self, color: &str) -> Self {
        self.fill = Some("tozeroy");
        self.fillcolor = Some(color.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocationMode {
    #[serde(rename = "country names")]
    CountryNames,
    #[serde(rename = "ISO-3")]
    Iso3,
}

/// Choropleth color scale: a named backend scale or explicit stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorScale {
    Named(&'static str),
    Stops(Vec<(f64, String)>),
}

impl ColorScale {
    #[must_use]
    pub fn stops(stops: &[(f64, &str)]) -> Self {
        Self::Stops(stops.iter().map(|(at, c)| (*at, (*c).to_string())).collect())
    }

    /// Every value in one color.
    #[must_use]
    pub fn uniform(color: &str) -> Self {
        Self::stops(&[(0.0, color), (1.0, color)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethTrace {
    pub locationmode: LocationMode,
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    pub colorscale: ColorScale,
    pub showscale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

/// One placed word of a word cloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudWord {
    pub text: String,
    pub count: u64,
    /// Font size in pixels.
    pub size: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloudTrace {
    pub words: Vec<CloudWord>,
    pub font: &'static str,
    pub padding: u32,
    pub rotate: u32,
}

/// One drawable series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Bar(BarTrace),
    #[serde(rename = "scatter")]
    Line(LineTrace),
    Choropleth(ChoroplethTrace),
    WordCloud(WordCloudTrace),
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
    pub showgrid: bool,
}

impl Axis {
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: [f64; 2]) -> Self {
        self.range = Some(range);
        self
    }

    /// One tick per year starting at `first`.
    #[must_use]
    pub fn yearly(mut self, first: f64) -> Self {
        self.tick0 = Some(first);
        self.dtick = Some(1.0);
        self
    }

    #[must_use]
    pub fn with_tick_angle(mut self, angle: i32) -> Self {
        self.tickangle = Some(angle);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Margin {
    pub t: f64,
    pub r: f64,
    pub b: f64,
    pub l: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
    pub showlegend: bool,
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
}

impl Layout {
    /// Empty layout on a solid background.
    #[must_use]
    pub fn on(background: &str) -> Self {
        Self {
            title: None,
            xaxis: None,
            yaxis: None,
            margin: None,
            height: None,
            width: None,
            bargap: None,
            showlegend: false,
            plot_bgcolor: background.to_string(),
            paper_bgcolor: background.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Full draw and incremental update
// ---------------------------------------------------------------------------

/// Everything the backend needs for a full draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    #[must_use]
    pub fn new(data: Vec<Trace>, layout: Layout) -> Self {
        Self { data, layout }
    }
}

/// New `x`/`y` for one existing trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracePatch {
    pub x: Series,
    pub y: Series,
}

/// Incremental animate/restyle payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartUpdate {
    pub data: Vec<TracePatch>,
    /// Replacement y range for the slice being shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis_range: Option<[f64; 2]>,
    pub transition_ms: u32,
}
