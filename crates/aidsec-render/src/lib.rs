#![forbid(unsafe_code)]
#![doc = "Renderer contract for aidsec: the declarative chart description handed to an"]
#![doc = "external charting backend, and the trait that backend implements."]
#![doc = ""]
#![doc = "Widgets never draw. They build a [`ChartSpec`] (full draw) or a"]
#![doc = "[`ChartUpdate`] (incremental animate/restyle) and pass it to a"]
#![doc = "[`ChartRenderer`]. Axis ranges are recomputed from whatever slice is being"]
#![doc = "drawn, see [`axis::value_range`]."]

pub mod axis;
pub mod chart;
pub mod palette;
pub mod renderer;

pub use chart::{
    Axis, BarTrace, ChartSpec, ChartUpdate, ChoroplethTrace, CloudWord, ColorScale, Layout,
    LineStyle, LineTrace, LocationMode, Margin, Marker, MarkerColor, Orientation, Series, Trace,
    TracePatch, WordCloudTrace,
};
pub use renderer::{ChartRenderer, Frame, JsonLinesRenderer, RecordingRenderer, RenderError};

/// Message shown in a container whose widget has nothing to draw.
pub const NO_DATA_MESSAGE: &str = "No data available";
