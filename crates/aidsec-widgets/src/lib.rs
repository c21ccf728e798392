#![forbid(unsafe_code)]

//! The humanitarian security incidents page.
//!
//! # Role in aidsec
//! Each widget here is a thin configuration of the reusable core: a concept
//! grouping, a value spec, and a chart builder. [`security_incidents_page`]
//! assembles all of them over one loader in page order.
//!
//! | id | container | chart |
//! |----|-----------|-------|
//! | `gender` | `gender-comparison-graph` | dropdown bar |
//! | `roles` | `roles-comparison-graph` | dropdown bar |
//! | `verified` | `verified-reports-map` | choropleth, percent |
//! | `national-international` | `comparison-graph` | two lines |
//! | `total-incidents` | `incidents-graph` | scroll-revealed line |
//! | `locations` | `location-comparison-graph` | horizontal bar |
//! | `word-cloud` | `word-cloud` | word cloud |
//! | `world-map` | `world-map` | choropleth, ISO-3 |
//! | `sudan-map` | `sudan-map` | two-layer choropleth |
//! | `sage-map` | `map-container` | uniform choropleth |

pub mod bar;
pub mod cloud;
pub mod common;
pub mod map;
pub mod timeline;

pub use bar::{FilteredBar, MarginPolicy, RankedBar};
pub use cloud::WordCloud;
pub use map::{MapKind, MapWidget};
pub use timeline::{ScrollTimeline, TimelineChart};

use aidsec_core::ConceptTable;
use aidsec_runtime::{Loader, Page, PageConfig, Widget};

/// Every widget of the page, in page order.
#[must_use]
pub fn catalog() -> Vec<Box<dyn Widget>> {
    vec![
        Box::new(FilteredBar::gender()),
        Box::new(FilteredBar::roles()),
        Box::new(MapWidget::verified()),
        Box::new(TimelineChart::national_international()),
        Box::new(ScrollTimeline::total_incidents()),
        Box::new(RankedBar::locations()),
        Box::new(WordCloud::new()),
        Box::new(MapWidget::world()),
        Box::new(MapWidget::sudan()),
        Box::new(MapWidget::sage()),
    ]
}

/// A page hosting [`catalog`], ready for [`Page::init`].
#[must_use]
pub fn security_incidents_page(
    config: PageConfig,
    concepts: ConceptTable,
    loader: Box<dyn Loader>,
) -> Page {
    catalog()
        .into_iter()
        .fold(Page::new(config, concepts, loader), Page::with)
}
