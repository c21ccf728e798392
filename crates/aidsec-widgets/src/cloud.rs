#![forbid(unsafe_code)]

//! Word cloud of incident descriptions.

use aidsec_core::concept::DETAILS;
use aidsec_core::words::{COUNT_FIELD, word_counts};
use aidsec_render::axis::LinearScale;
use aidsec_render::palette::{LIGHT_GRAY, word_color};
use aidsec_render::{ChartSpec, CloudWord, Layout, Trace, WordCloudTrace};
use aidsec_runtime::{DynRenderer, Widget, WidgetContext, WidgetError};

use crate::common::{FONT_FAMILY, load_bound};

/// Smallest and largest font size in pixels.
pub const FONT_RANGE: (f64, f64) = (14.0, 60.0);

#[derive(Debug)]
pub struct WordCloud {
    id: &'static str,
    container: &'static str,
}

impl Default for WordCloud {
    fn default() -> Self {
        Self {
            id: "word-cloud",
            container: "word-cloud",
        }
    }
}

impl WordCloud {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Size words by count and color them by rank. `ranked` is descending.
    #[must_use]
    pub fn chart(ranked: &[(&str, u64)]) -> ChartSpec {
        let (lo, hi) = ranked.iter().fold((u64::MAX, 0), |(lo, hi), (_, count)| {
            (lo.min(*count), hi.max(*count))
        });
        let scale = LinearScale::new((lo as f64, hi as f64), FONT_RANGE);
        let words = ranked
            .iter()
            .enumerate()
            .map(|(rank, (word, count))| CloudWord {
                text: (*word).to_string(),
                count: *count,
                size: scale.apply(*count as f64),
                color: word_color(rank).to_string(),
            })
            .collect();
        let trace = WordCloudTrace {
            words,
            font: FONT_FAMILY,
            padding: 5,
            rotate: 0,
        };
        ChartSpec::new(vec![Trace::WordCloud(trace)], Layout::on(LIGHT_GRAY))
    }
}

impl Widget for WordCloud {
    fn id(&self) -> &str {
        self.id
    }

    fn container(&self) -> &str {
        self.container
    }

    fn init(&mut self, ctx: &WidgetContext<'_>, out: &mut dyn DynRenderer) -> Result<(), WidgetError> {
        let bound = load_bound(ctx, &[DETAILS])?;
        let counts = word_counts(&bound.dataset, &bound.bindings);
        let ranked = counts.top_n(COUNT_FIELD, ctx.config.top_words);
        if ranked.is_empty() {
            return Err(WidgetError::Empty("no words".into()));
        }
        tracing::debug!(
            target: "aidsec.widget",
            widget = self.id,
            distinct = counts.len(),
            shown = ranked.len(),
            "word cloud built"
        );
        out.draw(self.container, &Self::chart(&ranked))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(spec: &ChartSpec) -> &[CloudWord] {
        match &spec.data[0] {
            Trace::WordCloud(trace) => &trace.words,
            other => panic!("expected a word cloud, got {other:?}"),
        }
    }

    #[test]
    fn sizes_span_font_range() {
        let spec = WordCloud::chart(&[("attack", 10), ("convoy", 5), ("staff", 1)]);
        let words = words(&spec);
        assert_eq!(words[0].size, 60.0);
        assert_eq!(words[2].size, 14.0);
        assert!(words[1].size > 14.0 && words[1].size < 60.0);
    }

    #[test]
    fn equal_counts_use_midpoint() {
        let spec = WordCloud::chart(&[("a", 2), ("b", 2)]);
        assert!(words(&spec).iter().all(|w| w.size == 37.0));
    }

    #[test]
    fn colors_follow_rank() {
        let spec = WordCloud::chart(&[("a", 3), ("b", 2)]);
        let words = words(&spec);
        assert_eq!(words[0].color, word_color(0));
        assert_eq!(words[1].color, word_color(1));
    }
}
