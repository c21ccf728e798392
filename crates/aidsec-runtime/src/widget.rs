#![forbid(unsafe_code)]

//! Widget contract.
//!
//! A widget owns one container on the page. [`Widget::init`] loads and folds
//! its data then draws; [`Widget::handle`] reacts to UI events afterwards.
//! Widgets draw through [`DynRenderer`], an object-safe view of any
//! [`ChartRenderer`], so a page can hold `Box<dyn Widget>` of mixed kinds.

use aidsec_core::ConceptTable;
use aidsec_render::{ChartRenderer, ChartSpec, ChartUpdate};
use thiserror::Error;

use crate::config::PageConfig;
use crate::loader::{LoadError, Loader};
use crate::scroll::ListenerAction;
use crate::selection::DropdownSelection;

// ---------------------------------------------------------------------------
// Rendering seam
// ---------------------------------------------------------------------------

/// Renderer error flattened to its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("renderer failed: {0}")]
pub struct RenderFailure(pub String);

/// Object-safe rendering surface. Implemented for every [`ChartRenderer`].
pub trait DynRenderer {
    fn draw(&mut self, container: &str, spec: &ChartSpec) -> Result<(), RenderFailure>;
    fn animate(&mut self, container: &str, update: &ChartUpdate) -> Result<(), RenderFailure>;
    fn show_message(&mut self, container: &str, text: &str) -> Result<(), RenderFailure>;
}

impl<R: ChartRenderer> DynRenderer for R {
    fn draw(&mut self, container: &str, spec: &ChartSpec) -> Result<(), RenderFailure> {
        ChartRenderer::draw(self, container, spec).map_err(|e| RenderFailure(e.to_string()))
    }

    fn animate(&mut self, container: &str, update: &ChartUpdate) -> Result<(), RenderFailure> {
        ChartRenderer::animate(self, container, update).map_err(|e| RenderFailure(e.to_string()))
    }

    fn show_message(&mut self, container: &str, text: &str) -> Result<(), RenderFailure> {
        ChartRenderer::show_message(self, container, text)
            .map_err(|e| RenderFailure(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Events and status
// ---------------------------------------------------------------------------

/// Input routed to a widget by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Dropdown value chosen.
    Select(String),
    /// Wheel delta while the widget may be hijacking scroll.
    Wheel { delta_y: f64 },
    /// Chart scrolled into view.
    Engage,
    /// Host finished detaching the wheel listener.
    Settle,
    /// Container width changed.
    Resize { width: f64 },
}

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Redrawn,
    Unchanged,
    Ignored,
    Listener(ListenerAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetStatus {
    #[default]
    Pending,
    Ready,
    NoData(String),
}

impl WidgetStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderFailure),

    #[error("no data: {0}")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// Shared inputs available during [`Widget::init`].
pub struct WidgetContext<'a> {
    pub loader: &'a dyn Loader,
    pub concepts: &'a ConceptTable,
    pub config: &'a PageConfig,
}

pub trait Widget {
    /// Stable identifier used for event routing.
    fn id(&self) -> &str;

    /// Container the widget draws into.
    fn container(&self) -> &str;

    fn init(
        &mut self,
        ctx: &WidgetContext<'_>,
        out: &mut dyn DynRenderer,
    ) -> Result<(), WidgetError>;

    fn handle(
        &mut self,
        event: &UiEvent,
        out: &mut dyn DynRenderer,
    ) -> Result<EventOutcome, WidgetError> {
        let _ = (event, out);
        Ok(EventOutcome::Ignored)
    }

    /// Dropdown state, for widgets that filter by key.
    fn selection(&self) -> Option<&DropdownSelection> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidsec_render::{Frame, Layout, RecordingRenderer};

    #[test]
    fn chart_renderers_are_dyn_renderers() {
        let mut recorder = RecordingRenderer::new();
        {
            let out: &mut dyn DynRenderer = &mut recorder;
            out.draw("c", &ChartSpec::new(Vec::new(), Layout::on("black")))
                .unwrap();
            out.show_message("c", "hello").unwrap();
        }
        assert_eq!(recorder.frames().len(), 2);
        assert!(matches!(recorder.frames()[1], Frame::Message { .. }));
    }

    #[test]
    fn status_default_is_pending() {
        assert_eq!(WidgetStatus::default(), WidgetStatus::Pending);
        assert!(!WidgetStatus::NoData("x".into()).is_ready());
    }
}
