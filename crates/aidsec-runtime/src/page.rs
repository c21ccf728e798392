#![forbid(unsafe_code)]

//! Page host.
//!
//! [`Page`] owns the widgets, one loader, the resolved concept table, and the
//! configuration. Widgets are initialized independently: a widget that fails
//! to load, finds no data, or cannot draw gets the no-data message in its
//! container and the rest of the page carries on.

use aidsec_core::ConceptTable;
use aidsec_render::NO_DATA_MESSAGE;
use thiserror::Error;

use crate::config::PageConfig;
use crate::loader::Loader;
use crate::widget::{
    DynRenderer, EventOutcome, UiEvent, Widget, WidgetContext, WidgetError, WidgetStatus,
};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no widget with id {0:?}")]
    UnknownWidget(String),

    #[error("widget {id:?} is not ready")]
    NotReady { id: String },

    #[error("widget {id:?} failed: {source}")]
    Widget {
        id: String,
        #[source]
        source: WidgetError,
    },
}

struct Slot {
    widget: Box<dyn Widget>,
    status: WidgetStatus,
}

pub struct Page {
    config: PageConfig,
    concepts: ConceptTable,
    loader: Box<dyn Loader>,
    slots: Vec<Slot>,
}

impl Page {
    pub fn new(config: PageConfig, concepts: ConceptTable, loader: Box<dyn Loader>) -> Self {
        Self {
            config,
            concepts,
            loader,
            slots: Vec::new(),
        }
    }

    /// Register a widget. Widgets initialize in registration order.
    pub fn add(&mut self, widget: Box<dyn Widget>) -> &mut Self {
        self.slots.push(Slot {
            widget,
            status: WidgetStatus::Pending,
        });
        self
    }

    #[must_use]
    pub fn with(mut self, widget: Box<dyn Widget>) -> Self {
        self.add(widget);
        self
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn loader(&self) -> &dyn Loader {
        self.loader.as_ref()
    }

    /// Widget ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.widget.id())
    }

    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&dyn Widget> {
        self.slot(id).map(|slot| slot.widget.as_ref())
    }

    #[must_use]
    pub fn status(&self, id: &str) -> Option<&WidgetStatus> {
        self.slot(id).map(|slot| &slot.status)
    }

    /// `(id, status)` for every widget.
    pub fn statuses(&self) -> impl Iterator<Item = (&str, &WidgetStatus)> {
        self.slots
            .iter()
            .map(|slot| (slot.widget.id(), &slot.status))
    }

    /// Initialize every widget. Returns how many became ready.
    pub fn init(&mut self, out: &mut dyn DynRenderer) -> usize {
        let ctx = WidgetContext {
            loader: self.loader.as_ref(),
            concepts: &self.concepts,
            config: &self.config,
        };
        let mut ready = 0;
        for slot in &mut self.slots {
            let id = slot.widget.id().to_string();
            match slot.widget.init(&ctx, out) {
                Ok(()) => {
                    slot.status = WidgetStatus::Ready;
                    ready += 1;
                    tracing::debug!(target: "aidsec.page", widget = %id, "widget ready");
                }
                Err(err) => {
                    tracing::error!(target: "aidsec.page", widget = %id, error = %err, "widget failed to initialize");
                    slot.status = WidgetStatus::NoData(err.to_string());
                    if let Err(render_err) = out.show_message(slot.widget.container(), NO_DATA_MESSAGE) {
                        tracing::error!(
                            target: "aidsec.page",
                            widget = %id,
                            error = %render_err,
                            "could not show no-data message"
                        );
                    }
                }
            }
        }
        tracing::info!(
            target: "aidsec.page",
            widgets = self.slots.len(),
            ready,
            fetches = self.loader.fetch_count(),
            "page initialized"
        );
        ready
    }

    /// Route an event to one widget.
    pub fn dispatch(
        &mut self,
        id: &str,
        event: &UiEvent,
        out: &mut dyn DynRenderer,
    ) -> Result<EventOutcome, PageError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.widget.id() == id)
            .ok_or_else(|| PageError::UnknownWidget(id.to_string()))?;
        if !slot.status.is_ready() {
            return Err(PageError::NotReady { id: id.to_string() });
        }
        let outcome = slot
            .widget
            .handle(event, out)
            .map_err(|source| PageError::Widget {
                id: id.to_string(),
                source,
            })?;
        tracing::trace!(target: "aidsec.page", widget = id, ?event, ?outcome, "event handled");
        Ok(outcome)
    }

    /// Send one event to every ready widget, ignoring per-widget failures.
    pub fn broadcast(&mut self, event: &UiEvent, out: &mut dyn DynRenderer) -> usize {
        let mut redrawn = 0;
        for slot in self.slots.iter_mut().filter(|slot| slot.status.is_ready()) {
            match slot.widget.handle(event, out) {
                Ok(EventOutcome::Redrawn) => redrawn += 1,
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(target: "aidsec.page", widget = slot.widget.id(), error = %err, "broadcast event failed");
                }
            }
        }
        redrawn
    }

    fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.widget.id() == id)
    }
}
