#![forbid(unsafe_code)]

//! Runtime: data loading, selection state, and widget hosting for the page.
//!
//! # Role in aidsec
//! `aidsec-runtime` sits between the data core and the renderer. It owns the
//! per-page pieces of mutable state and the rules for changing them:
//!
//! - **Loader**: fetches and parses the CSV; [`SharedLoader`] memoizes by
//!   path so every widget reads one parse.
//! - **Selection**: [`DropdownSelection`] for country filters and
//!   [`ScrollController`] for scroll-revealed time series.
//! - **Page**: hosts [`Widget`]s, isolates their failures, routes UI events.
//! - **Config**: [`PageConfig`] loaded from TOML or JSON.
//!
//! Everything here runs on one thread; shared state uses `Rc`/`RefCell`.

pub mod config;
pub mod loader;
pub mod page;
pub mod scroll;
pub mod selection;
pub mod source;
pub mod widget;

pub use config::{ConfigError, PageConfig};
pub use loader::{DirectLoader, LoadError, Loader, SharedLoader};
pub use page::{Page, PageError};
pub use scroll::{Direction, HijackState, ListenerAction, ScrollConfig, ScrollController, WheelOutcome};
pub use selection::{DropdownSelection, SelectOutcome};
pub use source::{CsvSource, FetchError, StaticSource};
pub use widget::{
    DynRenderer, EventOutcome, RenderFailure, UiEvent, Widget, WidgetContext, WidgetError,
    WidgetStatus,
};
