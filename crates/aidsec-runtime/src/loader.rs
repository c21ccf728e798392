#![forbid(unsafe_code)]

//! Dataset loaders.
//!
//! # Design
//! Every widget on the page reads the same CSV. [`SharedLoader`] fetches and
//! parses each path once and hands out `Rc<Dataset>` clones afterwards. A
//! failed load is cached as well, so a page with nine widgets reports one
//! transport error rather than nine. [`DirectLoader`] fetches on every call
//! and exists for hosts that want per-widget independence.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ahash::AHashMap;
use aidsec_core::{Dataset, parse_csv};
use thiserror::Error;
use web_time::Instant;

use crate::source::{CsvSource, FetchError};

/// A dataset could not be produced for `path`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {path}: {source}")]
pub struct LoadError {
    pub path: String,
    #[source]
    pub source: FetchError,
}

/// Produces parsed datasets by path.
pub trait Loader {
    fn load(&self, path: &str) -> Result<Rc<Dataset>, LoadError>;

    /// Number of transport fetches issued so far.
    fn fetch_count(&self) -> usize;
}

fn fetch_and_parse<S: CsvSource>(source: &S, path: &str) -> Result<Dataset, LoadError> {
    let started = Instant::now();
    let text = source.fetch(path).map_err(|source| LoadError {
        path: path.to_string(),
        source,
    })?;
    let dataset = parse_csv(&text);
    tracing::debug!(
        target: "aidsec.loader",
        path,
        rows = dataset.len(),
        skipped_rows = dataset.skipped_rows,
        duration_us = started.elapsed().as_micros() as u64,
        "dataset parsed"
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// DirectLoader
// ---------------------------------------------------------------------------

/// Fetches and parses on every call.
#[derive(Debug)]
pub struct DirectLoader<S> {
    source: S,
    fetches: Cell<usize>,
}

impl<S: CsvSource> DirectLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            fetches: Cell::new(0),
        }
    }
}

impl<S: CsvSource> Loader for DirectLoader<S> {
    fn load(&self, path: &str) -> Result<Rc<Dataset>, LoadError> {
        self.fetches.set(self.fetches.get() + 1);
        fetch_and_parse(&self.source, path).map(Rc::new)
    }

    fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

// ---------------------------------------------------------------------------
// SharedLoader
// ---------------------------------------------------------------------------

/// Memoizes one load per path, success or failure.
#[derive(Debug)]
pub struct SharedLoader<S> {
    source: S,
    cache: RefCell<AHashMap<String, Result<Rc<Dataset>, LoadError>>>,
    fetches: Cell<usize>,
}

impl<S: CsvSource> SharedLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RefCell::new(AHashMap::new()),
            fetches: Cell::new(0),
        }
    }

    /// Drop every cached entry; the next load per path fetches again.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    #[must_use]
    pub fn cached_paths(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<S: CsvSource> Loader for SharedLoader<S> {
    fn load(&self, path: &str) -> Result<Rc<Dataset>, LoadError> {
        if let Some(hit) = self.cache.borrow().get(path) {
            tracing::trace!(target: "aidsec.loader", path, ok = hit.is_ok(), "cache hit");
            return hit.clone();
        }
        self.fetches.set(self.fetches.get() + 1);
        let result = fetch_and_parse(&self.source, path).map(Rc::new);
        if let Err(err) = &result {
            tracing::warn!(target: "aidsec.loader", path, error = %err, "load failed; caching failure");
        }
        self.cache
            .borrow_mut()
            .insert(path.to_string(), result.clone());
        result
    }

    fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl<L: Loader + ?Sized> Loader for Box<L> {
    fn load(&self, path: &str) -> Result<Rc<Dataset>, LoadError> {
        (**self).load(path)
    }

    fn fetch_count(&self) -> usize {
        (**self).fetch_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    const CSV: &str = "Country,Year\nKenya,2020\nSudan,2021\n";

    #[test]
    fn shared_loader_fetches_once_per_path() {
        let source = StaticSource::new().with_text("d.csv", CSV);
        let loader = SharedLoader::new(&source);
        let a = loader.load("d.csv").unwrap();
        let b = loader.load("d.csv").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 2);
        assert_eq!(loader.fetch_count(), 1);
        assert_eq!(source.requests(), 1);
    }

    #[test]
    fn shared_loader_caches_failures() {
        let source = StaticSource::new().with_error(
            "d.csv",
            FetchError::Status {
                path: "d.csv".into(),
                status: 404,
            },
        );
        let loader = SharedLoader::new(&source);
        let first = loader.load("d.csv").unwrap_err();
        let second = loader.load("d.csv").unwrap_err();
        assert_eq!(first, second);
        assert_eq!(source.requests(), 1);
        assert!(first.to_string().contains("status: 404"));
    }

    #[test]
    fn clear_forces_refetch() {
        let source = StaticSource::new().with_text("d.csv", CSV);
        let loader = SharedLoader::new(&source);
        loader.load("d.csv").unwrap();
        loader.clear();
        assert_eq!(loader.cached_paths(), 0);
        loader.load("d.csv").unwrap();
        assert_eq!(loader.fetch_count(), 2);
    }

    #[test]
    fn direct_loader_fetches_every_time() {
        let source = StaticSource::new().with_text("d.csv", CSV);
        let loader = DirectLoader::new(&source);
        let a = loader.load("d.csv").unwrap();
        let b = loader.load("d.csv").unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(loader.fetch_count(), 2);
    }

    #[test]
    fn boxed_loader_delegates() {
        let source = StaticSource::new().with_text("d.csv", CSV);
        let loader: Box<dyn Loader + '_> = Box::new(SharedLoader::new(&source));
        loader.load("d.csv").unwrap();
        loader.load("d.csv").unwrap();
        assert_eq!(loader.fetch_count(), 1);
    }
}
