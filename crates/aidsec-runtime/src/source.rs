#![forbid(unsafe_code)]

//! CSV transport.
//!
//! A [`CsvSource`] returns the raw text stored at a path. The CLI provides
//! file and HTTP sources; [`StaticSource`] serves fixed text from memory.

use std::cell::Cell;

use ahash::AHashMap;
use thiserror::Error;

/// Why a fetch produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport failure for {path}: {message}")]
    Transport { path: String, message: String },

    #[error("HTTP error! status: {status} ({path})")]
    Status { path: String, status: u16 },

    #[error("not found: {path}")]
    NotFound { path: String },
}

/// Raw text by path.
pub trait CsvSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

impl<S: CsvSource + ?Sized> CsvSource for &S {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        (**self).fetch(path)
    }
}

impl<S: CsvSource + ?Sized> CsvSource for Box<S> {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        (**self).fetch(path)
    }
}

/// In-memory source with per-path responses.
#[derive(Debug, Default)]
pub struct StaticSource {
    responses: AHashMap<String, Result<String, FetchError>>,
    requests: Cell<usize>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` at `path`.
    #[must_use]
    pub fn with_text(mut self, path: &str, text: impl Into<String>) -> Self {
        self.responses.insert(path.to_string(), Ok(text.into()));
        self
    }

    /// Fail every request for `path` with `error`.
    #[must_use]
    pub fn with_error(mut self, path: &str, error: FetchError) -> Self {
        self.responses.insert(path.to_string(), Err(error));
        self
    }

    /// Number of fetches served so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl CsvSource for StaticSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.requests.set(self.requests.get() + 1);
        self.responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound { path: path.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_serves_text_errors_and_not_found() {
        let source = StaticSource::new()
            .with_text("a.csv", "x\n1\n")
            .with_error(
                "b.csv",
                FetchError::Status {
                    path: "b.csv".into(),
                    status: 503,
                },
            );
        assert_eq!(source.fetch("a.csv").unwrap(), "x\n1\n");
        assert!(matches!(
            source.fetch("b.csv"),
            Err(FetchError::Status { status: 503, .. })
        ));
        assert!(matches!(source.fetch("c.csv"), Err(FetchError::NotFound { .. })));
        assert_eq!(source.requests(), 3);
    }
}
