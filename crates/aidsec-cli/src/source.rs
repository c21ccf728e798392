#![forbid(unsafe_code)]

//! Concrete CSV transports.
//!
//! - [`FileSource`]: reads a path relative to an optional root directory.
//! - [`HttpSource`]: GETs a URL, or a path joined onto a base URL.
//!
//! [`open_source`] picks one from a `--data` style location.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aidsec_runtime::{CsvSource, FetchError};
use reqwest::blocking::Client;

use crate::error::Result;

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    #[must_use]
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) if Path::new(path).is_relative() => root.join(path),
            _ => PathBuf::from(path),
        }
    }
}

impl CsvSource for FileSource {
    fn fetch(&self, path: &str) -> std::result::Result<String, FetchError> {
        let resolved = self.resolve(path);
        let bytes = std::fs::read(&resolved).map_err(|error| match error.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound {
                path: resolved.display().to_string(),
            },
            _ => FetchError::Transport {
                path: resolved.display().to_string(),
                message: error.to_string(),
            },
        })?;
        Ok(decode_lossy(&resolved, bytes))
    }
}

/// Decode as UTF-8, replacing invalid sequences the way an HTTP body is decoded.
fn decode_lossy(path: &Path, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => {
            let text = String::from_utf8_lossy(error.as_bytes()).into_owned();
            tracing::warn!(
                target: "aidsec.file",
                path = %path.display(),
                valid_up_to = error.utf8_error().valid_up_to(),
                "file is not valid UTF-8; invalid bytes replaced"
            );
            text
        }
    }
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: Option<String>,
}

impl HttpSource {
    /// Source that treats every path as a full URL.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base: None })
    }

    /// Source that joins relative paths onto `base`.
    pub fn with_base(base: impl Into<String>) -> Result<Self> {
        let mut source = Self::new()?;
        source.base = Some(base.into());
        Ok(source)
    }

    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        match &self.base {
            Some(base) if !is_url(path) => {
                format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
            }
            _ => path.to_string(),
        }
    }
}

impl CsvSource for HttpSource {
    fn fetch(&self, path: &str) -> std::result::Result<String, FetchError> {
        let url = self.url_for(path);
        let transport = |error: reqwest::Error| FetchError::Transport {
            path: url.clone(),
            message: error.to_string(),
        };
        let response = self.client.get(&url).send().map_err(transport)?;
        let status = response.status();
        tracing::debug!(target: "aidsec.http", url = %url, status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(FetchError::Status {
                path: url,
                status: status.as_u16(),
            });
        }
        response.text().map_err(transport)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Whether `location` names an HTTP(S) resource.
#[must_use]
pub fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// HTTP for URLs, the filesystem for everything else.
pub fn open_source(location: &str) -> Result<Box<dyn CsvSource>> {
    if is_url(location) {
        Ok(Box::new(HttpSource::new()?))
    } else {
        Ok(Box::new(FileSource::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::rooted(dir.path());
        assert!(matches!(
            source.fetch("absent.csv"),
            Err(FetchError::NotFound { .. })
        ));
    }

    #[test]
    fn rooted_source_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("data.csv")).unwrap();
        writeln!(file, "Year,Country").unwrap();
        let source = FileSource::rooted(dir.path());
        assert_eq!(source.fetch("data.csv").unwrap(), "Year,Country\n");
    }

    #[test]
    fn latin1_bytes_are_replaced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("latin1.csv"),
            b"Country,Year\nC\xF4te d'Ivoire,2020\nChad,2021\n",
        )
        .unwrap();
        let text = FileSource::rooted(dir.path()).fetch("latin1.csv").unwrap();
        assert!(text.starts_with("Country,Year\nC\u{FFFD}te d'Ivoire,2020"));

        let dataset = aidsec_core::parse_csv(&text);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[1].get("Country"), Some("Chad"));
    }

    #[test]
    fn base_url_joins_relative_paths() {
        let source = HttpSource::with_base("http://127.0.0.1:1/data/").unwrap();
        assert_eq!(source.url_for("/incidents.csv"), "http://127.0.0.1:1/data/incidents.csv");
        assert_eq!(source.url_for("https://example.org/x.csv"), "https://example.org/x.csv");
    }

    #[test]
    fn url_detection_ignores_case() {
        assert!(is_url("HTTPS://example.org/a.csv"));
        assert!(!is_url("data/security_incidents.csv"));
    }
}
