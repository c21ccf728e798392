#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Groups every tunable value of the page into one struct loadable from TOML
//! or JSON. Missing fields fall back to the page defaults.
//!
//! # Example (TOML)
//!
//! ```toml
//! data_path = "data/security_incidents.csv"
//! year_cap = 2024
//! top_locations = 15
//!
//! [scroll]
//! sensitivity = 0.005
//! min_delta = 5.0
//! ```

use std::path::{Path, PathBuf};

use aidsec_core::{ConceptError, ConceptTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scroll::ScrollConfig;

/// Default location of the incidents CSV.
pub const DEFAULT_DATA_PATH: &str = "data/security_incidents.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Path handed to the loader for every widget.
    pub data_path: String,

    /// Latest year shown by the time series widgets. `None` shows all.
    pub year_cap: Option<i64>,

    /// Bars in the locations chart.
    pub top_locations: usize,

    /// Words in the word cloud.
    pub top_words: usize,

    pub scroll: ScrollConfig,

    /// Share one parse of the CSV across widgets.
    pub shared_loader: bool,

    /// Extra `[[concept]]` definitions merged over the built-in table.
    pub concepts_file: Option<PathBuf>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            data_path: DEFAULT_DATA_PATH.to_string(),
            year_cap: Some(2024),
            top_locations: 15,
            top_words: 100,
            scroll: ScrollConfig::default(),
            shared_loader: true,
            concepts_file: None,
        }
    }
}

impl PageConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load by extension: `.json` as JSON, anything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.data_path.trim().is_empty() {
            errors.push("data_path must not be empty".into());
        }
        if self.top_locations == 0 {
            errors.push("top_locations must be > 0".into());
        }
        if self.top_words == 0 {
            errors.push("top_words must be > 0".into());
        }
        if let Some(cap) = self.year_cap
            && cap < 0
        {
            errors.push(format!("year_cap must be >= 0, got {cap}"));
        }
        errors.extend(self.scroll.validate());

        errors
    }

    /// Validate, turning any problems into an error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Built-in concepts, with `concepts_file` merged on top when set.
    pub fn concept_table(&self) -> Result<ConceptTable, ConfigError> {
        let mut table = ConceptTable::security_incidents();
        if let Some(path) = &self.concepts_file {
            let extra = ConceptTable::from_toml_file(path)?;
            tracing::debug!(
                target: "aidsec.config",
                path = %path.display(),
                concepts = extra.len(),
                "merging concept overrides"
            );
            table.merge(extra);
        }
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a page configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error(transparent)]
    Concepts(#[from] ConceptError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_validates_clean() {
        let errors = PageConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn defaults_match_page() {
        let config = PageConfig::default();
        assert_eq!(config.data_path, DEFAULT_DATA_PATH);
        assert_eq!(config.year_cap, Some(2024));
        assert_eq!(config.top_locations, 15);
        assert_eq!(config.top_words, 100);
        assert!(config.shared_loader);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PageConfig::from_toml_str("top_words = 50\n[scroll]\nmin_delta = 2.0\n").unwrap();
        assert_eq!(config.top_words, 50);
        assert_eq!(config.scroll.min_delta, 2.0);
        assert_eq!(config.scroll.sensitivity, 0.005);
        assert_eq!(config.top_locations, 15);
    }

    #[test]
    fn json_round_trips_through_serde() {
        let config = PageConfig {
            year_cap: None,
            ..PageConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PageConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            PageConfig::from_toml_str("colour = \"red\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn validate_catches_zero_counts() {
        let config = PageConfig {
            top_locations: 0,
            top_words: 0,
            ..PageConfig::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("top_locations")));
        assert!(errors.iter().any(|e| e.contains("top_words")));
        assert!(matches!(config.validated(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("page.json");
        std::fs::write(&json, r#"{"top_locations": 5}"#).unwrap();
        assert_eq!(PageConfig::from_file(&json).unwrap().top_locations, 5);

        let toml_path = dir.path().join("page.toml");
        let mut file = std::fs::File::create(&toml_path).unwrap();
        writeln!(file, "year_cap = 2020").unwrap();
        assert_eq!(PageConfig::from_file(&toml_path).unwrap().year_cap, Some(2020));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            PageConfig::from_toml_file("/nonexistent/aidsec.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn concepts_file_merges_over_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concepts.toml");
        std::fs::write(
            &path,
            "[[concept]]\nname = \"country\"\nexact = \"Nation\"\n",
        )
        .unwrap();
        let config = PageConfig {
            concepts_file: Some(path),
            ..PageConfig::default()
        };
        let table = config.concept_table().unwrap();
        let bindings = table.bind(&["Nation".to_string(), "Year".to_string()]);
        assert_eq!(bindings.first(aidsec_core::concept::COUNTRY), Some(0));
        assert_eq!(bindings.first(aidsec_core::concept::YEAR), Some(1));
    }
}
