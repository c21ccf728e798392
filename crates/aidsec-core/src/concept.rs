#![forbid(unsafe_code)]

//! Concept → column resolution.
//!
//! Source headers drift across dataset releases ("Total nationals" vs
//! "Total nationals affected"), so widgets ask for a *concept* and a
//! [`ConceptTable`] decides which physical columns carry it.
//!
//! # Matching
//!
//! - [`Matcher::Exact`]: header equals the name.
//! - [`Matcher::Contains`]: case-sensitive substring.
//! - [`Matcher::Regex`]: `regex-lite` pattern, e.g. `(?i)details`.
//!
//! A concept with [`Take::First`] binds the first matching header in file
//! order; [`Take::All`] binds every match and the aggregator sums them.
//!
//! # Exclusive groups
//!
//! Concepts that share a `group` claim columns in table order. Once a column
//! is bound to one concept of a group, later concepts in the same group skip
//! it, so a rollup such as organization type never attributes one column to
//! two categories.
//!
//! # Loading
//!
//! ```toml
//! [[concept]]
//! name = "year"
//! contains = "Year"
//!
//! [[concept]]
//! name = "org_nrcs_ifrc"
//! regex = "NRCS|IFRC"
//! take = "all"
//! group = "org"
//! ```

use std::path::Path;
use std::sync::LazyLock;

use ahash::AHashMap;
use regex_lite::Regex;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Concept names used by the built-in table
// ---------------------------------------------------------------------------

pub const COUNTRY: &str = "country";
pub const COUNTRY_CODE: &str = "country_code";
pub const YEAR: &str = "year";
pub const LOCATION: &str = "location";
pub const DETAILS: &str = "details";
pub const GENDER_MALE: &str = "gender_male";
pub const GENDER_FEMALE: &str = "gender_female";
pub const GENDER_UNKNOWN: &str = "gender_unknown";
pub const TOTAL_NATIONALS: &str = "total_nationals";
pub const TOTAL_INTERNATIONALS: &str = "total_internationals";
pub const VERIFIED: &str = "verified";
pub const TOTAL: &str = "total";
pub const ORG_UN: &str = "org_un";
pub const ORG_INGO: &str = "org_ingo";
pub const ORG_ICRC: &str = "org_icrc";
pub const ORG_NRCS_IFRC: &str = "org_nrcs_ifrc";
pub const ORG_NNGO: &str = "org_nngo";
pub const ORG_OTHER: &str = "org_other";

/// Group shared by the organization-type concepts.
pub const ORG_GROUP: &str = "org";

// Literal patterns; `built_in_patterns_compile` covers them.
static DETAILS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)details").expect("details regex"));
static NRCS_IFRC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("NRCS|IFRC").expect("nrcs/ifrc regex"));

/// Errors building a concept table.
#[derive(Debug, Error)]
pub enum ConceptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("concept {name}: invalid regex: {source}")]
    Regex {
        name: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("concept {name}: expected exactly one of `exact`, `contains`, `regex`")]
    AmbiguousMatcher { name: String },

    #[error("duplicate concept name: {name}")]
    Duplicate { name: String },
}

/// How a header is tested against a concept.
#[derive(Debug, Clone)]
pub enum Matcher {
    Exact(String),
    Contains(String),
    Regex(Regex),
}

impl Matcher {
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    #[must_use]
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex_lite::Error> {
        Regex::new(pattern).map(Self::Regex)
    }

    #[must_use]
    pub fn matches(&self, header: &str) -> bool {
        match self {
            Self::Exact(name) => header == name,
            Self::Contains(needle) => header.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(header),
        }
    }
}

/// How many matching columns a concept binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Take {
    #[default]
    First,
    All,
}

/// A logical field resolved to one or more physical columns.
#[derive(Debug, Clone)]
pub struct Concept {
    pub name: String,
    pub matcher: Matcher,
    pub take: Take,
    pub group: Option<String>,
}

impl Concept {
    #[must_use]
    pub fn new(name: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            name: name.into(),
            matcher,
            take: Take::First,
            group: None,
        }
    }

    #[must_use]
    pub fn take_all(mut self) -> Self {
        self.take = Take::All;
        self
    }

    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConceptEntry {
    name: String,
    exact: Option<String>,
    contains: Option<String>,
    regex: Option<String>,
    #[serde(default)]
    take: Take,
    group: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConceptFile {
    #[serde(default)]
    concept: Vec<ConceptEntry>,
}

impl TryFrom<ConceptEntry> for Concept {
    type Error = ConceptError;

    fn try_from(entry: ConceptEntry) -> Result<Self, Self::Error> {
        let matcher = match (entry.exact, entry.contains, entry.regex) {
            (Some(name), None, None) => Matcher::Exact(name),
            (None, Some(needle), None) => Matcher::Contains(needle),
            (None, None, Some(pattern)) => {
                Matcher::regex(&pattern).map_err(|source| ConceptError::Regex {
                    name: entry.name.clone(),
                    source,
                })?
            }
            _ => return Err(ConceptError::AmbiguousMatcher { name: entry.name }),
        };
        Ok(Self {
            name: entry.name,
            matcher,
            take: entry.take,
            group: entry.group,
        })
    }
}

/// Ordered concept definitions.
#[derive(Debug, Clone, Default)]
pub struct ConceptTable {
    concepts: Vec<Concept>,
}

impl ConceptTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a concept. Names must be unique.
    pub fn push(&mut self, concept: Concept) -> Result<(), ConceptError> {
        if self.get(&concept.name).is_some() {
            return Err(ConceptError::Duplicate { name: concept.name });
        }
        self.concepts.push(concept);
        Ok(())
    }

    /// Builder-style [`push`](Self::push) for tables assembled in code.
    pub fn with(mut self, concept: Concept) -> Result<Self, ConceptError> {
        self.push(concept)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Concept> {
        self.concepts.iter().find(|concept| concept.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Load a table from TOML `[[concept]]` entries.
    pub fn from_toml_str(s: &str) -> Result<Self, ConceptError> {
        let file: ConceptFile = toml::from_str(s)?;
        let mut table = Self::new();
        for entry in file.concept {
            table.push(Concept::try_from(entry)?)?;
        }
        Ok(table)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConceptError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Concepts of `other` replace same-named concepts here; new names are appended.
    pub fn merge(&mut self, other: ConceptTable) {
        for concept in other.concepts {
            match self.concepts.iter_mut().find(|c| c.name == concept.name) {
                Some(slot) => *slot = concept,
                None => self.concepts.push(concept),
            }
        }
    }

    /// Built-in table for the security-incidents dataset.
    #[must_use]
    pub fn security_incidents() -> Self {
        let org = |name: &str, matcher: Matcher| {
            Concept::new(name, matcher).take_all().in_group(ORG_GROUP)
        };
        // Specific organization labels are listed before "UN" so a broader
        // match never claims their columns first.
        let concepts = vec![
            Concept::new(COUNTRY, Matcher::exact("Country")),
            Concept::new(COUNTRY_CODE, Matcher::exact("Country Code")),
            Concept::new(YEAR, Matcher::contains("Year")),
            Concept::new(LOCATION, Matcher::exact("Location")),
            Concept::new(DETAILS, Matcher::Regex(DETAILS_PATTERN.clone())),
            Concept::new(GENDER_MALE, Matcher::contains("Gender Male")),
            Concept::new(GENDER_FEMALE, Matcher::contains("Gender Female")),
            Concept::new(GENDER_UNKNOWN, Matcher::contains("Gender Unknown")),
            Concept::new(TOTAL_NATIONALS, Matcher::contains("Total nationals")),
            Concept::new(TOTAL_INTERNATIONALS, Matcher::contains("Total internationals")),
            Concept::new(VERIFIED, Matcher::exact("Verified")),
            Concept::new(TOTAL, Matcher::exact("Total")),
            org(ORG_ICRC, Matcher::contains("ICRC")),
            org(ORG_NRCS_IFRC, Matcher::Regex(NRCS_IFRC_PATTERN.clone())),
            org(ORG_NNGO, Matcher::contains("NNGO")),
            org(ORG_INGO, Matcher::contains("INGO")),
            org(ORG_UN, Matcher::contains("UN")),
            org(ORG_OTHER, Matcher::contains("Other")),
        ];
        Self { concepts }
    }

    /// Resolve every concept against a header list.
    #[must_use]
    pub fn bind(&self, headers: &[String]) -> Bindings {
        let mut columns: AHashMap<String, Vec<usize>> = AHashMap::with_capacity(self.len());
        let mut claimed: AHashMap<&str, Vec<usize>> = AHashMap::new();

        for concept in &self.concepts {
            let taken = concept
                .group
                .as_deref()
                .and_then(|group| claimed.get(group))
                .map_or(&[][..], Vec::as_slice);
            let mut matches = headers
                .iter()
                .enumerate()
                .filter(|(idx, header)| !taken.contains(idx) && concept.matcher.matches(header))
                .map(|(idx, _)| idx);
            let bound: Vec<usize> = match concept.take {
                Take::First => matches.next().into_iter().collect(),
                Take::All => matches.collect(),
            };
            if let Some(group) = concept.group.as_deref() {
                claimed.entry(group).or_default().extend(&bound);
            }
            if bound.is_empty() {
                tracing::debug!(
                    target: "aidsec.concept",
                    concept = %concept.name,
                    "no header matches concept"
                );
            }
            columns.insert(concept.name.clone(), bound);
        }
        Bindings { columns }
    }
}

/// Concept → column indexes for one header list.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    columns: AHashMap<String, Vec<usize>>,
}

impl Bindings {
    /// Bound columns for a concept; empty when the concept is unknown or unmatched.
    #[must_use]
    pub fn columns(&self, concept: &str) -> &[usize] {
        self.columns.get(concept).map_or(&[], Vec::as_slice)
    }

    /// First bound column for a concept.
    #[must_use]
    pub fn first(&self, concept: &str) -> Option<usize> {
        self.columns(concept).first().copied()
    }

    #[must_use]
    pub fn is_bound(&self, concept: &str) -> bool {
        !self.columns(concept).is_empty()
    }
}
