//! Country allow-list filter
//!
//! The allow-list file name selects the field to match:
//! - `IsoCode2*` matches the two-letter region code
//! - `IsoCode3*` matches the three-letter region code
//! - anything else matches the region's english name
//!
//! Content is one value per line; lines are trimmed and blank lines ignored.
//! Matching is exact and case-sensitive.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{GenerationError, Result};
use crate::ingest::{CountryGroup, RegionKey};

/// Which region field an allow-list is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    TwoLetterCode,
    ThreeLetterCode,
    EnglishName,
}

impl FilterField {
    /// Pick the field from the allow-list's file name
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.starts_with("IsoCode2") {
            Self::TwoLetterCode
        } else if file_name.starts_with("IsoCode3") {
            Self::ThreeLetterCode
        } else {
            Self::EnglishName
        }
    }

    fn pick<'a>(&self, region: &'a RegionKey) -> &'a str {
        match self {
            Self::TwoLetterCode => &region.two_letter_code,
            Self::ThreeLetterCode => &region.three_letter_code,
            Self::EnglishName => &region.english_name,
        }
    }
}

/// Parsed allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    pub field: FilterField,
    pub values: HashSet<String>,
}

impl AllowList {
    pub fn parse(file_name: &str, content: &str) -> Self {
        let values = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            field: FilterField::from_file_name(file_name),
            values,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GenerationError::AllowList {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::parse(&file_name, &content))
    }

    pub fn accepts(&self, region: &RegionKey) -> bool {
        self.values.contains(self.field.pick(region))
    }
}

/// Predicate over region keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegionFilter {
    #[default]
    AcceptAll,
    AllowList(AllowList),
}

impl RegionFilter {
    /// Build a filter from an optional allow-list file.
    ///
    /// An allow-list without any values accepts everything.
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::AcceptAll),
            Some(path) => Ok(Self::from_allow_list(AllowList::load(path)?)),
        }
    }

    pub fn from_allow_list(list: AllowList) -> Self {
        if list.values.is_empty() {
            Self::AcceptAll
        } else {
            Self::AllowList(list)
        }
    }

    pub fn accepts(&self, region: &RegionKey) -> bool {
        match self {
            Self::AcceptAll => true,
            Self::AllowList(list) => list.accepts(region),
        }
    }

    /// Drop whole groups the filter rejects
    pub fn apply(&self, groups: Vec<CountryGroup>, diagnostics: &mut Diagnostics) -> Vec<CountryGroup> {
        groups
            .into_iter()
            .filter(|group| {
                let keep = self.accepts(&group.region);
                if !keep {
                    diagnostics.record(
                        group.region.two_letter_code.as_str(),
                        DiagnosticCode::FilteredOut,
                        format!("'{}' is not on the allow-list", group.region.english_name),
                    );
                }
                keep
            })
            .collect()
    }
}
