//! Locale catalogue sources
//!
//! The catalogue is the external snapshot of locale records the generator
//! consumes. It is read exactly once per run, before any derivation.
//!
//! ## JSON format
//! ```json
//! [
//!   {
//!     "name": "en-US",
//!     "lcid": 1033,
//!     "english_name": "English (United States)",
//!     "is_neutral": false,
//!     "two_letter_language": "en",
//!     "three_letter_language": "eng",
//!     "region": {
//!       "two_letter_code": "US",
//!       "three_letter_code": "USA",
//!       "english_name": "United States",
//!       "geo_id": 244
//!     }
//!   }
//! ]
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// A raw locale entry as yielded by the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    /// Locale name, e.g. `en-US`. Empty for the invariant locale.
    pub name: String,

    /// Numeric locale identifier (LCID)
    pub lcid: i32,

    /// English display name of the locale
    pub english_name: String,

    /// Neutral locales name a language without a country
    #[serde(default)]
    pub is_neutral: bool,

    /// ISO 639-1 language code; falls back to the primary subtag of `name`
    #[serde(default)]
    pub two_letter_language: Option<String>,

    /// ISO 639-2 language code; falls back to the primary subtag of `name`
    #[serde(default)]
    pub three_letter_language: Option<String>,

    /// Region data, when the catalogue can resolve one
    #[serde(default)]
    pub region: Option<RegionData>,
}

/// Region data attached to a catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionData {
    pub two_letter_code: String,
    pub three_letter_code: String,
    pub english_name: String,
    pub geo_id: i32,
}

impl CatalogueEntry {
    pub fn new(name: impl Into<String>, lcid: i32, english_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lcid,
            english_name: english_name.into(),
            is_neutral: false,
            two_letter_language: None,
            three_letter_language: None,
            region: None,
        }
    }

    pub fn neutral(mut self) -> Self {
        self.is_neutral = true;
        self
    }

    pub fn with_languages(mut self, iso2: impl Into<String>, iso3: impl Into<String>) -> Self {
        self.two_letter_language = Some(iso2.into());
        self.three_letter_language = Some(iso3.into());
        self
    }

    pub fn with_region(
        mut self,
        two_letter_code: impl Into<String>,
        three_letter_code: impl Into<String>,
        english_name: impl Into<String>,
        geo_id: i32,
    ) -> Self {
        self.region = Some(RegionData {
            two_letter_code: two_letter_code.into(),
            three_letter_code: three_letter_code.into(),
            english_name: english_name.into(),
            geo_id,
        });
        self
    }

    /// The invariant (root) pseudo-locale has no name
    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }

    /// Primary language subtag of the locale name (`sr-Latn-RS` -> `sr`)
    pub fn primary_subtag(&self) -> &str {
        self.name.split(['-', '_']).next().unwrap_or_default()
    }

    /// ISO 639-1 code, lower-cased
    pub fn language_iso2(&self) -> String {
        self.two_letter_language
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| self.primary_subtag())
            .trim()
            .to_lowercase()
    }

    /// ISO 639-2 code, lower-cased
    pub fn language_iso3(&self) -> String {
        self.three_letter_language
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| self.primary_subtag())
            .trim()
            .to_lowercase()
    }
}

/// Anything that can yield a catalogue snapshot
pub trait CatalogueSource {
    /// Read the full snapshot. Failing here is fatal for the run.
    fn entries(&self) -> Result<Vec<CatalogueEntry>>;
}

impl CatalogueSource for Vec<CatalogueEntry> {
    fn entries(&self) -> Result<Vec<CatalogueEntry>> {
        Ok(self.clone())
    }
}

impl CatalogueSource for [CatalogueEntry] {
    fn entries(&self) -> Result<Vec<CatalogueEntry>> {
        Ok(self.to_vec())
    }
}

/// Catalogue stored as a JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonCatalogue {
    path: PathBuf,
}

impl JsonCatalogue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a catalogue from JSON text
    pub fn parse(content: &str) -> Result<Vec<CatalogueEntry>> {
        serde_json::from_str(content).map_err(|e| GenerationError::CatalogueFormat(e.to_string()))
    }
}

impl CatalogueSource for JsonCatalogue {
    fn entries(&self) -> Result<Vec<CatalogueEntry>> {
        if !self.path.is_file() {
            return Err(GenerationError::MissingCatalogue {
                path: self.path.clone(),
            });
        }
        let content = fs::read_to_string(&self.path)?;
        let entries = Self::parse(&content)?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "loaded catalogue");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_fallback_to_subtag() {
        let entry = CatalogueEntry::new("sr-Latn-RS", 9242, "Serbian (Latin, Serbia)");
        assert_eq!(entry.language_iso2(), "sr");
        assert_eq!(entry.language_iso3(), "sr");

        let entry = entry.with_languages("SR", "srp");
        assert_eq!(entry.language_iso2(), "sr");
        assert_eq!(entry.language_iso3(), "srp");
    }

    #[test]
    fn test_invariant_locale() {
        assert!(CatalogueEntry::new("", 127, "Invariant Language").is_invariant());
        assert!(!CatalogueEntry::new("en-US", 1033, "English").is_invariant());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"[
            {"name": "en", "lcid": 9, "english_name": "English", "is_neutral": true},
            {"name": "en-US", "lcid": 1033, "english_name": "English (United States)",
             "region": {"two_letter_code": "US", "three_letter_code": "USA",
                        "english_name": "United States", "geo_id": 244}}
        ]"#;
        let entries = JsonCatalogue::parse(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_neutral);
        assert!(entries[0].region.is_none());
        assert_eq!(entries[1].region.as_ref().unwrap().geo_id, 244);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = JsonCatalogue::parse("{not json").unwrap_err();
        assert!(matches!(err, GenerationError::CatalogueFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let catalogue = JsonCatalogue::new("/definitely/not/here.json");
        let err = catalogue.entries().unwrap_err();
        assert!(matches!(err, GenerationError::MissingCatalogue { .. }));
    }
}
