//! Record Ingestion
//!
//! Turns the raw catalogue into country groups: one [`CountryGroup`] per
//! distinct [`RegionKey`], each holding the locale records mapped to it in
//! catalogue order.
//!
//! Ingestion is best-effort. A record that cannot be mapped to a concrete
//! country is dropped and noted in [`Diagnostics`]; it never aborts the run.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::catalogue::{CatalogueEntry, RegionData};
use crate::diagnostics::{DiagnosticCode, Diagnostics};

/// A locale record that survived ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRecord {
    pub locale_name: String,
    pub locale_id: i32,
    pub english_name: String,
    /// Lower-cased ISO 639-1 code
    pub language_iso2: String,
    /// Lower-cased ISO 639-2 code
    pub language_iso3: String,
}

impl LocaleRecord {
    fn from_entry(entry: &CatalogueEntry) -> Self {
        Self {
            locale_name: entry.name.clone(),
            locale_id: entry.lcid,
            english_name: entry.english_name.clone(),
            language_iso2: entry.language_iso2(),
            language_iso3: entry.language_iso3(),
        }
    }
}

/// Canonical identity of a country.
///
/// Equality and hashing consider the two-letter code only.
#[derive(Debug, Clone)]
pub struct RegionKey {
    pub two_letter_code: String,
    pub three_letter_code: String,
    pub geo_id: i32,
    pub english_name: String,
}

impl PartialEq for RegionKey {
    fn eq(&self, other: &Self) -> bool {
        self.two_letter_code == other.two_letter_code
    }
}

impl Eq for RegionKey {}

impl Hash for RegionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.two_letter_code.hash(state);
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.english_name, self.two_letter_code)
    }
}

/// One country and its locales
#[derive(Debug, Clone)]
pub struct CountryGroup {
    pub region: RegionKey,
    pub locales: Vec<LocaleRecord>,
}

/// Why a catalogue entry was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRejection {
    Invariant,
    Neutral,
    UnresolvableRegion,
    MalformedRegionCode(String),
}

impl RecordRejection {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::Invariant => DiagnosticCode::InvariantLocale,
            Self::Neutral => DiagnosticCode::NeutralLocale,
            Self::UnresolvableRegion => DiagnosticCode::UnresolvableRegion,
            Self::MalformedRegionCode(_) => DiagnosticCode::MalformedRegionCode,
        }
    }
}

impl fmt::Display for RecordRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invariant => write!(f, "invariant locale"),
            Self::Neutral => write!(f, "neutral locale has no country"),
            Self::UnresolvableRegion => write!(f, "region could not be resolved"),
            Self::MalformedRegionCode(code) => write!(f, "region code '{}' is not alphabetic", code),
        }
    }
}

/// Resolve the region of a single entry
pub fn resolve_region(entry: &CatalogueEntry) -> Result<RegionKey, RecordRejection> {
    if entry.is_invariant() {
        return Err(RecordRejection::Invariant);
    }
    if entry.is_neutral {
        return Err(RecordRejection::Neutral);
    }
    let region = entry.region.as_ref().ok_or(RecordRejection::UnresolvableRegion)?;
    region_key(region)
}

fn region_key(region: &RegionData) -> Result<RegionKey, RecordRejection> {
    let two = region.two_letter_code.trim();
    let three = region.three_letter_code.trim();
    if two.is_empty() || three.is_empty() {
        return Err(RecordRejection::UnresolvableRegion);
    }
    if !two.chars().all(char::is_alphabetic) {
        return Err(RecordRejection::MalformedRegionCode(two.to_string()));
    }
    Ok(RegionKey {
        two_letter_code: two.to_string(),
        three_letter_code: three.to_string(),
        geo_id: region.geo_id,
        english_name: region.english_name.clone(),
    })
}

/// Group catalogue entries by region.
///
/// Groups come back in order of first appearance in the catalogue; that order
/// is the processing order later used for first-seen-wins conflicts.
pub fn ingest(entries: &[CatalogueEntry], diagnostics: &mut Diagnostics) -> Vec<CountryGroup> {
    let mut groups: Vec<CountryGroup> = Vec::new();
    let mut index: HashMap<RegionKey, usize> = HashMap::new();

    for entry in entries {
        let region = match resolve_region(entry) {
            Ok(region) => region,
            Err(rejection) => {
                tracing::debug!(locale = %entry.name, reason = %rejection, "dropping catalogue entry");
                diagnostics.record(entry.name.as_str(), rejection.code(), rejection.to_string());
                continue;
            }
        };

        let record = LocaleRecord::from_entry(entry);
        match index.get(&region) {
            Some(&i) => groups[i].locales.push(record),
            None => {
                index.insert(region.clone(), groups.len());
                groups.push(CountryGroup {
                    region,
                    locales: vec![record],
                });
            }
        }
    }

    tracing::debug!(countries = groups.len(), "ingested catalogue");
    groups
}
