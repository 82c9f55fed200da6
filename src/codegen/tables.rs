//! Enumeration and cross-reference tables
//!
//! These are the in-memory counterparts of the generated artifacts. They are
//! built once per run and never mutated afterwards; the emitters only ever
//! read from them.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::{GenerationError, Result};

// =============================================================================
// Enum Families
// =============================================================================

/// One identifier family, i.e. one generated enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EnumFamily {
    Country,
    CountryIso2Code,
    CountryIso3Code,
    LocaleCode,
    LanguageIso2Code,
    LanguageIso3Code,
}

impl EnumFamily {
    pub const ALL: [EnumFamily; 6] = [
        Self::Country,
        Self::CountryIso2Code,
        Self::CountryIso3Code,
        Self::LocaleCode,
        Self::LanguageIso2Code,
        Self::LanguageIso3Code,
    ];

    /// Families sharing the geo-id space
    pub const COUNTRY: [EnumFamily; 3] = [Self::CountryIso2Code, Self::CountryIso3Code, Self::Country];

    /// Families sharing the language ordinal space
    pub const LANGUAGE: [EnumFamily; 2] = [Self::LanguageIso2Code, Self::LanguageIso3Code];

    /// Type name of the generated enum
    pub fn name(&self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::CountryIso2Code => "CountryIso2Code",
            Self::CountryIso3Code => "CountryIso3Code",
            Self::LocaleCode => "LocaleCode",
            Self::LanguageIso2Code => "LanguageIso2Code",
            Self::LanguageIso3Code => "LanguageIso3Code",
        }
    }

    /// Module name of the generated enum inside `enums`
    pub fn module(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::CountryIso2Code => "country_iso2_code",
            Self::CountryIso3Code => "country_iso3_code",
            Self::LocaleCode => "locale_code",
            Self::LanguageIso2Code => "language_iso2_code",
            Self::LanguageIso3Code => "language_iso3_code",
        }
    }

    pub fn documentation(&self) -> &'static str {
        match self {
            Self::Country => "Represents a country.",
            Self::CountryIso2Code => "Represents the ISO 3166 ALPHA-2 code of a country.",
            Self::CountryIso3Code => "Represents the ISO 3166 ALPHA-3 code of a country.",
            Self::LocaleCode => "Represents the locale code.",
            Self::LanguageIso2Code => "Represents the ISO 639-1 code of a language.",
            Self::LanguageIso3Code => "Represents the ISO 639-2 code of a language.",
        }
    }

    pub fn is_country(&self) -> bool {
        Self::COUNTRY.contains(self)
    }

    pub fn is_language(&self) -> bool {
        Self::LANGUAGE.contains(self)
    }
}

impl fmt::Display for EnumFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Enum Table
// =============================================================================

/// One member of a generated enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub symbol: String,
    pub id: i32,
    /// Originating english name
    pub english_name: String,
    /// Originating region or locale code
    pub code: String,
}

impl EnumMember {
    /// Doc line rendered above the member
    pub fn documentation(&self) -> String {
        format!("{} - {}", self.english_name, self.code)
    }
}

impl fmt::Display for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.english_name, self.code)
    }
}

/// An injective symbol -> identifier mapping, sorted by symbol
#[derive(Debug, Clone)]
pub struct EnumTable {
    family: EnumFamily,
    members: Vec<EnumMember>,
    by_symbol: HashMap<String, usize>,
    by_id: HashMap<i32, usize>,
}

impl EnumTable {
    /// Build a table, refusing anything that is not injective.
    ///
    /// Symbol assignment already settles collisions, so a failure here means
    /// an upstream bug rather than bad input.
    pub fn new(family: EnumFamily, mut members: Vec<EnumMember>) -> Result<Self> {
        members.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let mut by_symbol = HashMap::with_capacity(members.len());
        let mut by_id = HashMap::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            if by_symbol.insert(member.symbol.clone(), i).is_some() {
                return Err(GenerationError::Inconsistent(format!(
                    "{} has duplicate symbol '{}'",
                    family, member.symbol
                )));
            }
            if by_id.insert(member.id, i).is_some() {
                return Err(GenerationError::Inconsistent(format!(
                    "{} has duplicate identifier {}",
                    family, member.id
                )));
            }
        }

        Ok(Self {
            family,
            members,
            by_symbol,
            by_id,
        })
    }

    pub fn family(&self) -> EnumFamily {
        self.family
    }

    /// Members sorted by symbol
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn id_of(&self, symbol: &str) -> Option<i32> {
        self.by_symbol.get(symbol).map(|&i| self.members[i].id)
    }

    pub fn symbol_of(&self, id: i32) -> Option<&str> {
        self.by_id.get(&id).map(|&i| self.members[i].symbol.as_str())
    }

    pub fn contains_id(&self, id: i32) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.symbol.as_str())
    }
}

/// The six tables of one run
#[derive(Debug, Clone)]
pub struct EnumTables {
    pub country: EnumTable,
    pub country_iso2: EnumTable,
    pub country_iso3: EnumTable,
    pub locale: EnumTable,
    pub language_iso2: EnumTable,
    pub language_iso3: EnumTable,
}

impl EnumTables {
    pub fn get(&self, family: EnumFamily) -> &EnumTable {
        match family {
            EnumFamily::Country => &self.country,
            EnumFamily::CountryIso2Code => &self.country_iso2,
            EnumFamily::CountryIso3Code => &self.country_iso3,
            EnumFamily::LocaleCode => &self.locale,
            EnumFamily::LanguageIso2Code => &self.language_iso2,
            EnumFamily::LanguageIso3Code => &self.language_iso3,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumTable> {
        EnumFamily::ALL.into_iter().map(|family| self.get(family))
    }

    /// Symbol of `id` in `family`; a miss means the tables disagree
    pub fn symbol(&self, family: EnumFamily, id: i32) -> Result<&str> {
        self.get(family).symbol_of(id).ok_or_else(|| {
            GenerationError::Inconsistent(format!("{} has no member with identifier {}", family, id))
        })
    }
}

// =============================================================================
// Lookup Errors
// =============================================================================

/// An identifier with no row in a lookup table
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unknown {family} identifier: {id}")]
pub struct UnknownIdentifier {
    pub family: EnumFamily,
    pub id: i32,
}

// =============================================================================
// Cross-Reference Rows
// =============================================================================

/// Cross-reference row for one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryInfo {
    pub english_name: String,
    /// Shared by `Country`, `CountryIso2Code` and `CountryIso3Code`
    pub geo_id: i32,
    /// Sorted locale identifiers
    pub locales: Vec<i32>,
    /// Sorted, deduplicated language identifiers implied by the locales
    pub languages: Vec<i32>,
}

impl CountryInfo {
    /// Identifier of this row in a country family
    pub fn id_of(&self, family: EnumFamily) -> Option<i32> {
        family.is_country().then_some(self.geo_id)
    }
}

/// Cross-reference row for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    /// Shared by `LanguageIso2Code` and `LanguageIso3Code`
    pub id: i32,
    pub english_name: String,
    /// Locale identifiers, ordered by locale name
    pub locales: Vec<i32>,
}

impl LanguageInfo {
    /// Identifier of this row in a language family
    pub fn id_of(&self, family: EnumFamily) -> Option<i32> {
        family.is_language().then_some(self.id)
    }
}

// =============================================================================
// Cross-Reference Tables
// =============================================================================

/// `CountryInfo` rows ordered by english name
#[derive(Debug, Clone)]
pub struct CountryInfoTable {
    rows: Vec<CountryInfo>,
    by_geo_id: HashMap<i32, usize>,
    by_locale: HashMap<i32, usize>,
}

impl CountryInfoTable {
    pub fn new(mut rows: Vec<CountryInfo>) -> Result<Self> {
        rows.sort_by(|a, b| a.english_name.cmp(&b.english_name).then(a.geo_id.cmp(&b.geo_id)));

        let mut by_geo_id = HashMap::with_capacity(rows.len());
        let mut by_locale = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if by_geo_id.insert(row.geo_id, i).is_some() {
                return Err(GenerationError::Inconsistent(format!(
                    "CountryInfo has two rows for geo id {}",
                    row.geo_id
                )));
            }
            for &lcid in &row.locales {
                if by_locale.insert(lcid, i).is_some() {
                    return Err(GenerationError::Inconsistent(format!(
                        "locale {} belongs to two countries",
                        lcid
                    )));
                }
            }
        }

        Ok(Self {
            rows,
            by_geo_id,
            by_locale,
        })
    }

    pub fn all(&self) -> &[CountryInfo] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for an identifier of `family`, if any
    pub fn try_get(&self, family: EnumFamily, id: i32) -> Option<&CountryInfo> {
        let index = match family {
            EnumFamily::Country | EnumFamily::CountryIso2Code | EnumFamily::CountryIso3Code => {
                self.by_geo_id.get(&id)
            }
            EnumFamily::LocaleCode => self.by_locale.get(&id),
            EnumFamily::LanguageIso2Code | EnumFamily::LanguageIso3Code => None,
        };
        index.map(|&i| &self.rows[i])
    }

    /// Row for an identifier of `family`; absence is an error
    pub fn get(&self, family: EnumFamily, id: i32) -> std::result::Result<&CountryInfo, UnknownIdentifier> {
        self.try_get(family, id).ok_or(UnknownIdentifier { family, id })
    }
}

/// `LanguageInfo` rows in first-encounter order
#[derive(Debug, Clone)]
pub struct LanguageInfoTable {
    rows: Vec<LanguageInfo>,
    by_id: HashMap<i32, usize>,
    by_locale: HashMap<i32, usize>,
}

impl LanguageInfoTable {
    pub fn new(rows: Vec<LanguageInfo>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(rows.len());
        let mut by_locale = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if by_id.insert(row.id, i).is_some() {
                return Err(GenerationError::Inconsistent(format!(
                    "LanguageInfo has two rows for id {}",
                    row.id
                )));
            }
            for &lcid in &row.locales {
                if by_locale.insert(lcid, i).is_some() {
                    return Err(GenerationError::Inconsistent(format!(
                        "locale {} belongs to two languages",
                        lcid
                    )));
                }
            }
        }

        Ok(Self {
            rows,
            by_id,
            by_locale,
        })
    }

    pub fn all(&self) -> &[LanguageInfo] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn try_get(&self, family: EnumFamily, id: i32) -> Option<&LanguageInfo> {
        let index = match family {
            EnumFamily::LanguageIso2Code | EnumFamily::LanguageIso3Code => self.by_id.get(&id),
            EnumFamily::LocaleCode => self.by_locale.get(&id),
            EnumFamily::Country | EnumFamily::CountryIso2Code | EnumFamily::CountryIso3Code => None,
        };
        index.map(|&i| &self.rows[i])
    }

    pub fn get(&self, family: EnumFamily, id: i32) -> std::result::Result<&LanguageInfo, UnknownIdentifier> {
        self.try_get(family, id).ok_or(UnknownIdentifier { family, id })
    }
}
