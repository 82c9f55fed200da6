//! Country Infos
//!
//! Generates a cross-referenced set of country, locale and language tables
//! from a locale catalogue and renders them as Rust modules.
//!
//! ## Features
//!
//! - **Six Enumerations**: countries, ISO 3166 codes, locales and ISO 639 codes
//! - **Shared Identifiers**: geo ids link the country enums, ordinals link the language enums
//! - **Cross-Reference Tables**: `CountryInfo` and `LanguageInfo` indexable by every related family
//! - **Explicit Conflict Policy**: first-seen-wins, last-seen-wins or error, or any [`TieBreak`]
//! - **All or Nothing**: a run yields the complete artifact set or an error
//!
//! ## Architecture
//!
//! ```text
//! catalogue ──► ingest ──► filter ──► symbol assignment ──► EnumTables
//!                                                              │
//!                                  CountryInfo / LanguageInfo ◄┘
//!                                              │
//!                                              ▼
//!                                        GeneratedSet
//!                                 enums/country.rs
//!                                 enums/country_iso2_code.rs
//!                                 enums/country_iso3_code.rs
//!                                 enums/locale_code.rs
//!                                 enums/language_iso2_code.rs
//!                                 enums/language_iso3_code.rs
//!                                 country_info.rs
//!                                 language_info.rs
//!                                 country_info_enum_extensions.rs
//! ```

pub mod catalogue;
pub mod checksum;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod drift;
pub mod error;
pub mod filter;
pub mod ingest;

pub use catalogue::{CatalogueEntry, CatalogueSource, JsonCatalogue, RegionData};
pub use checksum::Checksum;
pub use codegen::config::{CodegenConfig, ConflictPolicy};
pub use codegen::names::{Conflict, TieBreak, Winner};
pub use codegen::tables::{
    CountryInfo, CountryInfoTable, EnumFamily, EnumMember, EnumTable, EnumTables, LanguageInfo,
    LanguageInfoTable, UnknownIdentifier,
};
pub use codegen::{generate, generate_with, Artifact, GeneratedSet};
pub use config::GeneratorConfig;
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use drift::{DriftReport, DriftStatus};
pub use error::{GenerationError, Result};
pub use filter::{AllowList, FilterField, RegionFilter};
