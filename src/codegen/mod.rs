//! Code Generation
//!
//! Turns a catalogue snapshot into the full artifact set.
//!
//! Architecture:
//! - Ingestion and filtering produce [`CountryGroup`](crate::ingest::CountryGroup)s
//! - Symbol assignment fans out per [`EnumFamily`] and yields [`EnumTables`]
//! - Cross-reference rows are composed from the assignments
//! - Emitters render every table; they never see catalogue data
//!
//! The key constraint: a [`GeneratedSet`] is only handed out once every
//! artifact has been rendered from tables that agree with each other. A run
//! produces all artifacts or none.

pub mod config;
pub mod names;
pub mod namespace;
pub mod rust;
pub mod tables;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalogue::CatalogueSource;
use crate::checksum::Checksum;
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{GenerationError, Result};
use crate::filter::RegionFilter;
use crate::ingest::{ingest, LocaleRecord, RegionKey};

use self::config::CodegenConfig;
use self::names::{country_symbol, language_symbol, locale_symbol, sanitize_symbol, Candidate, SymbolAssigner, TieBreak};
use self::namespace::Namespace;
use self::tables::{
    CountryInfo, CountryInfoTable, EnumFamily, EnumMember, EnumTable, EnumTables, LanguageInfo,
    LanguageInfoTable,
};

// =============================================================================
// Artifacts
// =============================================================================

/// Name of the equivalence helpers artifact
pub const EXTENSIONS_ARTIFACT: &str = "CountryInfoEnumExtensions";

/// One rendered source module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Stable artifact name, e.g. `CountryIso2Code`
    pub name: String,
    /// Output path relative to the output directory
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    fn new(name: &str, path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            content,
        }
    }

    pub fn checksum(&self) -> Checksum {
        Checksum::from_str(&self.content)
    }
}

// =============================================================================
// Generated Set
// =============================================================================

/// Complete, mutually consistent result of one run
#[derive(Debug, Clone)]
pub struct GeneratedSet {
    namespace: Namespace,
    tables: EnumTables,
    countries: CountryInfoTable,
    languages: LanguageInfoTable,
    artifacts: Vec<Artifact>,
    diagnostics: Diagnostics,
}

impl GeneratedSet {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn tables(&self) -> &EnumTables {
        &self.tables
    }

    pub fn table(&self, family: EnumFamily) -> &EnumTable {
        self.tables.get(family)
    }

    pub fn countries(&self) -> &CountryInfoTable {
        &self.countries
    }

    pub fn languages(&self) -> &LanguageInfoTable {
        &self.languages
    }

    /// Artifacts in a fixed order: six enums, then the cross-reference and
    /// extension modules
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// Records dropped during the run
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Write every artifact below `dir`.
    ///
    /// Files are staged next to their targets and only renamed into place
    /// once all of them were written. A failed write removes the staged files
    /// and leaves existing outputs untouched. A failed rename also removes
    /// them, but targets renamed before it have already been replaced.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(self.artifacts.len());

        for artifact in &self.artifacts {
            let target = dir.join(&artifact.path);
            let temp = target.with_extension("rs.tmp");
            let written = target
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| fs::write(&temp, &artifact.content));
            if let Err(e) = written {
                discard(&staged);
                let _ = fs::remove_file(&temp);
                return Err(e.into());
            }
            staged.push((temp, target));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (temp, target) in &staged {
            if let Err(e) = fs::rename(temp, target) {
                discard(&staged);
                return Err(e.into());
            }
            tracing::debug!(path = %target.display(), "wrote artifact");
            written.push(target.clone());
        }

        tracing::info!(dir = %dir.display(), artifacts = written.len(), "artifacts written");
        Ok(written)
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        let _ = fs::remove_file(temp);
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Run the whole pipeline with the configured conflict policy
pub fn generate(
    catalogue: &dyn CatalogueSource,
    filter: &RegionFilter,
    namespace: &str,
    config: &CodegenConfig,
) -> Result<GeneratedSet> {
    generate_with(catalogue, filter, namespace, &config.conflict_policy)
}

/// Run the whole pipeline with a custom tie break
pub fn generate_with(
    catalogue: &dyn CatalogueSource,
    filter: &RegionFilter,
    namespace: &str,
    tie_break: &dyn TieBreak,
) -> Result<GeneratedSet> {
    let namespace = Namespace::parse(namespace)?;
    let entries = catalogue.entries()?;
    let mut diagnostics = Diagnostics::new();

    let groups = ingest(&entries, &mut diagnostics);
    let groups = filter.apply(groups, &mut diagnostics);

    // Phase 1: countries, linked across the three country families
    let countries = assign_linked(
        &EnumFamily::COUNTRY,
        &groups,
        |family, group| country_member(family, &group.region),
        |group| group.region.two_letter_code.clone(),
        tie_break,
        &mut diagnostics,
    )?;

    // Phase 2: locales of the surviving countries
    let locale_candidates = groups
        .iter()
        .enumerate()
        .filter(|(g, _)| countries.alive[*g])
        .flat_map(|(g, group)| {
            group.locales.iter().enumerate().map(move |(l, locale)| Candidate {
                key: (g, l),
                member: locale_member(locale),
            })
        });
    let locales = SymbolAssigner::new(EnumFamily::LocaleCode, tie_break).assign(locale_candidates, &mut diagnostics)?;
    let surviving: HashSet<(usize, usize)> = locales.accepted.iter().map(|c| c.key).collect();

    // Phase 3: languages over the surviving locales
    let mut records: Vec<&LocaleRecord> = locales
        .accepted
        .iter()
        .map(|c| &groups[c.key.0].locales[c.key.1])
        .collect();
    records.sort_by(|a, b| a.locale_name.cmp(&b.locale_name));
    let language_groups = group_languages(&records);
    let languages = assign_linked(
        &EnumFamily::LANGUAGE,
        &language_groups,
        |family, group| group.member(family),
        |group| group.iso2.clone(),
        tie_break,
        &mut diagnostics,
    )?;

    // Phase 4: cross-reference rows
    let language_of: HashMap<i32, i32> = language_groups
        .iter()
        .zip(&languages.alive)
        .filter(|(_, alive)| **alive)
        .flat_map(|(group, _)| group.locales.iter().map(move |l| (l.locale_id, group.id)))
        .collect();

    let country_rows = groups
        .iter()
        .enumerate()
        .filter(|(g, _)| countries.alive[*g])
        .map(|(g, group)| {
            let mut locales: Vec<i32> = group
                .locales
                .iter()
                .enumerate()
                .filter(|(l, _)| surviving.contains(&(g, *l)))
                .map(|(_, locale)| locale.locale_id)
                .collect();
            locales.sort_unstable();
            let mut languages: Vec<i32> = locales.iter().filter_map(|id| language_of.get(id).copied()).collect();
            languages.sort_unstable();
            languages.dedup();
            CountryInfo {
                english_name: group.region.english_name.clone(),
                geo_id: group.region.geo_id,
                locales,
                languages,
            }
        })
        .collect();

    let language_rows = language_groups
        .iter()
        .zip(&languages.alive)
        .filter(|(_, alive)| **alive)
        .map(|(group, _)| LanguageInfo {
            id: group.id,
            english_name: group.english_name.clone(),
            locales: group.locales.iter().map(|l| l.locale_id).collect(),
        })
        .collect();

    let [country_iso2, country_iso3, country] = take_members(countries.members)?;
    let [language_iso2, language_iso3] = take_members(languages.members)?;
    let tables = EnumTables {
        country: EnumTable::new(EnumFamily::Country, country)?,
        country_iso2: EnumTable::new(EnumFamily::CountryIso2Code, country_iso2)?,
        country_iso3: EnumTable::new(EnumFamily::CountryIso3Code, country_iso3)?,
        locale: EnumTable::new(
            EnumFamily::LocaleCode,
            locales.accepted.into_iter().map(|c| c.member).collect(),
        )?,
        language_iso2: EnumTable::new(EnumFamily::LanguageIso2Code, language_iso2)?,
        language_iso3: EnumTable::new(EnumFamily::LanguageIso3Code, language_iso3)?,
    };
    let countries = CountryInfoTable::new(country_rows)?;
    let languages = LanguageInfoTable::new(language_rows)?;

    verify(&tables, &countries, &languages)?;

    // Phase 5: emission
    let mut artifacts: Vec<Artifact> = tables
        .iter()
        .map(|table| {
            let family = table.family();
            Artifact::new(
                family.name(),
                Path::new("enums").join(format!("{}.rs", family.module())),
                rust::emit_enum(table, &namespace),
            )
        })
        .collect();
    artifacts.push(Artifact::new(
        "CountryInfo",
        "country_info.rs",
        rust::emit_country_info(&countries, &tables, &namespace)?,
    ));
    artifacts.push(Artifact::new(
        "LanguageInfo",
        "language_info.rs",
        rust::emit_language_info(&languages, &tables, &namespace)?,
    ));
    artifacts.push(Artifact::new(
        EXTENSIONS_ARTIFACT,
        "country_info_enum_extensions.rs",
        rust::emit_extensions(&namespace),
    ));

    tracing::info!(
        namespace = %namespace,
        countries = countries.len(),
        locales = tables.locale.len(),
        languages = languages.len(),
        warnings = diagnostics.warning_count(),
        "generation complete"
    );

    Ok(GeneratedSet {
        namespace,
        tables,
        countries,
        languages,
        artifacts,
        diagnostics,
    })
}

/// Check the cross-reference contract: every identifier a row mentions is a
/// member of the matching table, and every locale belongs to one country.
pub fn verify(tables: &EnumTables, countries: &CountryInfoTable, languages: &LanguageInfoTable) -> Result<()> {
    let missing = |family: EnumFamily, id: i32| {
        GenerationError::Inconsistent(format!("{} identifier {} is referenced but not generated", family, id))
    };

    for row in countries.all() {
        for family in EnumFamily::COUNTRY {
            if !tables.get(family).contains_id(row.geo_id) {
                return Err(missing(family, row.geo_id));
            }
        }
        if let Some(&id) = row.locales.iter().find(|&&id| !tables.locale.contains_id(id)) {
            return Err(missing(EnumFamily::LocaleCode, id));
        }
        for family in EnumFamily::LANGUAGE {
            if let Some(&id) = row.languages.iter().find(|&&id| !tables.get(family).contains_id(id)) {
                return Err(missing(family, id));
            }
        }
    }

    for row in languages.all() {
        for family in EnumFamily::LANGUAGE {
            if !tables.get(family).contains_id(row.id) {
                return Err(missing(family, row.id));
            }
        }
        if let Some(&id) = row.locales.iter().find(|&&id| !tables.locale.contains_id(id)) {
            return Err(missing(EnumFamily::LocaleCode, id));
        }
    }

    for family in EnumFamily::COUNTRY {
        if tables.get(family).len() != countries.len() {
            return Err(GenerationError::Inconsistent(format!(
                "{} has {} members for {} countries",
                family,
                tables.get(family).len(),
                countries.len()
            )));
        }
    }
    for family in EnumFamily::LANGUAGE {
        if tables.get(family).len() != languages.len() {
            return Err(GenerationError::Inconsistent(format!(
                "{} has {} members for {} languages",
                family,
                tables.get(family).len(),
                languages.len()
            )));
        }
    }

    let covered: usize = countries.all().iter().map(|row| row.locales.len()).sum();
    if covered != tables.locale.len() {
        return Err(GenerationError::Inconsistent(format!(
            "{} locales generated but {} assigned to countries",
            tables.locale.len(),
            covered
        )));
    }

    Ok(())
}

// =============================================================================
// Linked Assignment
// =============================================================================

/// Members of families that share one identifier space
struct LinkedAssignment {
    /// Per input item: still present in every family
    alive: Vec<bool>,
    /// Accepted members, one list per family in input order
    members: Vec<Vec<EnumMember>>,
}

/// Assign several families over the same items.
///
/// An item rejected by any family is withdrawn from all of them, and the
/// assignment repeats until no family rejects anything.
fn assign_linked<T>(
    families: &[EnumFamily],
    items: &[T],
    member: impl Fn(EnumFamily, &T) -> EnumMember,
    subject: impl Fn(&T) -> String,
    tie_break: &dyn TieBreak,
    diagnostics: &mut Diagnostics,
) -> Result<LinkedAssignment> {
    let mut alive = vec![true; items.len()];

    loop {
        let mut removed: Vec<(usize, EnumFamily)> = Vec::new();
        let mut members = Vec::with_capacity(families.len());

        for &family in families {
            let candidates = items
                .iter()
                .enumerate()
                .filter(|(i, _)| alive[*i])
                .map(|(i, item)| Candidate {
                    key: i,
                    member: member(family, item),
                });
            let assignment = SymbolAssigner::new(family, tie_break).assign(candidates, diagnostics)?;
            for rejected in &assignment.rejected {
                if !removed.iter().any(|(i, _)| *i == rejected.key) {
                    removed.push((rejected.key, family));
                }
            }
            members.push(assignment.accepted.into_iter().map(|c| c.member).collect());
        }

        if removed.is_empty() {
            return Ok(LinkedAssignment { alive, members });
        }

        for (i, family) in removed {
            alive[i] = false;
            let others: Vec<&str> = families.iter().filter(|f| **f != family).map(|f| f.name()).collect();
            tracing::debug!(subject = %subject(&items[i]), %family, "withdrawn from linked families");
            diagnostics.record(
                subject(&items[i]),
                DiagnosticCode::Cascaded,
                format!("rejected by {}, also removed from {}", family, others.join(", ")),
            );
        }
    }
}

fn take_members<const N: usize>(members: Vec<Vec<EnumMember>>) -> Result<[Vec<EnumMember>; N]> {
    members
        .try_into()
        .map_err(|_| GenerationError::Inconsistent("linked assignment lost a family".to_string()))
}

// =============================================================================
// Members
// =============================================================================

fn country_member(family: EnumFamily, region: &RegionKey) -> EnumMember {
    let (symbol, code) = match family {
        EnumFamily::CountryIso3Code => (sanitize_symbol(&region.three_letter_code), &region.three_letter_code),
        EnumFamily::CountryIso2Code => (sanitize_symbol(&region.two_letter_code), &region.two_letter_code),
        _ => (country_symbol(&region.english_name), &region.two_letter_code),
    };
    EnumMember {
        symbol,
        id: region.geo_id,
        english_name: region.english_name.clone(),
        code: code.clone(),
    }
}

fn locale_member(locale: &LocaleRecord) -> EnumMember {
    EnumMember {
        symbol: locale_symbol(&locale.locale_name),
        id: locale.locale_id,
        english_name: locale.english_name.clone(),
        code: locale.locale_name.clone(),
    }
}

/// Locales sharing a two-letter language code
struct LanguageGroup<'a> {
    /// 1-based position of first encounter
    id: i32,
    iso2: String,
    iso3: String,
    /// English name and locale name of the first locale seen
    english_name: String,
    first_locale: String,
    locales: Vec<&'a LocaleRecord>,
}

impl LanguageGroup<'_> {
    fn member(&self, family: EnumFamily) -> EnumMember {
        let code = if family == EnumFamily::LanguageIso3Code { &self.iso3 } else { &self.iso2 };
        EnumMember {
            symbol: language_symbol(code),
            id: self.id,
            english_name: self.english_name.clone(),
            code: self.first_locale.clone(),
        }
    }
}

/// Group locale records (already sorted by name) by their two-letter
/// language symbol, in first-encounter order
fn group_languages<'a>(records: &[&'a LocaleRecord]) -> Vec<LanguageGroup<'a>> {
    let mut groups: Vec<LanguageGroup<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for &record in records {
        let key = language_symbol(&record.language_iso2);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(LanguageGroup {
                id: groups.len() as i32 + 1,
                iso2: record.language_iso2.clone(),
                iso3: record.language_iso3.clone(),
                english_name: record.english_name.clone(),
                first_locale: record.locale_name.clone(),
                locales: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].locales.push(record);
    }

    groups
}
