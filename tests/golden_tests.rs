//! Golden Tests for Table Generation
//!
//! Runs the full pipeline against the fixture catalogue and checks the
//! tables and rendered modules.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use country_infos::diagnostics::DiagnosticCode;
use country_infos::drift::{self, DriftStatus};
use country_infos::ingest::ingest;
use country_infos::{
    generate, CatalogueEntry, CodegenConfig, Diagnostics, EnumFamily, GeneratedSet, GenerationError,
    JsonCatalogue, RegionFilter,
};

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_catalogue() -> JsonCatalogue {
    JsonCatalogue::new(fixtures_path().join("catalogue.json"))
}

fn generate_fixture(filter: &RegionFilter, namespace: &str) -> GeneratedSet {
    generate(&fixture_catalogue(), filter, namespace, &CodegenConfig::default()).unwrap()
}

fn scenario_catalogue() -> Vec<CatalogueEntry> {
    vec![
        CatalogueEntry::new("en-US", 1033, "English (United States)").with_region("US", "USA", "United States", 244),
        CatalogueEntry::new("fr-FR", 1036, "French (France)").with_region("FR", "FRA", "France", 84),
        CatalogueEntry::new("en", 9, "English").neutral(),
    ]
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_two_countries_and_a_neutral_locale() {
    let set = generate(&scenario_catalogue(), &RegionFilter::AcceptAll, "", &CodegenConfig::default()).unwrap();

    let symbols: Vec<_> = set.table(EnumFamily::Country).symbols().collect();
    assert_eq!(symbols, vec!["France", "UnitedStates"]);
    assert!(!set.table(EnumFamily::LocaleCode).contains_id(9));
    assert_eq!(set.diagnostics().with_code(DiagnosticCode::NeutralLocale).count(), 1);

    let us = set.table(EnumFamily::CountryIso2Code).id_of("US").unwrap();
    let info = set.countries().get(EnumFamily::CountryIso2Code, us).unwrap();
    assert_eq!(info.locales, vec![1033]);
}

#[test]
fn test_scenario_iso2_allow_list() {
    let dir = tempfile::tempdir().unwrap();
    let allow_list = dir.path().join("IsoCode2.txt");
    fs::write(&allow_list, "US\n").unwrap();
    let filter = RegionFilter::from_path(Some(allow_list.as_path())).unwrap();

    let set = generate(&scenario_catalogue(), &filter, "", &CodegenConfig::default()).unwrap();

    let symbols: Vec<_> = set.table(EnumFamily::Country).symbols().collect();
    assert_eq!(symbols, vec!["UnitedStates"]);
    for family in EnumFamily::COUNTRY {
        assert!(!set.table(family).contains_id(84));
    }
    assert!(!set.table(EnumFamily::LocaleCode).contains_id(1036));
    for artifact in set.artifacts() {
        assert!(!artifact.content.contains("France"), "{} mentions France", artifact.name);
    }
}

#[test]
fn test_scenario_sanitized_name_collision() {
    let entries = vec![
        CatalogueEntry::new("aa-FB", 1001, "Afar (Foo & Bar)").with_region("FB", "FBR", "Foo & Bar", 501),
        CatalogueEntry::new("aa-FA", 1002, "Afar (FooAndBar)").with_region("FA", "FAB", "FooAndBar", 502),
    ];
    let set = generate(&entries, &RegionFilter::AcceptAll, "", &CodegenConfig::default()).unwrap();

    let country = set.table(EnumFamily::Country);
    assert_eq!(country.len(), 1);
    assert_eq!(country.id_of("FooAndBar"), Some(501));
    assert!(set.countries().all().iter().all(|row| row.geo_id != 502));
    assert!(set.countries().try_get(EnumFamily::CountryIso2Code, 502).is_none());
    assert_eq!(set.diagnostics().with_code(DiagnosticCode::AmbiguousName).count(), 1);
}

// =============================================================================
// Fixture Catalogue
// =============================================================================

#[test]
fn test_fixture_ingestion_drops() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "");
    let diags = set.diagnostics();

    assert_eq!(diags.with_code(DiagnosticCode::InvariantLocale).count(), 1);
    assert_eq!(diags.with_code(DiagnosticCode::NeutralLocale).count(), 1);
    assert_eq!(diags.with_code(DiagnosticCode::MalformedRegionCode).count(), 1);
    assert_eq!(diags.with_code(DiagnosticCode::UnresolvableRegion).count(), 1);
    assert_eq!(diags.warning_count(), 2);
}

#[test]
fn test_fixture_tables() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "");

    let countries: Vec<_> = set.countries().all().iter().map(|r| r.english_name.as_str()).collect();
    assert_eq!(
        countries,
        vec!["Bosnia & Herzegovina", "Canada", "France", "Germany", "United States"]
    );
    assert_eq!(set.table(EnumFamily::Country).id_of("BosniaAndHerzegovina"), Some(25));
    assert_eq!(set.table(EnumFamily::LocaleCode).id_of("bs_Latn_BA"), Some(5146));

    // Ordinals follow locale names: bs, de, en, es, fr
    let iso2 = set.table(EnumFamily::LanguageIso2Code);
    let iso3 = set.table(EnumFamily::LanguageIso3Code);
    assert_eq!(iso2.id_of("BS"), Some(1));
    assert_eq!(iso2.id_of("EN"), Some(3));
    assert_eq!(iso3.id_of("ENG"), Some(3));
    assert_eq!(iso2.id_of("FR"), iso3.id_of("FRA"));

    let us = set.countries().get(EnumFamily::Country, 244).unwrap();
    assert_eq!(us.locales, vec![1033, 21514]);
    assert_eq!(us.languages, vec![3, 4]);

    let canada = set.countries().get(EnumFamily::LocaleCode, 4105).unwrap();
    assert_eq!(canada.geo_id, 39);
    assert_eq!(canada.languages, vec![3, 5]);

    let english = set.languages().get(EnumFamily::LanguageIso3Code, 3).unwrap();
    assert_eq!(english.english_name, "English (Canada)");
    assert_eq!(english.locales, vec![4105, 1033]);
    assert_eq!(set.languages().get(EnumFamily::LocaleCode, 3084).unwrap().id, 5);
}

#[test]
fn test_unknown_identifier() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "");

    let err = set.countries().get(EnumFamily::LocaleCode, 22538).unwrap_err();
    assert_eq!(err.family, EnumFamily::LocaleCode);
    assert_eq!(err.id, 22538);
    assert!(set.countries().try_get(EnumFamily::LocaleCode, 22538).is_none());
    assert!(set.languages().try_get(EnumFamily::LanguageIso2Code, 99).is_none());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_totality() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "");
    for family in EnumFamily::COUNTRY {
        assert_eq!(set.table(family).len(), set.countries().len(), "{}", family);
    }
    for family in EnumFamily::LANGUAGE {
        assert_eq!(set.table(family).len(), set.languages().len(), "{}", family);
    }
}

#[test]
fn test_round_trip_consistency() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "");

    for family in EnumFamily::COUNTRY {
        for id in set.table(family).ids() {
            let row = set.countries().get(family, id).unwrap();
            assert_eq!(row.id_of(family), Some(id));
        }
    }
    for family in EnumFamily::LANGUAGE {
        for id in set.table(family).ids() {
            let row = set.languages().get(family, id).unwrap();
            assert_eq!(row.id_of(family), Some(id));
        }
    }
}

#[test]
fn test_locale_coverage() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "");

    let assigned: Vec<i32> = set.countries().all().iter().flat_map(|r| r.locales.iter().copied()).collect();
    let unique: HashSet<i32> = assigned.iter().copied().collect();
    let generated: HashSet<i32> = set.table(EnumFamily::LocaleCode).ids().collect();

    assert_eq!(assigned.len(), unique.len());
    assert_eq!(unique, generated);
}

#[test]
fn test_symbol_uniqueness() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "");

    for table in set.tables().iter() {
        let symbols: HashSet<_> = table.symbols().collect();
        let ids: HashSet<_> = table.ids().collect();
        assert_eq!(symbols.len(), table.len(), "{}", table.family());
        assert_eq!(ids.len(), table.len(), "{}", table.family());
    }
}

#[test]
fn test_filter_idempotence() {
    let unfiltered = generate_fixture(&RegionFilter::AcceptAll, "");
    let missing_list = RegionFilter::from_path(Some(fixtures_path().join("missing.txt").as_path()));
    assert!(matches!(missing_list, Err(GenerationError::AllowList { .. })));

    // An allow-list naming every country is the identity
    let dir = tempfile::tempdir().unwrap();
    let every_country = dir.path().join("IsoCode2.txt");
    fs::write(&every_country, "BA\nCA\nDE\nFR\nUS\n").unwrap();
    let identity = RegionFilter::from_path(Some(every_country.as_path())).unwrap();
    assert_eq!(generate_fixture(&identity, "").artifacts(), unfiltered.artifacts());

    // Filtering an already filtered catalogue changes nothing
    let filter = RegionFilter::from_path(Some(fixtures_path().join("IsoCode2.txt").as_path())).unwrap();
    let once = generate_fixture(&filter, "");
    let kept: HashSet<i32> = once.countries().all().iter().map(|r| r.geo_id).collect();
    let filtered_entries: Vec<CatalogueEntry> = fixture_catalogue_entries()
        .into_iter()
        .filter(|e| e.region.as_ref().is_some_and(|r| kept.contains(&r.geo_id)))
        .collect();
    let twice = generate(&filtered_entries, &filter, "", &CodegenConfig::default()).unwrap();

    assert_eq!(kept, HashSet::from([244, 39]));
    assert_eq!(once.artifacts(), twice.artifacts());

    let entries = fixture_catalogue_entries();
    let mut diags = Diagnostics::new();
    let groups = filter.apply(ingest(&entries, &mut diags), &mut diags);
    let regrouped = filter.apply(groups.clone(), &mut diags);
    let codes = |groups: &[country_infos::ingest::CountryGroup]| {
        groups.iter().map(|g| g.region.two_letter_code.clone()).collect::<Vec<_>>()
    };
    assert_eq!(codes(&groups), vec!["US", "CA"]);
    assert_eq!(codes(&groups), codes(&regrouped));
}

#[test]
fn test_english_name_allow_list() {
    let filter = RegionFilter::from_path(Some(fixtures_path().join("countries.txt").as_path())).unwrap();
    let set = generate_fixture(&filter, "");

    assert_eq!(set.countries().len(), 1);
    assert_eq!(set.countries().all()[0].geo_id, 244);
    assert_eq!(set.diagnostics().with_code(DiagnosticCode::FilteredOut).count(), 4);
}

fn fixture_catalogue_entries() -> Vec<CatalogueEntry> {
    let content = fs::read_to_string(fixtures_path().join("catalogue.json")).unwrap();
    JsonCatalogue::parse(&content).unwrap()
}

// =============================================================================
// Rendered Artifacts
// =============================================================================

#[test]
fn test_enum_artifact_content() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "Sic.CountryInfos");

    let country = &set.artifact("Country").unwrap().content;
    assert!(country.starts_with("// <auto-generated>"));
    assert!(country.contains("    /// Bosnia & Herzegovina - BA\n    BosniaAndHerzegovina = 25,\n"));
    assert!(country.find("Canada = 39").unwrap() < country.find("UnitedStates = 244").unwrap());

    let locale = &set.artifact("LocaleCode").unwrap().content;
    assert!(locale.contains("    /// English (Canada) - en-CA\n    en_CA = 4105,\n"));

    let language = &set.artifact("LanguageIso3Code").unwrap().content;
    assert!(language.contains("    ENG = 3,\n"));
}

#[test]
fn test_cross_reference_artifact_content() {
    let set = generate_fixture(&RegionFilter::AcceptAll, "Sic.CountryInfos");

    let country_info = &set.artifact("CountryInfo").unwrap().content;
    assert!(country_info.contains("use crate::sic::country_infos::enums::country::Country;"));
    assert!(country_info.contains("            two_letter_iso_code: CountryIso2Code::US,\n"));
    assert!(country_info.contains("            locales: &[LocaleCode::en_US, LocaleCode::es_US],\n"));
    assert!(country_info
        .contains("            supported_iso2_code_languages: &[LanguageIso2Code::EN, LanguageIso2Code::ES],\n"));
    assert!(country_info.contains("            CountryIso3Code::CAN => &Self::ALL[1],\n"));
    assert!(country_info.contains("            4105 => Some(1),\n"));

    let language_info = &set.artifact("LanguageInfo").unwrap().content;
    assert!(language_info.contains("use crate::sic::country_infos::country_info::UnknownIdentifier;"));
    assert!(language_info.contains("            locale_codes: &[LocaleCode::en_CA, LocaleCode::en_US],\n"));

    let extensions = &set.artifact("CountryInfoEnumExtensions").unwrap().content;
    assert!(extensions.contains("impl IsSameCountry<Country> for CountryIso3Code {"));
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn test_write_and_check() {
    let dir = tempfile::tempdir().unwrap();
    let set = generate_fixture(&RegionFilter::AcceptAll, "Sic.CountryInfos");

    let written = set.write_to(dir.path()).unwrap();
    assert_eq!(written.len(), 9);
    assert!(dir.path().join("enums/country_iso2_code.rs").is_file());
    assert!(dir.path().join("country_info_enum_extensions.rs").is_file());
    assert!(!dir.path().join("country_info.rs.tmp").exists());

    let report = drift::check(&set, dir.path()).unwrap();
    assert!(report.is_clean());

    fs::remove_file(dir.path().join("language_info.rs")).unwrap();
    fs::write(dir.path().join("enums/country.rs"), "// edited\n").unwrap();

    let report = drift::check(&set, dir.path()).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.drifted().count(), 2);

    let language = report.artifacts.iter().find(|a| a.name == "LanguageInfo").unwrap();
    assert_eq!(language.status, DriftStatus::Missing);

    let country = report.artifacts.iter().find(|a| a.name == "Country").unwrap();
    match &country.status {
        DriftStatus::Stale { diff, generated, .. } => {
            assert!(diff.contains("-// edited"));
            assert_eq!(generated, &set.artifact("Country").unwrap().checksum());
        }
        other => panic!("Expected Stale, got {:?}", other),
    }
}

#[test]
fn test_failed_write_keeps_existing_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let set = generate_fixture(&RegionFilter::AcceptAll, "");
    fs::write(dir.path().join("country_info.rs"), "// previous\n").unwrap();
    // The last artifact cannot be staged
    fs::create_dir(dir.path().join("country_info_enum_extensions.rs.tmp")).unwrap();

    assert!(set.write_to(dir.path()).is_err());
    assert_eq!(fs::read_to_string(dir.path().join("country_info.rs")).unwrap(), "// previous\n");
    assert!(!dir.path().join("enums/country.rs").exists());
    assert!(!dir.path().join("enums/country.rs.tmp").exists());
    assert!(!dir.path().join("country_info.rs.tmp").exists());
}

#[test]
fn test_missing_catalogue_is_fatal() {
    let catalogue = JsonCatalogue::new(fixtures_path().join("does-not-exist.json"));
    let err = generate(&catalogue, &RegionFilter::AcceptAll, "", &CodegenConfig::default()).unwrap_err();
    assert!(matches!(err, GenerationError::MissingCatalogue { .. }));
}

#[test]
fn test_generation_is_deterministic() {
    let first = generate_fixture(&RegionFilter::AcceptAll, "Geo");
    let second = generate_fixture(&RegionFilter::AcceptAll, "Geo");
    assert_eq!(first.artifacts(), second.artifacts());
}

// =============================================================================
// Consumer Build
// =============================================================================

const CONSUMER_MAIN: &str = r#"
pub mod enums {
    pub mod country;
    pub mod country_iso2_code;
    pub mod country_iso3_code;
    pub mod language_iso2_code;
    pub mod language_iso3_code;
    pub mod locale_code;
}
pub mod country_info;
pub mod country_info_enum_extensions;
pub mod language_info;

use country_info::CountryInfo;
use country_info_enum_extensions::{GetCountryInfo, GetLanguageInfo, IsSameCountry, IsSameLanguage};
use enums::country::Country;
use enums::country_iso2_code::CountryIso2Code;
use enums::country_iso3_code::CountryIso3Code;
use enums::language_iso2_code::LanguageIso2Code;
use enums::language_iso3_code::LanguageIso3Code;
use enums::locale_code::LocaleCode;
use language_info::LanguageInfo;

fn main() {
    let us = CountryInfo::from_iso2(CountryIso2Code::US);
    assert_eq!(us.country, Country::UnitedStates);
    assert_eq!(us.locales, &[LocaleCode::en_US, LocaleCode::es_US]);
    assert_eq!(CountryInfo::get(244).unwrap(), us);
    assert!(CountryInfo::get(161832257).is_err());

    assert!(CountryIso2Code::CA.is_same_country(Country::Canada));
    assert!(!CountryIso3Code::FRA.is_same_country(Country::Canada));
    assert!(LanguageIso2Code::EN.is_same_language(LanguageIso3Code::ENG));

    assert_eq!(CountryInfo::try_get_by_lcid(4105).map(|c| c.country), Some(Country::Canada));
    assert!(CountryInfo::try_get_by_lcid(22538).is_none());
    assert_eq!(LocaleCode::fr_CI.country_info().unwrap().country, Country::CôtedIvoire);

    let french = LocaleCode::fr_CA.language_info().unwrap();
    assert_eq!(french.language_iso2_code, LanguageIso2Code::FR);
    assert_eq!(LanguageInfo::from_iso3(LanguageIso3Code::FRA), french);

    assert_eq!(Country::Self_.country_info().english_name, "Self");
    assert_eq!(Country::Unnamed.country_info().two_letter_iso_code, CountryIso2Code::UQ);
    assert_eq!(Country::from_id(901), Some(Country::Self_));
}
"#;

/// Fixture catalogue plus names that stress symbol sanitization
fn consumer_catalogue() -> Vec<CatalogueEntry> {
    let mut entries = fixture_catalogue_entries();
    entries.push(
        CatalogueEntry::new("fr-CI", 12300, "French (Côte d’Ivoire)")
            .with_languages("fr", "fra")
            .with_region("CI", "CIV", "Côte d’Ivoire", 119),
    );
    entries.push(CatalogueEntry::new("xx-SF", 8001, "Test (Self)").with_region("SF", "SLF", "Self", 901));
    entries.push(CatalogueEntry::new("xx-UQ", 8002, "Test (_)").with_region("UQ", "UNQ", "_", 902));
    entries
}

#[test]
fn test_generated_modules_build_and_run() {
    let set = generate(&consumer_catalogue(), &RegionFilter::AcceptAll, "", &CodegenConfig::default()).unwrap();
    assert_eq!(set.table(EnumFamily::Country).id_of("Unnamed"), Some(902));

    let dir = tempfile::tempdir().unwrap();
    set.write_to(dir.path()).unwrap();
    let main = dir.path().join("main.rs");
    fs::write(&main, CONSUMER_MAIN).unwrap();
    let binary = dir.path().join("consumer");

    let rustc = std::env::var_os("RUSTC").unwrap_or_else(|| "rustc".into());
    let compiled = match Command::new(&rustc)
        .args(["--edition", "2021", "--crate-name", "consumer", "-o"])
        .arg(&binary)
        .arg(&main)
        .output()
    {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("skipping consumer build: {:?} not found", rustc);
            return;
        }
        Err(e) => panic!("failed to spawn rustc: {}", e),
    };
    assert!(
        compiled.status.success(),
        "generated modules failed to build:\n{}",
        String::from_utf8_lossy(&compiled.stderr)
    );

    let ran = Command::new(&binary).output().unwrap();
    assert!(ran.status.success(), "consumer failed:\n{}", String::from_utf8_lossy(&ran.stderr));
}
