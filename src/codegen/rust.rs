//! Rust Code Emitter
//!
//! Renders the tables of a run as Rust source modules.
//!
//! Key constraints:
//! - Emitters only read finished tables, never catalogue data
//! - Every symbol written into a cross-reference artifact is looked up in
//!   the matching [`EnumTable`], so artifacts cannot disagree on identifiers
//! - Output is deterministic: members by symbol, countries by english name,
//!   languages in first-encounter order

use super::namespace::Namespace;
use super::tables::{CountryInfoTable, EnumFamily, EnumTable, EnumTables, LanguageInfoTable};
use crate::error::Result;

pub const AUTO_GENERATED_HEADER: &str = "\
// <auto-generated>
// This code was generated by country-infos.
// Changes to this file may cause incorrect behavior and will be lost if the code is regenerated.
// </auto-generated>
";

// =============================================================================
// Enum Emission
// =============================================================================

/// Emit one enumeration artifact
pub fn emit_enum(table: &EnumTable, ns: &Namespace) -> String {
    let family = table.family();
    let name = family.name();
    let mut output = String::new();

    output.push_str(AUTO_GENERATED_HEADER);
    output.push_str(&format!(
        "//! `{}`\n\n",
        ns.path(&["enums", family.module()])
    ));

    output.push_str(&format!("/// {}\n", family.documentation()));
    output.push_str("#[allow(non_camel_case_types)]\n");
    output.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]\n");
    if !table.is_empty() {
        output.push_str("#[repr(i32)]\n");
    }
    output.push_str(&format!("pub enum {} {{\n", name));
    for member in table.members() {
        output.push_str(&format!("    /// {}\n", doc_text(&member.documentation())));
        output.push_str(&format!("    {} = {},\n", member.symbol, member.id));
    }
    output.push_str("}\n\n");

    output.push_str(&format!("impl {} {{\n", name));
    output.push_str("    /// Every member, sorted by name.\n");
    output.push_str("    pub const ALL: &'static [Self] = &[\n");
    for member in table.members() {
        output.push_str(&format!("        Self::{},\n", member.symbol));
    }
    output.push_str("    ];\n\n");

    output.push_str("    /// Numeric identifier of this member.\n");
    output.push_str("    pub const fn id(self) -> i32 {\n");
    if table.is_empty() {
        output.push_str("        match self {}\n");
    } else {
        output.push_str("        self as i32\n");
    }
    output.push_str("    }\n\n");

    output.push_str("    /// Looks up a member by its numeric identifier.\n");
    output.push_str("    pub const fn from_id(id: i32) -> Option<Self> {\n");
    output.push_str("        match id {\n");
    for member in table.members() {
        output.push_str(&format!("            {} => Some(Self::{}),\n", member.id, member.symbol));
    }
    output.push_str("            _ => None,\n");
    output.push_str("        }\n");
    output.push_str("    }\n");
    output.push_str("}\n");

    output
}

// =============================================================================
// CountryInfo Emission
// =============================================================================

/// Emit the `CountryInfo` artifact
pub fn emit_country_info(countries: &CountryInfoTable, tables: &EnumTables, ns: &Namespace) -> Result<String> {
    let mut output = String::new();

    output.push_str(AUTO_GENERATED_HEADER);
    output.push_str(&format!("//! `{}`\n\n", ns.path(&["country_info"])));
    for family in EnumFamily::ALL {
        output.push_str(&format!("use {};\n", ns.enum_path(family)));
    }
    output.push('\n');

    output.push_str(UNKNOWN_IDENTIFIER);

    output.push_str(
        "\
/// Contains information about a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryInfo {
    /// The ISO 3166 ALPHA-2 code of the country.
    pub two_letter_iso_code: CountryIso2Code,
    /// The ISO 3166 ALPHA-3 code of the country.
    pub three_letter_iso_code: CountryIso3Code,
    /// Enum representing the country.
    pub country: Country,
    /// The english name of the country.
    pub english_name: &'static str,
    /// The locales of the country.
    pub locales: &'static [LocaleCode],
    /// The ISO 639-1 codes of the languages spoken in the country.
    pub supported_iso2_code_languages: &'static [LanguageIso2Code],
    /// The ISO 639-2 codes of the languages spoken in the country.
    pub supported_iso3_code_languages: &'static [LanguageIso3Code],
}

impl CountryInfo {
    /// Contains all countries, sorted by english name.
    pub const ALL: &'static [CountryInfo] = &[
",
    );

    for row in countries.all() {
        let geo_id = row.geo_id;
        output.push_str("        CountryInfo {\n");
        output.push_str(&format!(
            "            two_letter_iso_code: CountryIso2Code::{},\n",
            tables.symbol(EnumFamily::CountryIso2Code, geo_id)?
        ));
        output.push_str(&format!(
            "            three_letter_iso_code: CountryIso3Code::{},\n",
            tables.symbol(EnumFamily::CountryIso3Code, geo_id)?
        ));
        output.push_str(&format!(
            "            country: Country::{},\n",
            tables.symbol(EnumFamily::Country, geo_id)?
        ));
        output.push_str(&format!("            english_name: {:?},\n", row.english_name));
        output.push_str(&format!(
            "            locales: &[{}],\n",
            member_list(tables, EnumFamily::LocaleCode, &row.locales)?
        ));
        output.push_str(&format!(
            "            supported_iso2_code_languages: &[{}],\n",
            member_list(tables, EnumFamily::LanguageIso2Code, &row.languages)?
        ));
        output.push_str(&format!(
            "            supported_iso3_code_languages: &[{}],\n",
            member_list(tables, EnumFamily::LanguageIso3Code, &row.languages)?
        ));
        output.push_str("        },\n");
    }
    output.push_str("    ];\n\n");

    let by_geo_id: Vec<(i32, usize)> = countries.all().iter().enumerate().map(|(i, r)| (r.geo_id, i)).collect();
    let by_lcid: Vec<(i32, usize)> = countries
        .all()
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.locales.iter().map(move |&lcid| (lcid, i)))
        .collect();
    emit_index_fn(&mut output, "index_by_geo_id", &by_geo_id);
    emit_index_fn(&mut output, "index_by_lcid", &by_lcid);

    output.push_str(
        "\
    /// Gets the country for a geo identifier.
    pub fn get(geo_id: i32) -> Result<&'static CountryInfo, UnknownIdentifier> {
        Self::try_get(geo_id).ok_or(UnknownIdentifier { family: \"Country\", id: geo_id })
    }

    /// Tries to get the country for a geo identifier.
    pub fn try_get(geo_id: i32) -> Option<&'static CountryInfo> {
        Self::index_by_geo_id(geo_id).map(|i| &Self::ALL[i])
    }

    /// Gets the country for a locale identifier.
    pub fn get_by_lcid(lcid: i32) -> Result<&'static CountryInfo, UnknownIdentifier> {
        Self::try_get_by_lcid(lcid).ok_or(UnknownIdentifier { family: \"LocaleCode\", id: lcid })
    }

    /// Tries to get the country for a locale identifier.
    pub fn try_get_by_lcid(lcid: i32) -> Option<&'static CountryInfo> {
        Self::index_by_lcid(lcid).map(|i| &Self::ALL[i])
    }

    /// Gets the country for a locale.
    pub fn from_locale(locale: LocaleCode) -> Result<&'static CountryInfo, UnknownIdentifier> {
        Self::get_by_lcid(locale.id())
    }

    /// Tries to get the country for a locale.
    pub fn try_from_locale(locale: LocaleCode) -> Option<&'static CountryInfo> {
        Self::try_get_by_lcid(locale.id())
    }

",
    );

    let rows: Vec<i32> = countries.all().iter().map(|r| r.geo_id).collect();
    emit_total_lookup(&mut output, tables, EnumFamily::Country, "from_country", "country", "CountryInfo", &rows)?;
    emit_total_lookup(&mut output, tables, EnumFamily::CountryIso2Code, "from_iso2", "code", "CountryInfo", &rows)?;
    emit_total_lookup(&mut output, tables, EnumFamily::CountryIso3Code, "from_iso3", "code", "CountryInfo", &rows)?;

    output.push_str("}\n");
    Ok(output)
}

// =============================================================================
// LanguageInfo Emission
// =============================================================================

/// Emit the `LanguageInfo` artifact
pub fn emit_language_info(languages: &LanguageInfoTable, tables: &EnumTables, ns: &Namespace) -> Result<String> {
    let mut output = String::new();

    output.push_str(AUTO_GENERATED_HEADER);
    output.push_str(&format!("//! `{}`\n\n", ns.path(&["language_info"])));
    output.push_str(&format!("use {};\n", ns.path(&["country_info", "UnknownIdentifier"])));
    for family in [EnumFamily::LanguageIso2Code, EnumFamily::LanguageIso3Code, EnumFamily::LocaleCode] {
        output.push_str(&format!("use {};\n", ns.enum_path(family)));
    }
    output.push('\n');

    output.push_str(
        "\
/// Contains information about a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// The ISO 639-1 code of the language.
    pub language_iso2_code: LanguageIso2Code,
    /// The ISO 639-2 code of the language.
    pub language_iso3_code: LanguageIso3Code,
    /// The english name of the first locale seen for the language.
    pub english_name: &'static str,
    /// The locales using the language.
    pub locale_codes: &'static [LocaleCode],
}

impl LanguageInfo {
    /// Contains all languages.
    pub const ALL: &'static [LanguageInfo] = &[
",
    );

    for row in languages.all() {
        output.push_str("        LanguageInfo {\n");
        output.push_str(&format!(
            "            language_iso2_code: LanguageIso2Code::{},\n",
            tables.symbol(EnumFamily::LanguageIso2Code, row.id)?
        ));
        output.push_str(&format!(
            "            language_iso3_code: LanguageIso3Code::{},\n",
            tables.symbol(EnumFamily::LanguageIso3Code, row.id)?
        ));
        output.push_str(&format!("            english_name: {:?},\n", row.english_name));
        output.push_str(&format!(
            "            locale_codes: &[{}],\n",
            member_list(tables, EnumFamily::LocaleCode, &row.locales)?
        ));
        output.push_str("        },\n");
    }
    output.push_str("    ];\n\n");

    let by_id: Vec<(i32, usize)> = languages.all().iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    let by_lcid: Vec<(i32, usize)> = languages
        .all()
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.locales.iter().map(move |&lcid| (lcid, i)))
        .collect();
    emit_index_fn(&mut output, "index_by_id", &by_id);
    emit_index_fn(&mut output, "index_by_lcid", &by_lcid);

    output.push_str(
        "\
    /// Gets the language for a language identifier.
    pub fn get(id: i32) -> Result<&'static LanguageInfo, UnknownIdentifier> {
        Self::try_get(id).ok_or(UnknownIdentifier { family: \"LanguageIso2Code\", id })
    }

    /// Tries to get the language for a language identifier.
    pub fn try_get(id: i32) -> Option<&'static LanguageInfo> {
        Self::index_by_id(id).map(|i| &Self::ALL[i])
    }

    /// Gets the language for a locale identifier.
    pub fn get_by_lcid(lcid: i32) -> Result<&'static LanguageInfo, UnknownIdentifier> {
        Self::try_get_by_lcid(lcid).ok_or(UnknownIdentifier { family: \"LocaleCode\", id: lcid })
    }

    /// Tries to get the language for a locale identifier.
    pub fn try_get_by_lcid(lcid: i32) -> Option<&'static LanguageInfo> {
        Self::index_by_lcid(lcid).map(|i| &Self::ALL[i])
    }

    /// Gets the language for a locale.
    pub fn from_locale(locale: LocaleCode) -> Result<&'static LanguageInfo, UnknownIdentifier> {
        Self::get_by_lcid(locale.id())
    }

    /// Tries to get the language for a locale.
    pub fn try_from_locale(locale: LocaleCode) -> Option<&'static LanguageInfo> {
        Self::try_get_by_lcid(locale.id())
    }

",
    );

    let rows: Vec<i32> = languages.all().iter().map(|r| r.id).collect();
    emit_total_lookup(&mut output, tables, EnumFamily::LanguageIso2Code, "from_iso2", "code", "LanguageInfo", &rows)?;
    emit_total_lookup(&mut output, tables, EnumFamily::LanguageIso3Code, "from_iso3", "code", "LanguageInfo", &rows)?;

    output.push_str("}\n");
    Ok(output)
}

// =============================================================================
// Extension Emission
// =============================================================================

/// Emit the equivalence and convenience artifact.
///
/// Depends on family names only, never on table contents.
pub fn emit_extensions(ns: &Namespace) -> String {
    let mut output = String::new();

    output.push_str(AUTO_GENERATED_HEADER);
    output.push_str(&format!("//! `{}`\n\n", ns.path(&["country_info_enum_extensions"])));
    output.push_str(&format!("use {};\n", ns.path(&["country_info", "CountryInfo"])));
    output.push_str(&format!("use {};\n", ns.path(&["country_info", "UnknownIdentifier"])));
    output.push_str(&format!("use {};\n", ns.path(&["language_info", "LanguageInfo"])));
    for family in EnumFamily::ALL {
        output.push_str(&format!("use {};\n", ns.enum_path(family)));
    }
    output.push('\n');

    emit_equivalence(&mut output, "IsSameCountry", "is_same_country", "country", &EnumFamily::COUNTRY);
    emit_equivalence(&mut output, "IsSameLanguage", "is_same_language", "language", &EnumFamily::LANGUAGE);

    output.push_str(
        "\
/// Gets the `CountryInfo` of an identifier.
pub trait GetCountryInfo {
    type Output;

    fn country_info(self) -> Self::Output;
}

",
    );
    for family in EnumFamily::COUNTRY {
        let getter = total_getter(family);
        output.push_str(&format!(
            "impl GetCountryInfo for {name} {{\n    type Output = &'static CountryInfo;\n\n    fn country_info(self) -> Self::Output {{\n        CountryInfo::{getter}(self)\n    }}\n}}\n\n",
            name = family.name(),
            getter = getter,
        ));
    }
    output.push_str(
        "\
impl GetCountryInfo for LocaleCode {
    type Output = Result<&'static CountryInfo, UnknownIdentifier>;

    fn country_info(self) -> Self::Output {
        CountryInfo::from_locale(self)
    }
}

/// Gets the `LanguageInfo` of an identifier.
pub trait GetLanguageInfo {
    type Output;

    fn language_info(self) -> Self::Output;
}

",
    );
    for family in EnumFamily::LANGUAGE {
        output.push_str(&format!(
            "impl GetLanguageInfo for {name} {{\n    type Output = &'static LanguageInfo;\n\n    fn language_info(self) -> Self::Output {{\n        LanguageInfo::{getter}(self)\n    }}\n}}\n\n",
            name = family.name(),
            getter = total_getter(family),
        ));
    }
    output.push_str(
        "\
impl GetLanguageInfo for LocaleCode {
    type Output = Result<&'static LanguageInfo, UnknownIdentifier>;

    fn language_info(self) -> Self::Output {
        LanguageInfo::from_locale(self)
    }
}
",
    );

    output
}

fn emit_equivalence(output: &mut String, trait_name: &str, method: &str, noun: &str, families: &[EnumFamily]) {
    output.push_str(&format!(
        "/// Determines whether two identifiers denote the same {}.\npub trait {}<Rhs> {{\n    fn {}(self, other: Rhs) -> bool;\n}}\n\n",
        noun, trait_name, method
    ));
    for &lhs in families {
        for &rhs in families {
            if lhs == rhs {
                continue;
            }
            output.push_str(&format!(
                "impl {trait_name}<{rhs}> for {lhs} {{\n    fn {method}(self, other: {rhs}) -> bool {{\n        self.id() == other.id()\n    }}\n}}\n\n",
                trait_name = trait_name,
                lhs = lhs.name(),
                rhs = rhs.name(),
                method = method,
            ));
        }
    }
}

// =============================================================================
// Helper Utilities
// =============================================================================

const UNKNOWN_IDENTIFIER: &str = "\
/// Raised when an identifier has no entry in a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownIdentifier {
    /// Identifier family that was searched.
    pub family: &'static str,
    /// The identifier that was not found.
    pub id: i32,
}

impl std::fmt::Display for UnknownIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, \"unknown {} identifier: {}\", self.family, self.id)
    }
}

impl std::error::Error for UnknownIdentifier {}

";

/// Name of the infallible accessor generated for a family
fn total_getter(family: EnumFamily) -> &'static str {
    match family {
        EnumFamily::Country => "from_country",
        EnumFamily::CountryIso2Code | EnumFamily::LanguageIso2Code => "from_iso2",
        EnumFamily::CountryIso3Code | EnumFamily::LanguageIso3Code => "from_iso3",
        EnumFamily::LocaleCode => "from_locale",
    }
}

/// `id => Some(row)` lookup over a match
fn emit_index_fn(output: &mut String, name: &str, entries: &[(i32, usize)]) {
    output.push_str(&format!("    const fn {}(id: i32) -> Option<usize> {{\n", name));
    output.push_str("        match id {\n");
    for (id, row) in entries {
        output.push_str(&format!("            {} => Some({}),\n", id, row));
    }
    output.push_str("            _ => None,\n");
    output.push_str("        }\n");
    output.push_str("    }\n\n");
}

/// Exhaustive `member => &ALL[row]` accessor; the compiler checks coverage
fn emit_total_lookup(
    output: &mut String,
    tables: &EnumTables,
    family: EnumFamily,
    fn_name: &str,
    arg: &str,
    row_type: &str,
    rows: &[i32],
) -> Result<()> {
    let name = family.name();
    output.push_str(&format!("    /// Gets the {} for a `{}`.\n", to_lower_noun(row_type), name));
    output.push_str(&format!(
        "    pub fn {}({}: {}) -> &'static {} {{\n",
        fn_name, arg, name, row_type
    ));
    output.push_str(&format!("        match {} {{\n", arg));
    for (row, &id) in rows.iter().enumerate() {
        output.push_str(&format!(
            "            {}::{} => &Self::ALL[{}],\n",
            name,
            tables.symbol(family, id)?,
            row
        ));
    }
    output.push_str("        }\n");
    output.push_str("    }\n\n");
    Ok(())
}

fn member_list(tables: &EnumTables, family: EnumFamily, ids: &[i32]) -> Result<String> {
    let name = family.name();
    let members = ids
        .iter()
        .map(|&id| -> Result<String> { Ok(format!("{}::{}", name, tables.symbol(family, id)?)) })
        .collect::<Result<Vec<_>>>()?;
    Ok(members.join(", "))
}

fn to_lower_noun(row_type: &str) -> &'static str {
    if row_type.starts_with("Country") {
        "country"
    } else {
        "language"
    }
}

/// Keep doc comments on one line
fn doc_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::tables::EnumMember;

    fn member(symbol: &str, id: i32, english_name: &str, code: &str) -> EnumMember {
        EnumMember {
            symbol: symbol.into(),
            id,
            english_name: english_name.into(),
            code: code.into(),
        }
    }

    #[test]
    fn test_emit_enum() {
        let table = EnumTable::new(
            EnumFamily::CountryIso2Code,
            vec![member("US", 244, "United States", "US"), member("FR", 84, "France", "FR")],
        )
        .unwrap();
        let code = emit_enum(&table, &Namespace::parse("Sic.CountryInfos").unwrap());

        assert!(code.starts_with("// <auto-generated>"));
        assert!(code.contains("//! `crate::sic::country_infos::enums::country_iso2_code`"));
        assert!(code.contains("/// Represents the ISO 3166 ALPHA-2 code of a country.\n"));
        assert!(code.contains("#[repr(i32)]\npub enum CountryIso2Code {"));
        assert!(code.contains("    /// United States - US\n    US = 244,\n"));
        assert!(code.find("FR = 84").unwrap() < code.find("US = 244").unwrap());
        assert!(code.contains("            84 => Some(Self::FR),\n"));
    }

    #[test]
    fn test_emit_empty_enum() {
        let table = EnumTable::new(EnumFamily::Country, Vec::new()).unwrap();
        let code = emit_enum(&table, &Namespace::default());

        assert!(!code.contains("#[repr(i32)]"));
        assert!(code.contains("pub enum Country {\n}"));
        assert!(code.contains("match self {}"));
    }

    #[test]
    fn test_emit_extensions_pairs() {
        let code = emit_extensions(&Namespace::default());

        assert!(code.contains("impl IsSameCountry<CountryIso3Code> for CountryIso2Code {"));
        assert!(code.contains("impl IsSameCountry<CountryIso2Code> for Country {"));
        assert!(code.contains("impl IsSameLanguage<LanguageIso3Code> for LanguageIso2Code {"));
        assert!(!code.contains("impl IsSameCountry<Country> for Country"));
        assert_eq!(code.matches("impl IsSameCountry<").count(), 6);
        assert_eq!(code.matches("impl IsSameLanguage<").count(), 2);
        assert!(code.contains("CountryInfo::from_iso3(self)"));
        assert!(code.contains("use crate::enums::locale_code::LocaleCode;"));
    }

    #[test]
    fn test_doc_text_single_line() {
        assert_eq!(doc_text("a\nb\r\nc"), "a b  c");
    }
}
