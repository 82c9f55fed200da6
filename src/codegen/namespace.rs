//! Target module path for generated artifacts
//!
//! A namespace such as `Sic.CountryInfos` or `sic::country_infos` becomes the
//! module path `crate::sic::country_infos`. Generated code reaches its
//! siblings through that path.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::names::{is_keyword, to_snake_case};
use super::tables::EnumFamily;
use crate::error::{GenerationError, Result};

fn identifier() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"))
}

/// Parsed target namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    /// Parse a namespace; an empty string targets the crate root
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let segments = raw
            .replace("::", ".")
            .split('.')
            .map(|segment| {
                let segment = to_snake_case(segment.trim());
                if identifier().is_match(&segment) && !is_keyword(&segment) && segment != "_" {
                    Ok(segment)
                } else {
                    Err(GenerationError::InvalidNamespace(raw.to_string()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Absolute path of an item below the namespace
    pub fn path(&self, tail: &[&str]) -> String {
        std::iter::once("crate")
            .chain(self.segments.iter().map(String::as_str))
            .chain(tail.iter().copied())
            .collect::<Vec<_>>()
            .join("::")
    }

    /// `use` path of a generated enum
    pub fn enum_path(&self, family: EnumFamily) -> String {
        self.path(&["enums", family.module(), family.name()])
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_namespace() {
        let ns = Namespace::parse("Sic.CountryInfos").unwrap();
        assert_eq!(ns.segments(), &["sic".to_string(), "country_infos".to_string()]);
        assert_eq!(ns.to_string(), "crate::sic::country_infos");
    }

    #[test]
    fn test_rust_path_namespace() {
        let ns = Namespace::parse("geo::tables").unwrap();
        assert_eq!(
            ns.enum_path(EnumFamily::CountryIso2Code),
            "crate::geo::tables::enums::country_iso2_code::CountryIso2Code"
        );
    }

    #[test]
    fn test_empty_namespace_is_root() {
        let ns = Namespace::parse("  ").unwrap();
        assert!(ns.is_root());
        assert_eq!(ns.path(&["country_info", "CountryInfo"]), "crate::country_info::CountryInfo");
    }

    #[test]
    fn test_invalid_namespace() {
        assert!(matches!(Namespace::parse("1abc"), Err(GenerationError::InvalidNamespace(_))));
        assert!(matches!(Namespace::parse("a..b"), Err(GenerationError::InvalidNamespace(_))));
        assert!(matches!(Namespace::parse("my.mod"), Err(GenerationError::InvalidNamespace(_))));
    }
}
