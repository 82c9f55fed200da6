//! Configuration management for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (country-infos.toml)
//! - Environment variables (COUNTRY_INFOS__*)
//!
//! ## Example config file (country-infos.toml):
//! ```toml
//! [namespace]
//! root = "Sic"
//! custom = "Sic.CountryInfos"
//!
//! [catalogue]
//! path = "data/cultures.json"
//!
//! [filter]
//! allow_list = "IsoCode2.txt"
//!
//! [output]
//! dir = "src/generated"
//!
//! [codegen]
//! conflict_policy = "first-seen-wins"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codegen::config::CodegenConfig;

/// Main configuration for a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Target namespace settings
    #[serde(default)]
    pub namespace: NamespaceConfig,

    /// Catalogue input
    #[serde(default)]
    pub catalogue: CatalogueConfig,

    /// Allow-list filter
    #[serde(default)]
    pub filter: FilterConfig,

    /// Artifact output
    #[serde(default)]
    pub output: OutputConfig,

    /// Table generation settings
    #[serde(default)]
    pub codegen: CodegenConfig,
}

/// Namespace configuration.
///
/// `custom` overrides `root`; absent both, artifacts target the crate root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub custom: Option<String>,
}

/// Catalogue configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueConfig {
    /// JSON catalogue file
    #[serde(default = "default_catalogue_path")]
    pub path: PathBuf,
}

/// Filter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Allow-list file; its name selects the matched field
    #[serde(default)]
    pub allow_list: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the generated modules
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

// Default value functions
fn default_catalogue_path() -> PathBuf {
    PathBuf::from("cultures.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            path: default_catalogue_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl NamespaceConfig {
    /// Effective namespace: custom, then root, then empty
    pub fn resolve(&self) -> &str {
        [&self.custom, &self.root]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

impl GeneratorConfig {
    /// Load configuration from the default locations, then `config_path`
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["country-infos.toml", ".country-infos.toml", "config/country-infos.toml"];

        for location in config_locations {
            builder = builder.add_source(File::from(Path::new(location)).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "sic", "country-infos") {
            let xdg_config = config_dir.config_dir().join("country-infos.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Load from environment variables (COUNTRY_INFOS__*)
        builder = builder.add_source(
            Environment::with_prefix("COUNTRY_INFOS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn namespace(&self) -> &str {
        self.namespace.resolve()
    }
}
