//! Country Infos CLI
//!
//! Generates the country, locale and language modules from a locale
//! catalogue, or checks that the modules on disk are current.
//!
//! Usage:
//!   country-infos generate --catalogue cultures.json --output src/generated
//!   country-infos check --output src/generated
//!   country-infos config
//!   country-infos --help

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use country_infos::{
    codegen, drift, ConflictPolicy, DriftStatus, GeneratedSet, GeneratorConfig, JsonCatalogue, RegionFilter,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "country-infos")]
#[command(about = "Generate cross-referenced country, locale and language tables")]
struct Cli {
    /// Configuration file (in addition to the default locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Locale catalogue (JSON)
    #[arg(long, global = true)]
    catalogue: Option<PathBuf>,

    /// Allow-list file; `IsoCode2*` / `IsoCode3*` names match region codes
    #[arg(long, global = true)]
    allow_list: Option<PathBuf>,

    /// Target namespace, e.g. `Sic.CountryInfos`
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Output directory
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Conflict policy for colliding names or identifiers
    #[arg(long, global = true, value_enum)]
    policy: Option<Policy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every artifact into the output directory
    Generate {
        /// Print dropped records
        #[arg(long)]
        verbose: bool,
    },

    /// Fail if the artifacts on disk differ from a fresh generation
    Check {
        /// Print unified diffs of stale artifacts
        #[arg(long)]
        diff: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    FirstSeenWins,
    LastSeenWins,
    Error,
}

impl From<Policy> for ConflictPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::FirstSeenWins => ConflictPolicy::FirstSeenWins,
            Policy::LastSeenWins => ConflictPolicy::LastSeenWins,
            Policy::Error => ConflictPolicy::Error,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when the command ran but found a problem
fn run(cli: Cli) -> Result<bool> {
    let config = effective_config(&cli)?;

    match cli.command {
        Commands::Generate { verbose } => {
            let set = build(&config)?;
            report_diagnostics(&set, verbose);

            let written = set
                .write_to(&config.output.dir)
                .with_context(|| format!("writing artifacts to {}", config.output.dir.display()))?;
            println!("✅ Wrote {} artifacts to {}", written.len(), config.output.dir.display());
            Ok(true)
        }

        Commands::Check { diff } => {
            let set = build(&config)?;
            let report = drift::check(&set, &config.output.dir)?;

            for artifact in &report.artifacts {
                let marker = if artifact.status.is_clean() { "✅" } else { "❌" };
                println!("{} {}", marker, artifact);
                if let (true, DriftStatus::Stale { diff: text, .. }) = (diff, &artifact.status) {
                    println!("{}", text);
                }
            }

            println!();
            if report.is_clean() {
                println!("✅ All artifacts are up to date");
                Ok(true)
            } else {
                println!(
                    "❌ {} artifacts drifted; run `country-infos generate`",
                    report.drifted().count()
                );
                Ok(false)
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(true)
        }
    }
}

/// Layered configuration with command line flags on top
fn effective_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = GeneratorConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    if let Some(path) = &cli.catalogue {
        config.catalogue.path = path.clone();
    }
    if let Some(path) = &cli.allow_list {
        config.filter.allow_list = Some(path.clone());
    }
    if let Some(namespace) = &cli.namespace {
        config.namespace.custom = Some(namespace.clone());
    }
    if let Some(dir) = &cli.output {
        config.output.dir = dir.clone();
    }
    if let Some(policy) = cli.policy {
        config.codegen.conflict_policy = policy.into();
    }

    Ok(config)
}

fn build(config: &GeneratorConfig) -> Result<GeneratedSet> {
    let catalogue = JsonCatalogue::new(&config.catalogue.path);
    let filter = RegionFilter::from_path(config.filter.allow_list.as_deref())?;

    let set = codegen::generate(&catalogue, &filter, config.namespace(), &config.codegen)?;
    Ok(set)
}

fn report_diagnostics(set: &GeneratedSet, verbose: bool) {
    let diagnostics = set.diagnostics();
    println!(
        "📊 {} countries, {} locales, {} languages ({} records dropped, {} warnings)",
        set.countries().len(),
        set.tables().locale.len(),
        set.languages().len(),
        diagnostics.len(),
        diagnostics.warning_count()
    );

    if verbose {
        for item in diagnostics {
            println!("   {}", item);
        }
    } else {
        for item in diagnostics.warnings() {
            println!("   ⚠️  {}", item);
        }
    }
}
