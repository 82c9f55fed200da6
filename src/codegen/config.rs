//! Codegen Configuration
//!
//! Settings that change what the generated tables contain, as opposed to
//! where inputs come from or where artifacts go (see [`crate::config`]).

use serde::{Deserialize, Serialize};

/// Global codegen configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// How symbol and identifier collisions are settled
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

/// Conflict resolution when two groups claim the same symbol or identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// The earliest group in processing order keeps the symbol
    #[default]
    FirstSeenWins,
    /// The latest group in processing order takes the symbol over
    LastSeenWins,
    /// Any collision aborts the run
    Error,
}
