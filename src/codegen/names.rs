//! Symbol Assignment
//!
//! Derives enum member names from catalogue data and assigns them to groups
//! while keeping every table injective:
//! - Sanitization (`&` -> `And`, only alphanumerics and `_` survive)
//! - Collision detection on both the symbol and the numeric identifier
//! - Collision resolution through a pluggable [`TieBreak`]
//!
//! Processing order is the order candidates are handed in; it is defined by
//! the upstream grouping, never by this module.

use std::collections::HashMap;

use super::config::ConflictPolicy;
use super::tables::{EnumFamily, EnumMember};
use crate::diagnostics::Diagnostics;
use crate::error::{GenerationError, Result};

// =============================================================================
// Sanitization
// =============================================================================

/// Strip a raw name down to a valid identifier
pub fn sanitize_symbol(raw: &str) -> String {
    let mut symbol: String = raw
        .replace('&', "And")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    // A lone `_` is a pattern, not an identifier
    if symbol.is_empty() || symbol == "_" {
        return "Unnamed".to_string();
    }
    if symbol.starts_with(|c: char| c.is_numeric()) {
        symbol.insert(0, '_');
    }
    if RUST_KEYWORDS.contains(&symbol.as_str()) {
        symbol.push('_');
    }
    symbol
}

/// `Country` member name from a region english name
pub fn country_symbol(english_name: &str) -> String {
    sanitize_symbol(english_name)
}

/// `LocaleCode` member name (`en-US` -> `en_US`)
pub fn locale_symbol(locale_name: &str) -> String {
    sanitize_symbol(&locale_name.replace('-', "_"))
}

/// Language member name (`en` -> `EN`)
pub fn language_symbol(code: &str) -> String {
    sanitize_symbol(&code.to_uppercase())
}

/// Whether `ident` can be used as a plain module or item name
pub fn is_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// Convert to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c == '-' || c == ' ' {
            result.push('_');
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

// =============================================================================
// Tie Break
// =============================================================================

/// A collision between an assigned member and a new candidate
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
    pub family: EnumFamily,
    pub existing: &'a EnumMember,
    pub candidate: &'a EnumMember,
    /// True when the symbols collide, false when only the identifiers do
    pub on_symbol: bool,
}

/// Which side of a conflict keeps its place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Existing,
    Candidate,
}

/// Conflict resolution strategy
pub trait TieBreak {
    fn resolve(&self, conflict: &Conflict<'_>) -> Result<Winner>;
}

impl TieBreak for ConflictPolicy {
    fn resolve(&self, conflict: &Conflict<'_>) -> Result<Winner> {
        match self {
            ConflictPolicy::FirstSeenWins => Ok(Winner::Existing),
            ConflictPolicy::LastSeenWins => Ok(Winner::Candidate),
            ConflictPolicy::Error if conflict.on_symbol => Err(GenerationError::AmbiguousName {
                family: conflict.family.to_string(),
                symbol: conflict.candidate.symbol.clone(),
                first: conflict.existing.to_string(),
                second: conflict.candidate.to_string(),
            }),
            ConflictPolicy::Error => Err(GenerationError::DuplicateIdentifier {
                family: conflict.family.to_string(),
                id: conflict.candidate.id,
                first: conflict.existing.to_string(),
                second: conflict.candidate.to_string(),
            }),
        }
    }
}

impl<F> TieBreak for F
where
    F: Fn(&Conflict<'_>) -> Result<Winner>,
{
    fn resolve(&self, conflict: &Conflict<'_>) -> Result<Winner> {
        self(conflict)
    }
}

// =============================================================================
// Symbol Assigner
// =============================================================================

/// A group asking for a member in one family
#[derive(Debug, Clone)]
pub struct Candidate<K> {
    /// Identifies the group the member belongs to
    pub key: K,
    pub member: EnumMember,
}

/// Outcome of assigning one family
#[derive(Debug, Clone)]
pub struct Assignment<K> {
    /// Winning candidates, in processing order
    pub accepted: Vec<Candidate<K>>,
    /// Losing candidates, in the order they lost
    pub rejected: Vec<Candidate<K>>,
}

impl<K: PartialEq> Assignment<K> {
    pub fn is_rejected(&self, key: &K) -> bool {
        self.rejected.iter().any(|c| &c.key == key)
    }
}

/// Assigns members for a single family
pub struct SymbolAssigner<'a> {
    family: EnumFamily,
    tie_break: &'a dyn TieBreak,
}

impl<'a> SymbolAssigner<'a> {
    pub fn new(family: EnumFamily, tie_break: &'a dyn TieBreak) -> Self {
        Self { family, tie_break }
    }

    /// Assign candidates in order, settling every collision via the tie break
    pub fn assign<K>(
        &self,
        candidates: impl IntoIterator<Item = Candidate<K>>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Assignment<K>> {
        let mut slots: Vec<Option<Candidate<K>>> = Vec::new();
        let mut by_symbol: HashMap<String, usize> = HashMap::new();
        let mut by_id: HashMap<i32, usize> = HashMap::new();
        let mut rejected = Vec::new();

        for candidate in candidates {
            let mut owners: Vec<(usize, bool)> = Vec::with_capacity(2);
            if let Some(&slot) = by_symbol.get(&candidate.member.symbol) {
                owners.push((slot, true));
            }
            if let Some(&slot) = by_id.get(&candidate.member.id) {
                if owners.iter().all(|&(s, _)| s != slot) {
                    owners.push((slot, false));
                }
            }

            let mut candidate_wins = true;
            for &(slot, on_symbol) in &owners {
                let Some(existing) = slots[slot].as_ref() else {
                    continue;
                };
                let conflict = Conflict {
                    family: self.family,
                    existing: &existing.member,
                    candidate: &candidate.member,
                    on_symbol,
                };
                if self.tie_break.resolve(&conflict)? == Winner::Existing {
                    self.note(diagnostics, &existing.member, &candidate.member, on_symbol);
                    candidate_wins = false;
                    break;
                }
            }
            if !candidate_wins {
                rejected.push(candidate);
                continue;
            }

            for &(slot, on_symbol) in &owners {
                if let Some(loser) = slots[slot].take() {
                    self.note(diagnostics, &candidate.member, &loser.member, on_symbol);
                    by_symbol.remove(&loser.member.symbol);
                    by_id.remove(&loser.member.id);
                    rejected.push(loser);
                }
            }

            let slot = slots.len();
            by_symbol.insert(candidate.member.symbol.clone(), slot);
            by_id.insert(candidate.member.id, slot);
            slots.push(Some(candidate));
        }

        Ok(Assignment {
            accepted: slots.into_iter().flatten().collect(),
            rejected,
        })
    }

    fn note(&self, diagnostics: &mut Diagnostics, kept: &EnumMember, dropped: &EnumMember, on_symbol: bool) {
        let family = self.family.name();
        if on_symbol {
            tracing::warn!(family, symbol = %dropped.symbol, kept = %kept, dropped = %dropped, "symbol collision");
            diagnostics.name_conflict(family, &dropped.symbol, &kept.to_string(), &dropped.to_string());
        } else {
            tracing::warn!(family, id = dropped.id, kept = %kept, dropped = %dropped, "identifier collision");
            diagnostics.id_conflict(family, dropped.id, &kept.to_string(), &dropped.to_string());
        }
    }
}

// =============================================================================
// Keywords
// =============================================================================

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
    "super", "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield",
];
