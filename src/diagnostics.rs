//! Diagnostics
//!
//! Collects what a generation run silently dropped. Nothing in here aborts a
//! run; fatal conditions are [`crate::GenerationError`]s instead.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing dropped input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Ingestion ===
    /// Locale names a language only
    NeutralLocale,
    /// The invariant (root) pseudo-locale
    InvariantLocale,
    /// Catalogue could not map the locale to a region
    UnresolvableRegion,
    /// Region two-letter code contains non-letter characters
    MalformedRegionCode,

    // === Filter ===
    /// Country not on the allow-list
    FilteredOut,

    // === Symbol Assignment ===
    /// Two groups produced the same symbolic name
    AmbiguousName,
    /// Two groups produced the same numeric identifier
    DuplicateIdentifier,
    /// Group removed because a related family rejected it
    Cascaded,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeutralLocale => "I001",
            Self::InvariantLocale => "I002",
            Self::FilteredOut => "I003",
            Self::UnresolvableRegion => "W001",
            Self::MalformedRegionCode => "W002",
            Self::AmbiguousName => "W003",
            Self::DuplicateIdentifier => "W004",
            Self::Cascaded => "W005",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::NeutralLocale | Self::InvariantLocale | Self::FilteredOut => Severity::Info,

            Self::UnresolvableRegion
            | Self::MalformedRegionCode
            | Self::AmbiguousName
            | Self::DuplicateIdentifier
            | Self::Cascaded => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Locale name, region code or symbol the item is about
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.subject
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn record(&mut self, subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) {
        self.push(DiagnosticItem::new(subject, code, message));
    }

    /// Record a symbol collision resolved by policy
    pub fn name_conflict(&mut self, family: &str, symbol: &str, kept: &str, dropped: &str) {
        self.push(
            DiagnosticItem::new(
                dropped,
                DiagnosticCode::AmbiguousName,
                format!("'{}' excluded from {}: symbol '{}' already taken", dropped, family, symbol),
            )
            .with_context(format!("Kept: {}", kept)),
        );
    }

    /// Record a numeric identifier collision resolved by policy
    pub fn id_conflict(&mut self, family: &str, id: i32, kept: &str, dropped: &str) {
        self.push(
            DiagnosticItem::new(
                dropped,
                DiagnosticCode::DuplicateIdentifier,
                format!("'{}' excluded from {}: identifier {} already taken", dropped, family, id),
            )
            .with_context(format!("Kept: {}", kept)),
        );
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items carrying the given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!(
                "\n{} item(s), {} warning(s)\n",
                self.len(),
                self.warning_count()
            ));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
