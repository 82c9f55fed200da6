//! Drift Detection
//!
//! Compares a freshly generated set against the modules already on disk.
//! A run is clean when every artifact exists with identical content.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::{ChangeTag, TextDiff};

use crate::checksum::Checksum;
use crate::codegen::GeneratedSet;
use crate::error::Result;

/// State of one artifact on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftStatus {
    UpToDate,
    Missing,
    Stale {
        on_disk: Checksum,
        generated: Checksum,
        /// Lines added and removed by regeneration
        insertions: usize,
        deletions: usize,
        /// Unified diff from the file on disk to the generated content
        diff: String,
    },
}

impl DriftStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::UpToDate)
    }
}

/// Drift of a single artifact
#[derive(Debug, Clone)]
pub struct ArtifactDrift {
    pub name: String,
    pub path: PathBuf,
    pub status: DriftStatus,
}

impl fmt::Display for ArtifactDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            DriftStatus::UpToDate => write!(f, "{} up to date", self.path.display()),
            DriftStatus::Missing => write!(f, "{} missing", self.path.display()),
            DriftStatus::Stale {
                on_disk,
                generated,
                insertions,
                deletions,
                ..
            } => write!(
                f,
                "{} stale (+{} -{}) {} -> {}",
                self.path.display(),
                insertions,
                deletions,
                on_disk.short(),
                generated.short()
            ),
        }
    }
}

/// Drift of every artifact in a set
#[derive(Debug, Clone, Default)]
pub struct DriftReport {
    pub artifacts: Vec<ArtifactDrift>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.artifacts.iter().all(|a| a.status.is_clean())
    }

    /// Artifacts that need regeneration
    pub fn drifted(&self) -> impl Iterator<Item = &ArtifactDrift> {
        self.artifacts.iter().filter(|a| !a.status.is_clean())
    }
}

/// Compare `set` against the files below `dir`
pub fn check(set: &GeneratedSet, dir: &Path) -> Result<DriftReport> {
    let mut report = DriftReport::default();

    for artifact in set.artifacts() {
        let path = dir.join(&artifact.path);
        let status = match fs::read_to_string(&path) {
            Ok(on_disk) => compare(&on_disk, &artifact.content, &artifact.path),
            Err(e) if e.kind() == ErrorKind::NotFound => DriftStatus::Missing,
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(artifact = %artifact.name, clean = status.is_clean(), "checked artifact");
        report.artifacts.push(ArtifactDrift {
            name: artifact.name.clone(),
            path: artifact.path.clone(),
            status,
        });
    }

    Ok(report)
}

fn compare(on_disk: &str, generated: &str, path: &Path) -> DriftStatus {
    if on_disk == generated {
        return DriftStatus::UpToDate;
    }

    let diff = TextDiff::from_lines(on_disk, generated);
    let (mut insertions, mut deletions) = (0, 0);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => insertions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    let name = path.display().to_string();
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", name), &format!("b/{}", name))
        .to_string();

    DriftStatus::Stale {
        on_disk: Checksum::from_str(on_disk),
        generated: Checksum::from_str(generated),
        insertions,
        deletions,
        diff: unified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_is_clean() {
        assert_eq!(compare("a\nb\n", "a\nb\n", Path::new("x.rs")), DriftStatus::UpToDate);
    }

    #[test]
    fn test_stale_content_reports_diff() {
        let status = compare("US = 244,\nFR = 84,\n", "US = 244,\nDE = 94,\n", Path::new("enums/country.rs"));
        let DriftStatus::Stale {
            insertions,
            deletions,
            diff,
            on_disk,
            generated,
        } = status
        else {
            panic!("expected stale status");
        };
        assert_eq!((insertions, deletions), (1, 1));
        assert!(diff.contains("--- a/enums/country.rs"));
        assert!(diff.contains("-FR = 84,"));
        assert!(diff.contains("+DE = 94,"));
        assert_ne!(on_disk, generated);
    }
}
