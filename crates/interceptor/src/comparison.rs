//! The commit comparison port and the result it produces.
//!
//! [`CommitComparer`] is implemented by infrastructure crates (the `github`
//! crate today). This crate only consumes it; it never performs the lookup
//! itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CommitRef, ComparisonError, RepositoryName};

// ---------------------------------------------------------------------------
// Comparison result
// ---------------------------------------------------------------------------

/// One file-level entry of a comparison between two commits.
///
/// Either name may be absent. A rename carries both; an upstream that only
/// reports the old location of a file carries only `previous_filename`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file at the head commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Path of the file at the base commit, when it differs (renames).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

/// The file-level changes between two commits, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitComparison {
    /// Changed entries exactly as the upstream ordered them.
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

impl CommitComparison {
    /// Flattens the comparison into the list of touched paths.
    ///
    /// For each entry, in order: the current name if non-empty, then the
    /// previous name if non-empty. Duplicates are kept and nothing is sorted.
    pub fn changed_paths(&self) -> Vec<String> {
        let mut paths = Vec::with_capacity(self.files.len());
        for file in &self.files {
            if let Some(name) = file.filename.as_deref().filter(|n| !n.is_empty()) {
                paths.push(name.to_string());
            }
            if let Some(name) = file.previous_filename.as_deref().filter(|n| !n.is_empty()) {
                paths.push(name.to_string());
            }
        }
        paths
    }
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Resolves the file-level diff between two commits of a repository.
///
/// Implementations hold their own upstream configuration (base address,
/// client handle) and must be safe to share across concurrent requests.
/// They perform exactly one attempt per call; retry policy belongs to the
/// caller of the interceptor, not here.
#[async_trait]
pub trait CommitComparer: Send + Sync {
    /// Compares `base` to `head` in `repository`.
    async fn compare(
        &self,
        repository: &RepositoryName,
        base: &CommitRef,
        head: &CommitRef,
    ) -> Result<CommitComparison, ComparisonError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(filename: Option<&str>, previous: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: filename.map(str::to_string),
            previous_filename: previous.map(str::to_string),
        }
    }

    #[test]
    fn keeps_upstream_order_and_appends_previous_after_current() {
        let comparison = CommitComparison {
            files: vec![
                file(Some("folder/subfolder1/file"), None),
                file(None, Some("folder/subfolder2/file")),
                file(Some("folder/subfolder3/file"), None),
            ],
        };

        assert_eq!(
            comparison.changed_paths(),
            vec![
                "folder/subfolder1/file",
                "folder/subfolder2/file",
                "folder/subfolder3/file",
            ]
        );
    }

    #[test]
    fn rename_contributes_both_names() {
        let comparison = CommitComparison {
            files: vec![file(Some("new/path.rs"), Some("old/path.rs"))],
        };
        assert_eq!(comparison.changed_paths(), vec!["new/path.rs", "old/path.rs"]);
    }

    #[test]
    fn duplicates_are_preserved() {
        let comparison = CommitComparison {
            files: vec![file(Some("a.txt"), Some("a.txt")), file(Some("a.txt"), None)],
        };
        assert_eq!(comparison.changed_paths(), vec!["a.txt", "a.txt", "a.txt"]);
    }

    #[test]
    fn empty_names_are_skipped() {
        let comparison = CommitComparison {
            files: vec![file(Some(""), Some("")), file(None, None), file(Some("b"), Some(""))],
        };
        assert_eq!(comparison.changed_paths(), vec!["b"]);
    }

    #[test]
    fn no_files_yields_no_paths() {
        assert!(CommitComparison::default().changed_paths().is_empty());
    }
}
