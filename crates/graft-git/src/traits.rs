//! Trait abstractions for git operations.
//!
//! An import talks to two repositories with very different roles, so the
//! subprocess contract is split in two:
//!
//! - [`SourceOps`]: read-only queries against the external repository.
//! - [`HostOps`]: inspection and mutation of the host repository.
//!
//! [`Repository`](crate::Repository) implements both; tests substitute mocks.
//!
//! Note: git operations are synchronous. Each call blocks until the
//! subprocess exits, which is what keeps patch application strictly ordered.

use std::path::Path;

use git2::Oid;

use crate::Result;

/// An author or committer identity as stored in git config or a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// `user.email`, or `None` when unset.
    pub email: Option<String>,
    /// `user.name`, or `None` when unset.
    pub name: Option<String>,
}

impl Identity {
    /// Build an identity with both fields present.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            name: Some(name.into()),
        }
    }
}

/// Options for applying a mailbox patch to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Record the author date as the committer date.
    pub committer_date_is_author_date: bool,
}

/// Read-only operations on the repository being imported.
#[allow(clippy::missing_errors_doc)]
pub trait SourceOps {
    /// Get the working directory path.
    fn workdir(&self) -> &Path;

    /// List abbreviated commit hashes reachable from HEAD, newest first.
    ///
    /// With `first_parent`, merge side branches are not traversed.
    /// Returns an empty list when HEAD has no commits.
    fn log_commits(&self, first_parent: bool) -> Result<Vec<String>>;

    /// Produce a single-commit mailbox patch using custom path prefixes.
    ///
    /// The patch is raw bytes: file content is not required to be UTF-8.
    fn format_patch(&self, commit: &str, src_prefix: &str, dst_prefix: &str)
    -> Result<Vec<u8>>;

    /// Produce the full diff of a commit against its first parent, in
    /// mailbox form, using custom path prefixes.
    fn first_parent_diff(
        &self,
        commit: &str,
        src_prefix: &str,
        dst_prefix: &str,
    ) -> Result<Vec<u8>>;

    /// The installed git version, without the `git version ` prefix.
    fn git_version(&self) -> Result<String>;

    /// The author email and name recorded on a commit.
    fn commit_author(&self, commit: &str) -> Result<Identity>;

    /// Whether a commit introduces no change relative to its parent(s).
    fn commit_diff_is_empty(&self, commit: &str) -> Result<bool>;
}

/// Operations on the repository receiving the import.
#[allow(clippy::missing_errors_doc)]
pub trait HostOps {
    /// Get the repository root (working directory).
    fn root(&self) -> &Path;

    /// The commit HEAD currently points at.
    fn head(&self) -> Result<Oid>;

    /// Whether tracked files differ from HEAD.
    fn has_uncommitted_changes(&self) -> Result<bool>;

    /// Read a value from the repository's own config file, `None` when unset.
    ///
    /// Global, system and included config files are not consulted.
    fn config_get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value to the repository's own config file.
    fn config_set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value from the repository's own config file. Removing an
    /// unset key succeeds.
    fn config_unset(&self, key: &str) -> Result<()>;

    /// Apply a mailbox patch with three-way merge fallback.
    fn apply_mailbox(&self, patch: &[u8], options: ApplyOptions) -> Result<()>;

    /// Skip the patch the in-progress apply stopped on. Does nothing when
    /// no apply is in progress.
    fn apply_skip(&self) -> Result<()>;

    /// Abort an in-progress apply, restoring the branch it started from.
    fn apply_abort(&self) -> Result<()>;

    /// Hard reset the current branch and working tree to `target`.
    fn reset_hard(&self, target: Oid) -> Result<()>;
}
