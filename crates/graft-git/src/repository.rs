//! Repository wrapper pairing a git2 handle with the `git` subprocess runner.

use std::path::{Path, PathBuf};

use git2::Oid;

use crate::command::Git;
use crate::error::{Error, Result};

/// High-level wrapper around a git repository with a working directory.
pub struct Repository {
    inner: git2::Repository,
    workdir: PathBuf,
}

impl Repository {
    /// Open the repository containing `path` (searching parent directories).
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|_| Error::NotARepository)?;
        Self::from_git2(inner)
    }

    /// Open the repository whose working directory is exactly `path`.
    ///
    /// Unlike [`Repository::open`], this never walks up to an enclosing
    /// repository, so a plain directory nested inside another checkout is
    /// rejected.
    ///
    /// # Errors
    /// Returns error if `path` is not the root of a repository.
    pub fn open_exact(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::open(path).map_err(|_| Error::NotARepository)?;
        Self::from_git2(inner)
    }

    fn from_git2(inner: git2::Repository) -> Result<Self> {
        let workdir = inner.workdir().ok_or(Error::BareRepository)?;
        // Canonical paths keep later prefix comparisons honest on systems
        // where temp dirs sit behind symlinks.
        let workdir = workdir
            .canonicalize()
            .unwrap_or_else(|_| workdir.to_path_buf());
        Ok(Self { inner, workdir })
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    /// Get the commit HEAD currently points at.
    ///
    /// # Errors
    /// Returns error if HEAD is unborn or cannot be resolved.
    pub fn head_commit(&self) -> Result<Oid> {
        let commit = self.inner.head()?.peel_to_commit()?;
        Ok(commit.id())
    }

    /// Check whether HEAD resolves to a commit.
    #[must_use]
    pub fn has_commits(&self) -> bool {
        self.head_commit().is_ok()
    }

    pub(crate) fn git(&self) -> Git<'_> {
        Git::new(&self.workdir)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}
