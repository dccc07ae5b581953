//! Error types for graft-core.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable classification of the errors a user can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The external repository path does not exist.
    #[serde(rename = "ENOENT")]
    NotFound,
    /// The external repository path is not a directory.
    #[serde(rename = "ENODIR")]
    NotADirectory,
    /// The package descriptor is missing or has no name.
    #[serde(rename = "ENOPKG")]
    NoPackage,
    /// The destination is not one of the configured package directories.
    #[serde(rename = "EDESTDIR")]
    InvalidDestination,
    /// The target directory already exists.
    #[serde(rename = "EEXISTS")]
    TargetExists,
    /// The target directory would fall outside the git root.
    #[serde(rename = "ENOTINREPO")]
    NotInRepository,
    /// The external repository has no commits.
    #[serde(rename = "NOCOMMITS")]
    NoCommits,
    /// The host repository has uncommitted changes.
    #[serde(rename = "ECHANGES")]
    UncommittedChanges,
    /// Applying a commit failed and the import was rolled back.
    #[serde(rename = "EIMPORT")]
    ImportFailed,
}

impl ErrorKind {
    /// The short code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "ENOENT",
            Self::NotADirectory => "ENODIR",
            Self::NoPackage => "ENOPKG",
            Self::InvalidDestination => "EDESTDIR",
            Self::TargetExists => "EEXISTS",
            Self::NotInRepository => "ENOTINREPO",
            Self::NoCommits => "NOCOMMITS",
            Self::UncommittedChanges => "ECHANGES",
            Self::ImportFailed => "EIMPORT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors that can occur in graft-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Nothing exists at the external repository path.
    #[error("No repository found at \"{0}\"")]
    RepositoryNotFound(String),

    /// The external repository path is a file.
    #[error("Input path \"{0}\" is not a directory")]
    NotADirectory(String),

    /// Neither package.json nor Cargo.toml exists in the external repository.
    #[error("No package descriptor found in \"{}\" (expected package.json or Cargo.toml)", .0.display())]
    MissingPackageDescriptor(PathBuf),

    /// The package descriptor has no `name`.
    #[error("No package name specified in \"{}\"", .0.display())]
    NoPackageName(PathBuf),

    /// The package descriptor could not be parsed.
    #[error("failed to parse {}: {message}", .file.display())]
    PackageParse {
        /// The descriptor file.
        file: PathBuf,
        /// Parser message.
        message: String,
    },

    /// `--dest` names a directory that is not a configured package directory.
    #[error("--dest does not match with the package directories: {}", .allowed.join(","))]
    InvalidDestination {
        /// The requested destination.
        dest: String,
        /// Configured package directories.
        allowed: Vec<String>,
    },

    /// The target directory resolves outside the git working tree.
    #[error("Project root {} is not a subdirectory of git root {}", .project_root.display(), .git_root.display())]
    NotInRepository {
        /// The project root.
        project_root: PathBuf,
        /// The git root.
        git_root: PathBuf,
    },

    /// The target directory is already present.
    #[error("Target directory already exists \"{0}\"")]
    TargetExists(String),

    /// The external repository has nothing to import.
    #[error("No git commits to import at \"{0}\"")]
    NoCommits(String),

    /// The host working tree is dirty.
    #[error("Local repository has un-committed changes")]
    UncommittedChanges,

    /// A commit could not be applied; the host has been rolled back.
    #[error(
        "Failed to apply commit {commit}.\n{message}\n\nYou may try again with --flatten to import flat history."
    )]
    ImportFailed {
        /// The external commit that failed.
        commit: String,
        /// What went wrong.
        message: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(#[from] graft_git::Error),
}

impl Error {
    /// The machine-readable kind, for errors the user is expected to act on.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::RepositoryNotFound(_) => Some(ErrorKind::NotFound),
            Self::NotADirectory(_) => Some(ErrorKind::NotADirectory),
            Self::MissingPackageDescriptor(_)
            | Self::NoPackageName(_)
            | Self::PackageParse { .. } => Some(ErrorKind::NoPackage),
            Self::InvalidDestination { .. } => Some(ErrorKind::InvalidDestination),
            Self::NotInRepository { .. } => Some(ErrorKind::NotInRepository),
            Self::TargetExists(_) => Some(ErrorKind::TargetExists),
            Self::NoCommits(_) => Some(ErrorKind::NoCommits),
            Self::UncommittedChanges => Some(ErrorKind::UncommittedChanges),
            Self::ImportFailed { .. } => Some(ErrorKind::ImportFailed),
            Self::Io(_) | Self::Toml(_) | Self::Git(_) => None,
        }
    }
}
