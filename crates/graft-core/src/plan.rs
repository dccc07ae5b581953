//! Validation that runs before an import touches anything.
//!
//! Checks run in a fixed order and stop at the first failure:
//! source path exists, is a directory, has a named package; the target base
//! is a configured package directory; the target stays inside the git root
//! and does not exist yet. Commit enumeration and the clean-tree check
//! follow in [`ImportSession::plan`](crate::ImportSession::plan).

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::config::Project;
use crate::error::{Error, Result};
use crate::package::read_package_name;

/// What the import was asked to do, beyond the source path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportOptions {
    /// Follow first-parent history and apply each commit as a full diff.
    pub flatten: bool,
    /// Record each commit with its original author as committer.
    pub preserve_commit: bool,
}

/// The external repository, as validated on disk.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    /// The path as the user gave it, for messages.
    pub input: String,
    /// Canonical absolute path.
    pub path: PathBuf,
    /// Final path component; names the target directory.
    pub base_name: String,
    /// Name from the package descriptor.
    pub package_name: String,
}

/// Validate the external repository path and read its package name.
///
/// # Errors
/// Returns `RepositoryNotFound`, `NotADirectory`, `MissingPackageDescriptor`,
/// `NoPackageName` or `PackageParse`.
pub fn inspect_source(input: &Path) -> Result<SourceInfo> {
    let display = input.display().to_string();

    let metadata = match fs::metadata(input) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            return Err(Error::RepositoryNotFound(display));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        return Err(Error::NotADirectory(display));
    }

    let path = input.canonicalize()?;
    let base_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::NotADirectory(display.clone()))?;
    let package_name = read_package_name(&path)?;

    Ok(SourceInfo {
        input: display,
        path,
        base_name,
        package_name,
    })
}

/// Where the imported files land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetMapping {
    target_dir: PathBuf,
    git_relative: String,
}

impl TargetMapping {
    /// Target directory relative to the project root.
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Target directory relative to the git root, `/`-separated.
    ///
    /// This is the prefix inserted into every patch path.
    #[must_use]
    pub fn git_relative(&self) -> &str {
        &self.git_relative
    }
}

/// Compute and validate the target directory for `base_name`.
///
/// # Errors
/// Returns `InvalidDestination`, `NotInRepository` or `TargetExists`.
pub fn resolve_target(
    project: &Project,
    git_root: &Path,
    dest: Option<&str>,
    base_name: &str,
) -> Result<TargetMapping> {
    let config = project.config();
    let allowed = config.package_directories();
    let target_base = config.target_base(dest);

    let base_key = target_base.trim_end_matches(['/', '\\']);
    if !allowed.iter().any(|dir| dir == base_key) {
        return Err(Error::InvalidDestination {
            dest: target_base,
            allowed,
        });
    }

    let target_dir = Path::new(base_key).join(base_name);

    let not_in_repo = || Error::NotInRepository {
        project_root: project.root().to_path_buf(),
        git_root: git_root.to_path_buf(),
    };
    let project_offset = project.root().strip_prefix(git_root).map_err(|_| not_in_repo())?;
    let relative = normalize(&project_offset.join(&target_dir)).ok_or_else(not_in_repo)?;

    if project.root().join(&target_dir).exists() {
        return Err(Error::TargetExists(target_dir.display().to_string()));
    }

    let git_relative = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Ok(TargetMapping {
        target_dir,
        git_relative,
    })
}

/// Lexically resolve `.` and `..`. Returns `None` if the path climbs above
/// its starting point or is absolute.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
