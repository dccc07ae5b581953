//! Listing the commits to import.

use graft_git::SourceOps;
use tracing::debug;

use crate::error::{Error, Result};

/// List the commits to import, oldest first.
///
/// With `flatten`, only the first-parent chain is followed, so merged side
/// branches contribute nothing but the merge commit itself.
///
/// # Errors
/// Returns `NoCommits` if there is nothing to import, or a git error if the
/// log query fails.
pub fn enumerate_commits<S: SourceOps>(source: &S, flatten: bool) -> Result<Vec<String>> {
    let mut commits = source.log_commits(flatten)?;
    commits.reverse();

    debug!(count = commits.len(), flatten, "enumerated commits");

    if commits.is_empty() {
        return Err(Error::NoCommits(source.workdir().display().to_string()));
    }

    Ok(commits)
}
