//! [`HostOps`] for a real repository.

use std::path::Path;

use git2::Oid;
use tracing::debug;

use crate::Repository;
use crate::command::failure;
use crate::error::Result;
use crate::traits::{ApplyOptions, HostOps};

/// Exit status of `git config --unset` when the key is not set.
const CONFIG_KEY_MISSING: i32 = 5;

/// Directory `git am` keeps its state in while a patch series is stopped.
const APPLY_STATE_DIR: &str = "rebase-apply";

impl HostOps for Repository {
    fn root(&self) -> &Path {
        self.workdir()
    }

    fn head(&self) -> Result<Oid> {
        self.head_commit()
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        // Refresh stat info first so touched-but-identical files don't count.
        self.git().probe(&["update-index", "-q", "--refresh"])?;
        let changes = self.git().run(&["diff-index", "HEAD"])?;
        Ok(!changes.is_empty())
    }

    fn config_get(&self, key: &str) -> Result<Option<String>> {
        // `--local` also turns off include.path, so the value read is exactly
        // what config_set/config_unset would touch.
        let args = ["config", "--local", key];
        let output = self.git().probe(&args)?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            )),
            Some(1) => Ok(None),
            _ => Err(failure(&args, &output)),
        }
    }

    fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.git().run(&["config", "--local", key, value])?;
        Ok(())
    }

    fn config_unset(&self, key: &str) -> Result<()> {
        let args = ["config", "--local", "--unset", key];
        let output = self.git().probe(&args)?;
        match output.status.code() {
            Some(0 | CONFIG_KEY_MISSING) => Ok(()),
            _ => Err(failure(&args, &output)),
        }
    }

    fn apply_mailbox(&self, patch: &[u8], options: ApplyOptions) -> Result<()> {
        let mut args = vec!["am", "-3", "--keep-non-patch"];
        if options.committer_date_is_author_date {
            args.push("--committer-date-is-author-date");
        }

        self.git().run_with_stdin(&args, patch)?;
        Ok(())
    }

    fn apply_skip(&self) -> Result<()> {
        // format-patch emits nothing for an empty commit, and `git am` rejects
        // empty input before it records any state.
        if !self.git_dir().join(APPLY_STATE_DIR).exists() {
            debug!("no apply in progress, nothing to skip");
            return Ok(());
        }
        self.git().run(&["am", "--skip"])?;
        Ok(())
    }

    fn apply_abort(&self) -> Result<()> {
        self.git().run(&["am", "--abort"])?;
        Ok(())
    }

    fn reset_hard(&self, target: Oid) -> Result<()> {
        self.git().run(&["reset", "--hard", &target.to_string()])?;
        Ok(())
    }
}
