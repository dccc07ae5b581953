//! [`SourceOps`] for a real repository: read-only queries via `git`.

use std::path::Path;

use bstr::ByteSlice;

use crate::Repository;
use crate::command::failure;
use crate::error::Result;
use crate::traits::{Identity, SourceOps};

impl SourceOps for Repository {
    fn workdir(&self) -> &Path {
        Self::workdir(self)
    }

    fn log_commits(&self, first_parent: bool) -> Result<Vec<String>> {
        if !self.has_commits() {
            return Ok(Vec::new());
        }

        let mut args = vec!["log", "--format=%h"];
        if first_parent {
            args.push("--first-parent");
        }

        let stdout = self.git().run(&args)?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn format_patch(
        &self,
        commit: &str,
        src_prefix: &str,
        dst_prefix: &str,
    ) -> Result<Vec<u8>> {
        let src = format!("--src-prefix={src_prefix}");
        let dst = format!("--dst-prefix={dst_prefix}");

        self.git()
            .run_bytes(&["format-patch", "-1", commit, "--stdout", &src, &dst])
    }

    fn first_parent_diff(
        &self,
        commit: &str,
        src_prefix: &str,
        dst_prefix: &str,
    ) -> Result<Vec<u8>> {
        let src = format!("--src-prefix={src_prefix}");
        let dst = format!("--dst-prefix={dst_prefix}");

        let diff = self.git().run_bytes(&[
            "log",
            "--reverse",
            "--first-parent",
            "-p",
            "-m",
            "--pretty=email",
            "--stat",
            "--binary",
            "-1",
            "--color=never",
            commit,
            &src,
            &dst,
        ])?;
        Ok(diff.trim_end().to_vec())
    }

    fn git_version(&self) -> Result<String> {
        let version = self.git().run(&["--version"])?;
        Ok(version
            .strip_prefix("git version ")
            .unwrap_or(&version)
            .to_string())
    }

    fn commit_author(&self, commit: &str) -> Result<Identity> {
        let email = self.git().run(&["show", "-s", "--format=%ae", commit])?;
        let name = self.git().run(&["show", "-s", "--format=%an", commit])?;
        Ok(Identity::new(email, name))
    }

    fn commit_diff_is_empty(&self, commit: &str) -> Result<bool> {
        let parents = self.git().run(&["rev-list", "--parents", "-n", "1", commit])?;
        let is_root = parents.split_whitespace().count() <= 1;

        let range = format!("{commit}^!");
        let args: Vec<&str> = if is_root {
            vec!["diff-tree", "--quiet", "--root", "-r", commit]
        } else {
            vec!["diff", "--quiet", &range]
        };

        let output = self.git().probe(&args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(failure(&args, &output)),
        }
    }
}
