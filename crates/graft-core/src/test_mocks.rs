//! Mock implementations of the git traits for core tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use graft_git::{ApplyOptions, Error as GitError, HostOps, Identity, Oid, Result, SourceOps};

use crate::identity::{EMAIL_KEY, NAME_KEY};

/// A deterministic oid for tests.
pub fn oid(n: u8) -> Oid {
    Oid::from_bytes(&[n; 20]).unwrap()
}

/// A minimal patch body touching one file, with placeholder prefixes.
pub fn sample_patch(file: &str) -> String {
    format!(
        "diff --git COMPARE_A/{file} COMPARE_B/{file}\n\
         new file mode 100644\n\
         --- /dev/null\n\
         +++ COMPARE_B/{file}\n\
         @@ -0,0 +1 @@\n\
         +{file}\n"
    )
}

#[derive(Debug, Clone)]
struct MockCommit {
    id: String,
    body: String,
    first_parent: bool,
    empty: bool,
    broken: bool,
    author: Identity,
}

/// Mock external repository.
pub struct MockSource {
    workdir: PathBuf,
    /// Oldest first.
    commits: Vec<MockCommit>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            workdir: PathBuf::from("/mock/source"),
            commits: Vec::new(),
        }
    }

    fn push(mut self, id: &str, body: &str, first_parent: bool, author: Identity) -> Self {
        self.commits.push(MockCommit {
            id: id.to_string(),
            body: body.to_string(),
            first_parent,
            empty: false,
            broken: false,
            author,
        });
        self
    }

    pub fn with_commit(self, id: &str, body: &str) -> Self {
        self.push(id, body, true, Identity::new("dev@example.com", "Dev"))
    }

    /// A commit reachable only through a merge's second parent.
    pub fn with_side_commit(self, id: &str, body: &str) -> Self {
        self.push(id, body, false, Identity::new("dev@example.com", "Dev"))
    }

    pub fn with_authored_commit(self, id: &str, body: &str, author: Identity) -> Self {
        self.push(id, body, true, author)
    }

    /// A commit whose diff is empty; its patch has no file changes.
    pub fn with_empty_commit(mut self, id: &str) -> Self {
        self = self.with_commit(id, "");
        if let Some(commit) = self.commits.last_mut() {
            commit.empty = true;
        }
        self
    }

    /// Make patch generation fail for an existing commit.
    pub fn with_broken_commit(mut self, id: &str) -> Self {
        for commit in &mut self.commits {
            if commit.id == id {
                commit.broken = true;
            }
        }
        self
    }

    fn find(&self, id: &str) -> Result<&MockCommit> {
        self.commits
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| GitError::CommandFailed {
                command: format!("show {id}"),
                stderr: format!("fatal: bad revision '{id}'"),
            })
    }

    fn body(&self, id: &str) -> Result<&str> {
        let commit = self.find(id)?;
        if commit.broken {
            return Err(GitError::CommandFailed {
                command: format!("format-patch {id}"),
                stderr: "fatal: broken object".into(),
            });
        }
        Ok(&commit.body)
    }
}

impl SourceOps for MockSource {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn log_commits(&self, first_parent: bool) -> Result<Vec<String>> {
        Ok(self
            .commits
            .iter()
            .rev()
            .filter(|c| !first_parent || c.first_parent)
            .map(|c| c.id.clone())
            .collect())
    }

    fn format_patch(
        &self,
        commit: &str,
        src_prefix: &str,
        dst_prefix: &str,
    ) -> Result<Vec<u8>> {
        let body = self.body(commit)?;
        Ok(format!("format-patch {commit} {src_prefix} {dst_prefix}\n{body}").into_bytes())
    }

    fn first_parent_diff(
        &self,
        commit: &str,
        src_prefix: &str,
        dst_prefix: &str,
    ) -> Result<Vec<u8>> {
        let body = self.body(commit)?;
        Ok(format!("first-parent {commit} {src_prefix} {dst_prefix}\n{body}").into_bytes())
    }

    fn git_version(&self) -> Result<String> {
        Ok("2.43.0".into())
    }

    fn commit_author(&self, commit: &str) -> Result<Identity> {
        Ok(self.find(commit)?.author.clone())
    }

    fn commit_diff_is_empty(&self, commit: &str) -> Result<bool> {
        Ok(self.find(commit)?.empty)
    }
}

#[derive(Debug, Clone)]
struct AppliedPatch {
    oid: Oid,
    text: String,
    identity: Identity,
    options: ApplyOptions,
}

/// Mock host repository.
///
/// HEAD starts at `oid(1)`; every successful apply adds a commit on top,
/// except for patches containing the already-applied marker, which succeed
/// without committing. Patches containing the failure marker, or no file
/// changes, fail to apply and leave an apply in progress.
pub struct MockHost {
    root: PathBuf,
    base: Cell<Oid>,
    dirty: bool,
    fail_on: Option<String>,
    already_applied: Option<String>,
    reject_config_value: Option<String>,
    config: RefCell<HashMap<String, String>>,
    applied: RefCell<Vec<AppliedPatch>>,
    in_progress: Cell<bool>,
    next_oid: Cell<u8>,
    ops: RefCell<Vec<String>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/mock/host"),
            base: Cell::new(oid(1)),
            dirty: false,
            fail_on: None,
            already_applied: None,
            reject_config_value: None,
            config: RefCell::new(HashMap::new()),
            applied: RefCell::new(Vec::new()),
            in_progress: Cell::new(false),
            next_oid: Cell::new(100),
            ops: RefCell::new(Vec::new()),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = PathBuf::from(root);
        self
    }

    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    pub fn with_identity(self, email: &str, name: &str) -> Self {
        {
            let mut config = self.config.borrow_mut();
            config.insert(EMAIL_KEY.into(), email.into());
            config.insert(NAME_KEY.into(), name.into());
        }
        self
    }

    /// Fail any patch whose text contains `marker`.
    pub fn with_apply_failure(mut self, marker: &str) -> Self {
        self.fail_on = Some(marker.to_string());
        self
    }

    /// Accept any patch containing `marker` without creating a commit.
    pub fn with_already_applied(mut self, marker: &str) -> Self {
        self.already_applied = Some(marker.to_string());
        self
    }

    /// Fail any config write of exactly `value`.
    pub fn with_config_write_failure(mut self, value: &str) -> Self {
        self.reject_config_value = Some(value.to_string());
        self
    }

    /// Mutating operations, in order.
    pub fn ops(&self) -> Vec<String> {
        self.ops.borrow().clone()
    }

    /// Patch texts of the commits currently on top of the base.
    pub fn applied_patches(&self) -> Vec<String> {
        self.applied.borrow().iter().map(|a| a.text.clone()).collect()
    }

    /// Configured identity at the time of each applied commit.
    pub fn applied_identities(&self) -> Vec<Identity> {
        self.applied.borrow().iter().map(|a| a.identity.clone()).collect()
    }

    pub fn applied_options(&self) -> Vec<ApplyOptions> {
        self.applied.borrow().iter().map(|a| a.options).collect()
    }

    fn record(&self, op: impl Into<String>) {
        self.ops.borrow_mut().push(op.into());
    }

    fn fails(&self, patch: &str) -> Option<&'static str> {
        if !patch.contains("diff --git") {
            return Some("Patch is empty.");
        }
        match &self.fail_on {
            Some(marker) if patch.contains(marker.as_str()) => Some("error: patch does not apply"),
            _ => None,
        }
    }
}

impl HostOps for MockHost {
    fn root(&self) -> &Path {
        &self.root
    }

    fn head(&self) -> Result<Oid> {
        Ok(self.applied.borrow().last().map_or(self.base.get(), |a| a.oid))
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn config_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.config.borrow().get(key).cloned())
    }

    fn config_set(&self, key: &str, value: &str) -> Result<()> {
        if self.reject_config_value.as_deref() == Some(value) {
            return Err(GitError::CommandFailed {
                command: format!("config --local {key} {value}"),
                stderr: "error: could not lock config file .git/config".into(),
            });
        }
        self.record(format!("config {key} {value}"));
        self.config.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }

    fn config_unset(&self, key: &str) -> Result<()> {
        self.record(format!("config --unset {key}"));
        self.config.borrow_mut().remove(key);
        Ok(())
    }

    fn apply_mailbox(&self, patch: &[u8], options: ApplyOptions) -> Result<()> {
        let patch = String::from_utf8_lossy(patch);
        if let Some(stderr) = self.fails(&patch) {
            self.record("am (failed)");
            self.in_progress.set(true);
            return Err(GitError::CommandFailed {
                command: "am -3 --keep-non-patch".into(),
                stderr: stderr.into(),
            });
        }

        self.record("am");
        if let Some(marker) = &self.already_applied {
            if patch.contains(marker.as_str()) {
                return Ok(());
            }
        }

        let next = self.next_oid.get();
        self.next_oid.set(next + 1);
        let config = self.config.borrow();
        self.applied.borrow_mut().push(AppliedPatch {
            oid: oid(next),
            text: patch.into_owned(),
            identity: Identity {
                email: config.get(EMAIL_KEY).cloned(),
                name: config.get(NAME_KEY).cloned(),
            },
            options,
        });
        Ok(())
    }

    fn apply_skip(&self) -> Result<()> {
        if self.in_progress.replace(false) {
            self.record("am --skip");
        }
        Ok(())
    }

    fn apply_abort(&self) -> Result<()> {
        if !self.in_progress.replace(false) {
            return Err(GitError::CommandFailed {
                command: "am --abort".into(),
                stderr: "fatal: Resolve operation not in progress".into(),
            });
        }
        self.record("am --abort");
        Ok(())
    }

    fn reset_hard(&self, target: Oid) -> Result<()> {
        self.record(format!("reset --hard {target}"));
        let mut applied = self.applied.borrow_mut();
        if let Some(pos) = applied.iter().position(|a| a.oid == target) {
            applied.truncate(pos + 1);
        } else {
            applied.clear();
            self.base.set(target);
        }
        Ok(())
    }
}
