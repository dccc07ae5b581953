//! Import session: validate, then apply every commit in order or roll back.
//!
//! The session moves through `Validating -> Confirming -> Applying ->
//! {Finalizing | RollingBack}`. [`ImportSession::plan`] is the validating
//! stage and never mutates anything; confirmation belongs to the caller;
//! [`ImportSession::execute`] covers the rest.
//!
//! Commits are applied one at a time, each `git am` finishing before the next
//! patch is generated, because every patch applies against the result of
//! all the ones before it.

use graft_git::{ApplyOptions, HostOps, Identity, Oid, SourceOps};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Project;
use crate::enumerate::enumerate_commits;
use crate::error::{Error, Result};
use crate::identity;
use crate::patch::{self, PatchMode};
use crate::plan::{ImportOptions, SourceInfo, TargetMapping, resolve_target};
use crate::rewrite::PathRewriter;

/// Everything validated and ready to apply.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPlan {
    /// The external repository.
    pub source: SourceInfo,
    /// Where its files will land.
    pub target: TargetMapping,
    /// Commits to apply, oldest first.
    pub commits: Vec<String>,
    /// Mode flags.
    pub options: ImportOptions,
}

/// Mutable state of an import in progress.
///
/// Created when applying starts, discarded when the session ends. The
/// rollback path needs nothing but this.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    pre_import_head: Oid,
    original_identity: Option<Identity>,
    applied: usize,
    skipped: usize,
}

/// Result of a completed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    /// Commits enumerated.
    pub commits: usize,
    /// Commits that produced a new host commit.
    pub applied: usize,
    /// Commits that left HEAD where it was: empty diffs, and patches `git am`
    /// found already applied.
    pub skipped: usize,
    /// Target directory relative to the project root.
    pub target_dir: String,
    /// Host HEAD before the import.
    pub pre_import_head: String,
    /// Problems after every commit landed that did not undo the import,
    /// such as a failed identity restore.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Receives progress notifications while commits are applied.
pub trait ImportObserver {
    /// A commit is about to be processed. `index` is zero-based.
    fn commit_started(&mut self, _index: usize, _commit: &str) {}

    /// A commit was applied.
    fn commit_applied(&mut self, _commit: &str) {}

    /// A commit was skipped: its diff was empty or it was already applied.
    fn commit_skipped(&mut self, _commit: &str) {}

    /// The import failed and the host is being reset to `head`.
    fn rolling_back(&mut self, _head: Oid) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ImportObserver for NoopObserver {}

/// Drives one import from an external repository into a host repository.
pub struct ImportSession<'a, S: SourceOps, H: HostOps> {
    source: &'a S,
    host: &'a H,
}

impl<'a, S: SourceOps, H: HostOps> ImportSession<'a, S, H> {
    /// Create a session over the two repositories.
    #[must_use]
    pub const fn new(source: &'a S, host: &'a H) -> Self {
        Self { source, host }
    }

    /// Finish validation and produce a plan. Mutates nothing.
    ///
    /// `source_info` comes from [`inspect_source`](crate::inspect_source),
    /// which checks the path before the repository is opened.
    ///
    /// # Errors
    /// Returns the first validation error: `InvalidDestination`,
    /// `NotInRepository`, `TargetExists`, `NoCommits`, `UncommittedChanges`.
    pub fn plan(
        &self,
        source_info: SourceInfo,
        project: &Project,
        dest: Option<&str>,
        options: ImportOptions,
    ) -> Result<ImportPlan> {
        let target = resolve_target(project, self.host.root(), dest, &source_info.base_name)?;
        let commits = enumerate_commits(self.source, options.flatten)?;

        if self.host.has_uncommitted_changes()? {
            return Err(Error::UncommittedChanges);
        }

        info!(
            commits = commits.len(),
            target = %target.target_dir().display(),
            "import planned"
        );

        Ok(ImportPlan {
            source: source_info,
            target,
            commits,
            options,
        })
    }

    /// Apply every planned commit, rolling back on the first hard failure.
    ///
    /// # Errors
    /// Returns `ImportFailed` naming the commit after rolling the host back
    /// to its pre-import HEAD; other errors if the session cannot start.
    pub fn execute(
        &self,
        plan: &ImportPlan,
        observer: &mut dyn ImportObserver,
    ) -> Result<ImportOutcome> {
        let mut state = self.begin(plan.options)?;

        match self.apply_all(plan, &mut state, observer) {
            Ok(()) => Ok(self.finalize(plan, &state)),
            Err(err) => {
                observer.rolling_back(state.pre_import_head);
                rollback(self.host, &state);
                Err(err)
            }
        }
    }

    /// Capture everything rollback needs before the first mutation.
    fn begin(&self, options: ImportOptions) -> Result<SessionState> {
        let original_identity = if options.preserve_commit {
            Some(identity::capture(self.host)?)
        } else {
            None
        };
        let pre_import_head = self.host.head()?;
        debug!(head = %pre_import_head, "captured pre-import HEAD");

        Ok(SessionState {
            pre_import_head,
            original_identity,
            applied: 0,
            skipped: 0,
        })
    }

    fn apply_all(
        &self,
        plan: &ImportPlan,
        state: &mut SessionState,
        observer: &mut dyn ImportObserver,
    ) -> Result<()> {
        let rewriter = PathRewriter::new(plan.target.git_relative());
        let mode = PatchMode::from_flatten(plan.options.flatten);
        let apply_options = ApplyOptions {
            committer_date_is_author_date: plan.options.preserve_commit,
        };

        for (index, commit) in plan.commits.iter().enumerate() {
            observer.commit_started(index, commit);

            let patch = patch::generate(self.source, commit, mode)
                .map_err(|e| import_failed(commit, &e))?;
            let patch = rewriter.rewrite(patch);

            if plan.options.preserve_commit {
                identity::impersonate(self.source, self.host, commit)
                    .map_err(|e| import_failed(commit, &e))?;
            }

            let head = self.host.head().map_err(|e| import_failed(commit, &e))?;
            match self.host.apply_mailbox(patch.text(), apply_options) {
                Ok(()) => {
                    let new_head = self.host.head().map_err(|e| import_failed(commit, &e))?;
                    if new_head == head {
                        // `git am -3` reports success without committing when
                        // the change is already in the tree.
                        info!(commit = %commit, "already applied, nothing committed");
                        state.skipped += 1;
                        observer.commit_skipped(commit);
                    } else {
                        state.applied += 1;
                        debug!(commit = %commit, head = %new_head, "applied");
                        observer.commit_applied(commit);
                    }
                }
                Err(apply_err) => {
                    let empty = self
                        .source
                        .commit_diff_is_empty(commit)
                        .map_err(|e| import_failed(commit, &e))?;
                    if !empty {
                        return Err(import_failed(commit, &apply_err));
                    }

                    info!(commit = %commit, "skipping empty commit");
                    self.host
                        .apply_skip()
                        .map_err(|e| import_failed(commit, &e))?;
                    state.skipped += 1;
                    observer.commit_skipped(commit);
                }
            }
        }

        Ok(())
    }

    /// Every commit has landed; nothing here may undo that.
    fn finalize(&self, plan: &ImportPlan, state: &SessionState) -> ImportOutcome {
        let mut warnings = Vec::new();
        if let Some(original) = &state.original_identity {
            if let Err(e) = identity::restore(self.host, original) {
                warn!(error = %e, "failed to restore identity");
                warnings.push(format!("could not restore user.email/user.name: {e}"));
            }
        }

        info!(
            applied = state.applied,
            skipped = state.skipped,
            "import finished"
        );

        ImportOutcome {
            commits: plan.commits.len(),
            applied: state.applied,
            skipped: state.skipped,
            target_dir: plan.target.target_dir().display().to_string(),
            pre_import_head: state.pre_import_head.to_string(),
            warnings,
        }
    }
}

/// Undo a failed session: restore identity, abort the apply, reset HEAD.
///
/// Best effort. Each step runs even if an earlier one fails; failures are
/// logged, since the caller is already reporting the error that caused the
/// rollback.
pub(crate) fn rollback<H: HostOps>(host: &H, state: &SessionState) {
    warn!(head = %state.pre_import_head, "rolling back to previous HEAD");

    if let Some(original) = &state.original_identity {
        if let Err(e) = identity::restore(host, original) {
            warn!(error = %e, "failed to restore identity");
        }
    }

    if let Err(e) = host.apply_abort() {
        debug!(error = %e, "no apply to abort");
    }

    if let Err(e) = host.reset_hard(state.pre_import_head) {
        warn!(error = %e, "failed to reset to pre-import HEAD");
    }
}

fn import_failed(commit: &str, err: &dyn std::fmt::Display) -> Error {
    Error::ImportFailed {
        commit: commit.to_string(),
        message: err.to_string(),
    }
}
