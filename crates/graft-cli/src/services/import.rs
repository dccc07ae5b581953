//! Import service: validation and execution over trait-based repositories.
//!
//! Separated from the command so that prompting and progress rendering stay
//! in the presentation layer.

use anyhow::Result;
use graft_core::{
    ImportConfig, ImportObserver, ImportOptions, ImportOutcome, ImportPlan, ImportSession,
    Project, SourceInfo,
};
use graft_git::{HostOps, SourceOps};

/// Service for importing an external repository into the host project.
pub struct ImportService<'a, S: SourceOps, H: HostOps> {
    session: ImportSession<'a, S, H>,
    project: &'a Project,
}

impl<'a, S: SourceOps, H: HostOps> ImportService<'a, S, H> {
    /// Create a new import service.
    #[must_use]
    pub const fn new(source: &'a S, host: &'a H, project: &'a Project) -> Self {
        Self {
            session: ImportSession::new(source, host),
            project,
        }
    }

    /// Validate the import without touching the host.
    pub fn plan(
        &self,
        source: SourceInfo,
        dest: Option<&str>,
        options: ImportOptions,
    ) -> Result<ImportPlan> {
        Ok(self.session.plan(source, self.project, dest, options)?)
    }

    /// Apply the plan, rolling back on failure.
    pub fn execute(
        &self,
        plan: &ImportPlan,
        observer: &mut dyn ImportObserver,
    ) -> Result<ImportOutcome> {
        Ok(self.session.execute(plan, observer)?)
    }
}

/// Combine command-line flags with project configuration. Either source can
/// turn a mode on.
#[must_use]
pub const fn effective_options(
    config: &ImportConfig,
    flatten: bool,
    preserve_commit: bool,
) -> ImportOptions {
    ImportOptions {
        flatten: flatten || config.flatten,
        preserve_commit: preserve_commit || config.preserve_commit,
    }
}

/// The line shown before asking for confirmation.
#[must_use]
pub fn summary(plan: &ImportPlan) -> String {
    format!(
        "About to import {} commits from {} into {}",
        plan.commits.len(),
        plan.source.input,
        plan.target.target_dir().display()
    )
}
