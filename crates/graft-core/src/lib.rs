//! # graft-core
//!
//! Importing another repository's history into a subdirectory of the host
//! repository.
//!
//! The pipeline for each external commit is: [`generate`] a patch with
//! placeholder path roots, relocate every path with a [`PathRewriter`], then
//! apply it to the host. An [`ImportSession`] validates everything up front,
//! applies commits strictly in order, and resets the host to its pre-import
//! HEAD if any commit fails.

pub mod config;
pub mod enumerate;
pub mod error;
pub mod identity;
pub mod package;
pub mod patch;
pub mod plan;
pub mod rewrite;
pub mod session;

#[cfg(test)]
mod test_mocks;

pub use config::{Config, ImportConfig, Project, WorkspaceConfig};
pub use enumerate::enumerate_commits;
pub use error::{Error, ErrorKind, Result};
pub use package::read_package_name;
pub use patch::{Patch, PatchMode, generate};
pub use plan::{ImportOptions, SourceInfo, TargetMapping, inspect_source, resolve_target};
pub use rewrite::{PathRewriter, RewriteRule};
pub use session::{ImportObserver, ImportOutcome, ImportPlan, ImportSession, NoopObserver};
